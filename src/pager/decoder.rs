//! Byte-level key decoding: raw input bytes → one `NavAction`.
//!
//! The decoder owns the whole keyboard-reporting story so the loop
//! body never branches on platform or input mode. It reads from any
//! blocking byte source: a raw-mode TTY delivers keys as single bytes
//! or ESC sequences; a line-buffered pipe delivers letters followed by
//! a newline (which decodes to `None` and costs one redraw).

use std::io::{self, Read};

use super::state::NavAction;

/// Escape-sequence introducer.
const ESC: u8 = 0x1b;

/// Ctrl+C as delivered in raw mode (no SIGINT is raised there).
const ETX: u8 = 0x03;

/// Decode exactly one keypress from `input`.
///
/// Blocks for the first byte. An ESC introducer commits to reading
/// exactly two continuation bytes (the length of the arrow-key
/// reports); anything that is not a known sequence decodes to
/// [`NavAction::None`]. No dynamic-length scanning, so a malformed
/// sequence can never wedge the loop. EOF decodes to
/// [`NavAction::Quit`] so a closed input cannot spin it either.
pub fn decode_key<R: Read>(input: &mut R) -> io::Result<NavAction> {
    let first = match read_byte(input)? {
        Some(b) => b,
        None => return Ok(NavAction::Quit),
    };

    match first {
        b'q' | b'Q' | ETX => Ok(NavAction::Quit),
        // Fallback letters for line-buffered input; harmless in raw mode.
        b'n' | b'N' => Ok(NavAction::NextPage),
        b'p' | b'P' => Ok(NavAction::PrevPage),
        ESC => decode_escape(input),
        _ => Ok(NavAction::None),
    }
}

/// Decode the two fixed continuation bytes of an arrow-key report.
fn decode_escape<R: Read>(input: &mut R) -> io::Result<NavAction> {
    let second = read_byte(input)?;
    let third = read_byte(input)?;

    match (second, third) {
        (Some(b'['), Some(b'C')) => Ok(NavAction::NextPage),
        (Some(b'['), Some(b'D')) => Ok(NavAction::PrevPage),
        _ => Ok(NavAction::None),
    }
}

/// Read one byte, distinguishing EOF from data.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> NavAction {
        let mut input = bytes;
        decode_key(&mut input).unwrap()
    }

    #[test]
    fn q_always_quits() {
        assert_eq!(decode(b"q"), NavAction::Quit);
        assert_eq!(decode(b"Q"), NavAction::Quit);
        assert_eq!(decode(b"qqqq"), NavAction::Quit);
    }

    #[test]
    fn ctrl_c_quits_in_raw_mode() {
        assert_eq!(decode(&[0x03]), NavAction::Quit);
    }

    #[test]
    fn arrow_right_is_next_page() {
        assert_eq!(decode(b"\x1b[C"), NavAction::NextPage);
    }

    #[test]
    fn arrow_left_is_prev_page() {
        assert_eq!(decode(b"\x1b[D"), NavAction::PrevPage);
    }

    #[test]
    fn fallback_letters_match_arrows() {
        assert_eq!(decode(b"n"), NavAction::NextPage);
        assert_eq!(decode(b"N"), NavAction::NextPage);
        assert_eq!(decode(b"p"), NavAction::PrevPage);
        assert_eq!(decode(b"P"), NavAction::PrevPage);
    }

    #[test]
    fn unknown_escape_continuation_is_none() {
        assert_eq!(decode(b"\x1b[Z"), NavAction::None);
        assert_eq!(decode(b"\x1bOA"), NavAction::None);
    }

    #[test]
    fn escape_reads_exactly_two_continuation_bytes() {
        // Up-arrow then 'q': the decoder must consume ESC [ A and stop,
        // leaving 'q' for the next call.
        let mut input: &[u8] = b"\x1b[Aq";
        assert_eq!(decode_key(&mut input).unwrap(), NavAction::None);
        assert_eq!(decode_key(&mut input).unwrap(), NavAction::Quit);
    }

    #[test]
    fn truncated_escape_is_none() {
        assert_eq!(decode(b"\x1b"), NavAction::None);
        assert_eq!(decode(b"\x1b["), NavAction::None);
    }

    #[test]
    fn unmapped_byte_is_none() {
        assert_eq!(decode(b"z"), NavAction::None);
        assert_eq!(decode(b"\n"), NavAction::None);
        assert_eq!(decode(b" "), NavAction::None);
    }

    #[test]
    fn eof_decodes_to_quit() {
        assert_eq!(decode(b""), NavAction::Quit);
    }
}
