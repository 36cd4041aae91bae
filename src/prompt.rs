//! Line-oriented prompts for the create/remove commands.
//!
//! Plain cooked-mode stdin reads; the raw-mode machinery in `pager`
//! is never involved here. Generic over the streams so the prompt
//! flows are testable with scripted input.

use std::io::{self, BufRead, Write};

/// Read one trimmed line after printing `label`.
///
/// EOF is an error: the prompted commands cannot proceed without an
/// answer, and looping on a closed stdin would spin forever.
pub fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    write!(output, "  >> {}: ", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed while awaiting a prompt answer",
        ));
    }
    Ok(line.trim().to_string())
}

/// Prompt until a non-empty answer no longer than `max_len` arrives.
pub fn prompt_required<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    max_len: usize,
) -> io::Result<String> {
    loop {
        let answer = prompt_line(input, output, label)?;
        if answer.is_empty() {
            writeln!(output, "  >> This field is required.")?;
            continue;
        }
        if answer.chars().count() > max_len {
            writeln!(output, "  >> Keep it under {} characters.", max_len)?;
            continue;
        }
        return Ok(answer);
    }
}

/// Prompt until the answer parses as a numeric id.
pub fn prompt_id<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<u64> {
    loop {
        let answer = prompt_line(input, output, label)?;
        match answer.parse() {
            Ok(id) => return Ok(id),
            Err(_) => writeln!(output, "  >> Please enter a numeric ID.")?,
        }
    }
}

/// Ask for an explicit `yes` before a destructive step.
pub fn prompt_confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<bool> {
    let answer = prompt_line(input, output, label)?;
    Ok(answer.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_line_trims_the_answer() {
        let mut input: &[u8] = b"  Billing  \n";
        let mut output = Vec::new();
        let answer = prompt_line(&mut input, &mut output, "Module Title").unwrap();
        assert_eq!(answer, "Billing");
        assert!(String::from_utf8(output).unwrap().contains(">> Module Title: "));
    }

    #[test]
    fn prompt_line_errors_on_eof() {
        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        assert!(prompt_line(&mut input, &mut output, "x").is_err());
    }

    #[test]
    fn required_reprompts_on_empty_and_overlong() {
        let long = "x".repeat(101);
        let script = format!("\n{}\nBilling\n", long);
        let mut input = script.as_bytes();
        let mut output = Vec::new();

        let answer = prompt_required(&mut input, &mut output, "Module Title", 100).unwrap();
        assert_eq!(answer, "Billing");

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("This field is required."));
        assert!(text.contains("Keep it under 100 characters."));
    }

    #[test]
    fn id_reprompts_until_numeric() {
        let mut input: &[u8] = b"abc\n42\n";
        let mut output = Vec::new();
        assert_eq!(prompt_id(&mut input, &mut output, "Module ID").unwrap(), 42);
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut output = Vec::new();
        let mut yes: &[u8] = b"YES\n";
        let mut no: &[u8] = b"y\n";
        assert!(prompt_confirm(&mut yes, &mut output, "Type 'yes' to confirm").unwrap());
        assert!(!prompt_confirm(&mut no, &mut output, "Type 'yes' to confirm").unwrap());
    }
}
