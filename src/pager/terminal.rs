//! Scoped raw-mode acquisition and release.
//!
//! Raw mode is the shared mutable resource of the whole pager: if the
//! process exits without restoring it, the user's shell is left
//! unusable. Restoration is therefore tied to `Drop`, so it runs on
//! normal quit, on `?`-propagated errors, and (via the panic hook) on
//! panics. In raw mode Ctrl+C arrives as an in-band byte rather than
//! SIGINT, so the decoder turns it into a quit and the guard still
//! drops on that path too.

use std::io::{self, IsTerminal};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::PagerError;

/// Guard holding the terminal in raw (unbuffered, unechoed) mode.
///
/// On non-TTY stdin (piped or redirected input) acquisition is a
/// recorded no-op: reads stay line-buffered and arrow keys give way to
/// the n/p letter bindings. That degraded mode still pages correctly,
/// it just needs Enter after each key.
#[derive(Debug)]
pub struct RawTerminalSession {
    raw: bool,
}

impl RawTerminalSession {
    /// Switch stdin to raw mode, remembering whether anything was done.
    ///
    /// Fails with [`PagerError::TerminalUnavailable`] when stdin is a
    /// TTY but raw mode cannot be enabled; callers must abort before
    /// entering the loop rather than run against a half-configured
    /// terminal.
    pub fn acquire() -> Result<Self, PagerError> {
        if !io::stdin().is_terminal() {
            tracing::debug!("stdin is not a tty, staying line-buffered");
            return Ok(Self { raw: false });
        }

        install_restore_hook();
        enable_raw_mode().map_err(|source| PagerError::TerminalUnavailable { source })?;
        Ok(Self { raw: true })
    }

    /// Whether raw mode is actually active (false in the line-buffered
    /// fallback). Drives the key-binding wording in the hints.
    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

impl Drop for RawTerminalSession {
    fn drop(&mut self) {
        if self.raw {
            // Best-effort: nowhere to report failure during unwind.
            let _ = disable_raw_mode();
        }
    }
}

/// Install a panic hook that restores the terminal before the default
/// hook prints, so a mid-loop panic doesn't leave the shell raw.
/// Installed once per process.
fn install_restore_hook() {
    use std::sync::Once;
    static HOOK: Once = Once::new();

    HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            original_hook(panic_info);
        }));
    });
}
