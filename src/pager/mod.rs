//! Interactive terminal pager.
//!
//! One reusable control loop for paging tabular data: render a page,
//! block for a single keypress, decode it, mutate the page state,
//! repeat until quit. Instantiated by the CLI once for modules and
//! once for entities; only the data source and column map vary.
//!
//! Organized along effect boundaries:
//! - `state`: pure page-state algebra (`PageState`, `NavAction`)
//! - `decoder`: bytes → `NavAction`, pure over any `Read`
//! - `render`: one full-screen redraw, pure over any `Write`
//! - `terminal`: scoped raw-mode acquisition, the only mode-touching code
//! - `controller`: the loop tying the above together

pub mod controller;
pub mod decoder;
pub mod render;
pub mod state;
pub mod terminal;

pub use controller::{PageProvider, Pager};
pub use render::ColumnSpec;
pub use state::{NavAction, PageState};
pub use terminal::RawTerminalSession;

use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Backend failure while fetching a page.
///
/// Non-fatal to the pager: the message is rendered in place of the
/// table and the loop continues; the next navigation retries.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DataSourceError {
    /// Human-readable description for on-screen display.
    pub message: String,
}

impl DataSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Fatal pager failures.
#[derive(Debug, Error)]
pub enum PagerError {
    /// Raw mode could not be entered on a real TTY. Surfaced before
    /// the loop starts; never raised mid-session.
    #[error("terminal unavailable: {source}")]
    TerminalUnavailable {
        #[source]
        source: std::io::Error,
    },

    /// Reading the keyboard or writing the screen failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
