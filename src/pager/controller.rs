//! The pagination loop: fetch → render → await key → apply.
//!
//! Single-threaded and cooperatively blocking; the only suspension
//! point is the key read. The loop core is generic over the provider
//! and the input/output streams so every transition is testable
//! byte-for-byte without a terminal. The public entry wires in stdin,
//! stdout and the raw-mode guard.

use std::io::{self, Read, Write};

use super::decoder::decode_key;
use super::render::{render_page, ColumnSpec, PageView};
use super::state::{apply_action, LoopControl, PageState};
use super::terminal::RawTerminalSession;
use super::{DataSourceError, PagerError};
use crate::types::Row;

// ============================================================================
// PROVIDER CONTRACT
// ============================================================================

/// Supplies the rows for one page of results.
///
/// Implemented by the data-access layer; the pager only ever sees rows
/// and the column projection its caller configured. A fetch failure is
/// non-fatal: the controller shows the message and keeps the loop
/// alive so the next navigation retries.
pub trait PageProvider {
    fn fetch(&mut self, state: &PageState) -> Result<Vec<Row>, DataSourceError>;
}

impl<F> PageProvider for F
where
    F: FnMut(&PageState) -> Result<Vec<Row>, DataSourceError>,
{
    fn fetch(&mut self, state: &PageState) -> Result<Vec<Row>, DataSourceError> {
        self(state)
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// One interactive paging session over a provider.
pub struct Pager<P> {
    title: String,
    noun: String,
    columns: ColumnSpec,
    hints: Vec<String>,
    provider: P,
}

impl<P: PageProvider> Pager<P> {
    /// Configure a pager. `noun` is the plural used in the empty-state
    /// message ("modules", "entities").
    pub fn new(
        title: impl Into<String>,
        noun: impl Into<String>,
        columns: ColumnSpec,
        provider: P,
    ) -> Self {
        Self {
            title: title.into(),
            noun: noun.into(),
            columns,
            hints: Vec::new(),
            provider,
        }
    }

    /// Add a contextual hint line to the header block.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Run the interactive loop on the process terminal until quit.
    ///
    /// Acquires the raw session up front; the guard's `Drop` restores
    /// the terminal on every exit path out of this frame, including
    /// `?`-propagated i/o errors and panics.
    pub fn run(mut self, state: PageState) -> Result<(), PagerError> {
        let session = RawTerminalSession::acquire()?;
        let mut stdin = io::stdin().lock();
        let mut stdout = io::stdout().lock();
        self.run_loop(state, session.is_raw(), &mut stdin, &mut stdout)
    }

    /// The loop proper, over arbitrary streams.
    fn run_loop<R: Read, W: Write>(
        &mut self,
        mut state: PageState,
        raw_mode: bool,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), PagerError> {
        loop {
            // Refetch on every pass, including no-op redraws: filters
            // or backend contents may have changed underneath us.
            let outcome = self.provider.fetch(&state);
            if let Err(e) = &outcome {
                tracing::debug!(page = state.page, error = %e, "page fetch failed");
            }

            let view = PageView {
                title: &self.title,
                noun: &self.noun,
                state: &state,
                raw_mode,
                extra_hints: &self.hints,
                outcome: outcome.as_ref().map(Vec::as_slice),
            };
            render_page(output, &self.columns, &view)?;

            let action = decode_key(input)?;
            tracing::trace!(?action, page = state.page, "decoded keypress");
            if apply_action(&mut state, action) == LoopControl::Exit {
                return Ok(());
            }
        }
    }
}
