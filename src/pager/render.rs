//! One full-screen redraw: banner, hints, table, summary.
//!
//! Pure over any `io::Write`: the controller hands it stdout, tests
//! hand it a buffer. Never reads input. Every line ends in `\r\n`
//! because raw mode disables output post-processing; cooked terminals
//! render CR LF identically.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};

use super::state::PageState;
use super::DataSourceError;
use crate::types::Row;

/// Width of the delimiter line above the table.
const RULE_WIDTH: usize = 60;

// ============================================================================
// COLUMN SPEC
// ============================================================================

/// Ordered projection of row keys onto header labels.
///
/// Defines both which columns render and in what order, independent of
/// the key order inside each row.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    columns: Vec<(String, String)>,
}

impl ColumnSpec {
    /// Build from `(row_key, header_label)` pairs, in render order.
    pub fn new<K, L, I>(pairs: I) -> Self
    where
        K: Into<String>,
        L: Into<String>,
        I: IntoIterator<Item = (K, L)>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, l)| (k.into(), l.into()))
                .collect(),
        }
    }

    /// `(key, label)` pairs in render order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, l)| (k.as_str(), l.as_str()))
    }
}

// ============================================================================
// PAGE RENDERING
// ============================================================================

/// Everything one redraw needs, borrowed from the controller.
#[derive(Debug)]
pub struct PageView<'a> {
    /// Banner line, e.g. "Welcome to the Modules List Command!".
    pub title: &'a str,
    /// Plural noun for the empty-state message, e.g. "modules".
    pub noun: &'a str,
    /// Current pagination coordinates (for the hints and messages).
    pub state: &'a PageState,
    /// Whether single-key arrow navigation is live; selects the
    /// key-binding wording in the hints.
    pub raw_mode: bool,
    /// Caller-supplied hint lines printed after the key bindings.
    pub extra_hints: &'a [String],
    /// The fetch outcome: rows to tabulate, or the error to show in
    /// place of the table.
    pub outcome: Result<&'a [Row], &'a DataSourceError>,
}

/// Clear the screen and draw one complete page.
pub fn render_page<W: Write>(out: &mut W, columns: &ColumnSpec, view: &PageView<'_>) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    write!(out, "{}\r\n\r\n", view.title.to_string().cyan().bold())?;

    render_hints(out, view)?;

    match view.outcome {
        Ok(rows) if rows.is_empty() => {
            write!(out, "  >> No {} found on page {}.\r\n", view.noun, view.state.page)?;
        }
        Ok(rows) => {
            write!(out, " Page {} — showing {} items\r\n", view.state.page, rows.len())?;
            write!(out, "{}\r\n", "─".repeat(RULE_WIDTH))?;
            render_table(out, columns, rows)?;
            write!(out, "\r\n  {} item(s) listed.\r\n", rows.len())?;
        }
        Err(e) => {
            write!(out, "  >> Error: {}\r\n", e)?;
            write!(out, "  >> Navigate to retry, or press 'q' to quit.\r\n")?;
        }
    }

    out.flush()
}

/// The contextual hint block under the banner.
fn render_hints<W: Write>(out: &mut W, view: &PageView<'_>) -> io::Result<()> {
    let state = view.state;

    write!(out, "HINTS:\r\n")?;
    write!(out, "  • --limit={}   (items/page)\r\n", state.limit)?;
    write!(
        out,
        "  • --sort-by={}   --sort-direction={}\r\n",
        state.sort_by.as_deref().unwrap_or("<none>"),
        state.sort_direction
    )?;
    if view.raw_mode {
        write!(out, "  • ←/→ arrows to navigate pages, 'q' to quit\r\n")?;
    } else {
        write!(out, "  • Press 'n' = next page, 'p' = previous page, 'q' = quit\r\n")?;
    }
    for hint in view.extra_hints {
        write!(out, "  • {}\r\n", hint)?;
    }
    write!(out, "  • Press 'ctrl+c' to exit at any time\r\n")?;
    write!(out, "\r\n")
}

/// Left-aligned table projected through the column spec.
///
/// Column widths are the max of header and cell widths for the rows
/// being drawn, so redraws of the same page contents never jitter.
fn render_table<W: Write>(out: &mut W, columns: &ColumnSpec, rows: &[Row]) -> io::Result<()> {
    let widths: Vec<usize> = columns
        .iter()
        .map(|(key, label)| {
            rows.iter()
                .map(|row| cell(row, key).chars().count())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    for (i, (_, label)) in columns.iter().enumerate() {
        write!(out, "{:<width$}  ", label, width = widths[i])?;
    }
    write!(out, "\r\n")?;

    for row in rows {
        for (i, (key, _)) in columns.iter().enumerate() {
            write!(out, "{:<width$}  ", cell(row, key), width = widths[i])?;
        }
        write!(out, "\r\n")?;
    }

    Ok(())
}

/// Cell value for a key; absent keys render empty.
fn cell<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}
