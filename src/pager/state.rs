//! Pager state algebra: pure types, zero effects.
//!
//! `PageState` is the one piece of mutable loop state; `NavAction` is
//! the closed set of things a keypress can mean. The transition
//! function is pure and fully testable without a terminal.

use std::collections::BTreeMap;

use crate::types::SortDirection;

// ============================================================================
// PAGE STATE
// ============================================================================

/// Pagination coordinates driving each fetch.
///
/// Built once by the caller, then owned and mutated exclusively by the
/// controller for the lifetime of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// Current page, 1-based. Clamped to a minimum of 1; no upper
    /// bound; an empty page at a high number is a displayable state.
    pub page: u64,
    /// Items per page.
    pub limit: u64,
    /// Field to sort by, if any.
    pub sort_by: Option<String>,
    /// Sort direction, meaningful when `sort_by` is set.
    pub sort_direction: SortDirection,
    /// Caller-supplied filters, forwarded verbatim to the provider.
    pub filters: BTreeMap<String, String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: None,
            sort_direction: SortDirection::Asc,
            filters: BTreeMap::new(),
        }
    }
}

impl PageState {
    /// State starting at `page` with `limit` items per page.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            ..Self::default()
        }
    }
}

// ============================================================================
// NAVIGATION ACTIONS
// ============================================================================

/// What one decoded keypress means to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Advance one page (no upper bound).
    NextPage,
    /// Go back one page, never below 1.
    PrevPage,
    /// Leave the loop.
    Quit,
    /// Unrecognized or incomplete input: redraw, state unchanged.
    None,
}

/// Whether the loop keeps going after an action is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Apply one action to the page state.
///
/// The only mutation point for `PageState` after construction.
pub fn apply_action(state: &mut PageState, action: NavAction) -> LoopControl {
    match action {
        NavAction::NextPage => {
            state.page += 1;
            LoopControl::Continue
        }
        NavAction::PrevPage => {
            state.page = state.page.saturating_sub(1).max(1);
            LoopControl::Continue
        }
        NavAction::Quit => LoopControl::Exit,
        NavAction::None => LoopControl::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_count_matches_page_number() {
        let mut state = PageState::default();
        for n in 1..=50u64 {
            apply_action(&mut state, NavAction::NextPage);
            assert_eq!(state.page, n + 1);
        }
    }

    #[test]
    fn prev_page_never_drops_below_one() {
        let mut state = PageState::new(3, 10);
        for _ in 0..20 {
            apply_action(&mut state, NavAction::PrevPage);
            assert!(state.page >= 1);
        }
        assert_eq!(state.page, 1);
    }

    #[test]
    fn none_leaves_state_untouched() {
        let mut state = PageState::new(4, 25);
        let before = state.clone();
        assert_eq!(apply_action(&mut state, NavAction::None), LoopControl::Continue);
        assert_eq!(state, before);
    }

    #[test]
    fn quit_exits_without_mutation() {
        let mut state = PageState::new(7, 10);
        let before = state.clone();
        assert_eq!(apply_action(&mut state, NavAction::Quit), LoopControl::Exit);
        assert_eq!(state, before);
    }

    #[test]
    fn new_clamps_page_and_limit_to_one() {
        let state = PageState::new(0, 0);
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, 1);
    }
}
