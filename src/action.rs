//! Application actions/events that drive state changes.

use crate::config::ColumnSpec;
use crate::library::Row;

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Application lifecycle
    Quit,
    Resize(u16, u16),

    // Navigation
    NavigateUp,
    NavigateDown,
    PageUp,
    PageDown,
    ScrollHalfPageUp,
    ScrollHalfPageDown,
    JumpToTop,
    JumpToBottom,

    // Table
    ToggleFocus,
    Preview,
    ToggleColumn(usize),

    // Worker results
    RowsBuilt {
        columns: Vec<ColumnSpec>,
        rows: Vec<Row>,
    },
    PreviewReady(String),

    // No-op
    None,
}

impl Action {
    /// Whether this action only moves the cursor.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Action::NavigateUp
                | Action::NavigateDown
                | Action::PageUp
                | Action::PageDown
                | Action::ScrollHalfPageUp
                | Action::ScrollHalfPageDown
                | Action::JumpToTop
                | Action::JumpToBottom
        )
    }
}
