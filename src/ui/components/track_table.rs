//! Track table component.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::library::Row as TrackRow;
use crate::ui::layout::ColumnLayout;

const BORDER_COLOR: Color = Color::Indexed(240);
const SELECTED_FG: Color = Color::Indexed(229);
const SELECTED_BG: Color = Color::Indexed(57);

/// Track table state: the realized columns and rows plus cursor and focus.
///
/// Cursor movement is ignored while the table is blurred.
#[derive(Debug)]
pub struct TrackTableState {
    /// Realized columns
    pub columns: Vec<ColumnLayout>,

    /// Realized rows
    pub rows: Vec<TrackRow>,

    /// Selection state for UI
    pub table_state: TableState,

    /// Number of rows visible at once
    pub viewport_height: usize,

    focused: bool,
}

impl Default for TrackTableState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackTableState {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            table_state: TableState::default(),
            viewport_height: 0,
            focused: true,
        }
    }

    /// Replace the rows, keeping the cursor on a valid row.
    pub fn set_rows(&mut self, rows: Vec<TrackRow>) {
        self.rows = rows;
        let selected = match self.table_state.selected() {
            _ if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn cursor(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Move selection up.
    pub fn select_previous(&mut self) {
        self.move_up(1);
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        self.move_down(1);
    }

    pub fn page_up(&mut self) {
        self.move_up(self.page());
    }

    pub fn page_down(&mut self) {
        self.move_down(self.page());
    }

    pub fn half_page_up(&mut self) {
        self.move_up((self.page() / 2).max(1));
    }

    pub fn half_page_down(&mut self) {
        self.move_down((self.page() / 2).max(1));
    }

    /// Jump to first item.
    pub fn select_first(&mut self) {
        if self.focused && !self.rows.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    /// Jump to last item.
    pub fn select_last(&mut self) {
        if self.focused && !self.rows.is_empty() {
            self.table_state.select(Some(self.rows.len() - 1));
        }
    }

    fn page(&self) -> usize {
        self.viewport_height.max(1)
    }

    fn move_up(&mut self, by: usize) {
        if !self.focused || self.rows.is_empty() {
            return;
        }
        let i = self.cursor().unwrap_or(0).saturating_sub(by);
        self.table_state.select(Some(i));
    }

    fn move_down(&mut self, by: usize) {
        if !self.focused || self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let i = self.cursor().map_or(0, |i| i.saturating_add(by)).min(last);
        self.table_state.select(Some(i));
    }
}

/// Render the track table.
pub fn render_track_table(frame: &mut Frame, area: Rect, state: &mut TrackTableState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_COLOR));

    let header = Row::new(
        state
            .columns
            .iter()
            .map(|c| Cell::from(c.name.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::UNDERLINED));

    let rows: Vec<Row> = state
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|value| Cell::from(value.as_str()))))
        .collect();

    let widths: Vec<Constraint> = state
        .columns
        .iter()
        .map(|c| Constraint::Length(c.width))
        .collect();

    let highlight = if state.focused {
        Style::default().fg(SELECTED_FG).bg(SELECTED_BG)
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(highlight);

    frame.render_stateful_widget(table, area, &mut state.table_state);
}
