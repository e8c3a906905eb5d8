//! Main UI layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Phase};

pub mod components;
pub mod layout;

pub use components::*;

/// Rows taken by the table border and header.
const TABLE_CHROME_HEIGHT: u16 = 3;

/// Rows taken by the footer line.
const FOOTER_HEIGHT: u16 = 1;

const HINT_COLOR: Color = Color::DarkGray;

/// Number of table rows visible in a terminal `height` cells tall.
pub fn table_viewport_height(height: u16) -> u16 {
    height.saturating_sub(TABLE_CHROME_HEIGHT + FOOTER_HEIGHT)
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if !app.has_size() {
        return;
    }

    if app.is_too_small() {
        frame.render_widget(Paragraph::new("Window too small"), area);
        return;
    }

    if app.phase == Phase::Uninitialized {
        return;
    }

    // [table] [footer]
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(FOOTER_HEIGHT)])
        .split(area);

    render_track_table(frame, chunks[0], &mut app.table);
    render_footer(frame, chunks[1], app);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = if app.is_loading() {
        Line::from(Span::styled("Reading tags…", Style::default().fg(HINT_COLOR)))
    } else if let Some(status) = &app.status {
        Line::from(status.as_str())
    } else {
        let focus = if app.table.is_focused() {
            "esc blur"
        } else {
            "esc focus"
        };
        Line::from(Span::styled(
            format!(
                "{} files · enter preview · {} · 1-9 columns · q quit",
                app.files().len(),
                focus
            ),
            Style::default().fg(HINT_COLOR),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}
