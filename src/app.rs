//! Main application state and logic.

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::{ColumnSpec, Config, UiConfig};
use crate::library::{build_rows, TagKey, TagMap, TagReader};
use crate::ui::layout::compute_columns;
use crate::ui::{table_viewport_height, TrackTableState};

/// Lifecycle of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No terminal size known yet
    Uninitialized,
    /// Columns laid out, input is handled
    Ready,
}

/// Main application state.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,

    /// UI configuration
    pub config: UiConfig,

    /// Column set the current rows were built for
    pub columns: Vec<ColumnSpec>,

    /// Column set of the row build in flight, if any
    pending_columns: Option<Vec<ColumnSpec>>,

    /// Audio files found at startup, in row order
    files: Arc<[PathBuf]>,

    /// Tag lookup used by row builds and previews
    tag_reader: Arc<dyn TagReader>,

    /// Action sender for worker results
    pub action_tx: mpsc::UnboundedSender<Action>,

    pub phase: Phase,

    /// Terminal width in cells
    pub terminal_width: u16,

    /// Terminal height in cells
    pub terminal_height: u16,

    /// Realized table
    pub table: TrackTableState,

    /// Last preview or notice shown under the table
    pub status: Option<String>,
}

impl App {
    /// Create a new application instance.
    pub fn new(
        config: Config,
        files: Vec<PathBuf>,
        tag_reader: Arc<dyn TagReader>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            should_quit: false,
            config: config.ui,
            columns: config.columns,
            pending_columns: None,
            files: files.into(),
            tag_reader,
            action_tx,
            phase: Phase::Uninitialized,
            terminal_width: 0,
            terminal_height: 0,
            table: TrackTableState::new(),
            status: None,
        }
    }

    /// Start building the rows for the configured columns.
    pub fn init(&mut self) {
        info!("Building rows for {} files", self.files.len());
        self.request_rows(self.columns.clone());
    }

    /// Whether the terminal is below the size the table needs.
    pub fn is_too_small(&self) -> bool {
        self.terminal_width < self.config.min_width
            || self.terminal_height < self.config.min_height
    }

    /// Whether any resize has been seen yet.
    pub fn has_size(&self) -> bool {
        self.terminal_width > 0 || self.terminal_height > 0
    }

    /// Whether a row build is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_columns.is_some()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Handle an action and update state.
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        if action.is_navigation() {
            self.status = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }

            Action::Resize(width, height) => {
                self.terminal_width = width;
                self.terminal_height = height;

                if self.is_too_small() {
                    debug!("Terminal too small: {}x{}", width, height);
                } else {
                    self.phase = Phase::Ready;
                    self.relayout();
                }
            }

            // Navigation
            Action::NavigateUp => self.table.select_previous(),
            Action::NavigateDown => self.table.select_next(),
            Action::PageUp => self.table.page_up(),
            Action::PageDown => self.table.page_down(),
            Action::ScrollHalfPageUp => self.table.half_page_up(),
            Action::ScrollHalfPageDown => self.table.half_page_down(),
            Action::JumpToTop => self.table.select_first(),
            Action::JumpToBottom => self.table.select_last(),

            Action::ToggleFocus => {
                if self.table.is_focused() {
                    self.table.blur();
                } else {
                    self.table.focus();
                }
            }

            Action::Preview => self.request_preview(),

            Action::ToggleColumn(index) => self.toggle_column(index),

            Action::RowsBuilt { columns, rows } => {
                if self.pending_columns.as_ref() != Some(&columns) {
                    debug!("Dropping rows built for a superseded column set");
                    return Ok(());
                }

                self.pending_columns = None;
                self.status = None;
                self.columns = columns;
                self.table.set_rows(rows);
                info!("Built {} rows", self.table.rows.len());

                if self.phase == Phase::Ready && !self.is_too_small() {
                    self.relayout();
                }
            }

            Action::PreviewReady(text) => {
                self.status = Some(text);
            }

            Action::None => {}
        }

        Ok(())
    }

    /// Recompute column widths for the current terminal size.
    fn relayout(&mut self) {
        match compute_columns(&self.columns, self.terminal_width, self.config.margin) {
            Ok(columns) => self.table.columns = columns,
            Err(e) => warn!("Cannot lay out table: {}", e),
        }
        self.table.viewport_height = usize::from(table_viewport_height(self.terminal_height));
    }

    fn toggle_column(&mut self, index: usize) {
        let mut next = self
            .pending_columns
            .clone()
            .unwrap_or_else(|| self.columns.clone());

        let Some(column) = next.get_mut(index) else {
            return;
        };
        column.enabled = !column.enabled;

        if !next.iter().any(|c| c.enabled) {
            self.status = Some(String::from("At least one column must stay visible"));
            return;
        }

        self.request_rows(next);
    }

    /// Build rows for `columns` off the event loop.
    ///
    /// The new column set only takes effect together with its rows.
    fn request_rows(&mut self, columns: Vec<ColumnSpec>) {
        self.pending_columns = Some(columns.clone());

        let files = Arc::clone(&self.files);
        let reader = Arc::clone(&self.tag_reader);
        let tx = self.action_tx.clone();

        tokio::task::spawn_blocking(move || {
            let rows = build_rows(&files, &columns, reader.as_ref());
            if tx.send(Action::RowsBuilt { columns, rows }).is_err() {
                debug!("Row build finished after shutdown");
            }
        });
    }

    /// Read the selected file's preview field off the event loop.
    ///
    /// Tags are read again rather than taken from the row, so a file
    /// changed on disk since startup shows its new value here.
    fn request_preview(&mut self) {
        let Some(file) = self
            .table
            .cursor()
            .and_then(|i| self.files.get(i))
            .cloned()
        else {
            return;
        };

        let reader = Arc::clone(&self.tag_reader);
        let key = self.config.preview_field;
        let prefix = self.config.preview_prefix.clone();
        let tx = self.action_tx.clone();

        tokio::task::spawn_blocking(move || {
            let value = match reader.read_tags(&file) {
                Ok(tags) => preview_value(&tags, key),
                Err(e) => {
                    warn!("Failed to read tags for preview: {}", e);
                    String::new()
                }
            };
            if tx.send(Action::PreviewReady(format!("{prefix}{value}"))).is_err() {
                debug!("Preview finished after shutdown");
            }
        });
    }
}

/// All values of `key`, comma separated.
fn preview_value(tags: &TagMap, key: TagKey) -> String {
    tags.get(&key).map(|values| values.join(", ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::tags::testing::StaticTagReader;

    fn test_app(reader: StaticTagReader) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let files = vec![
            PathBuf::from("/music/a.mp3"),
            PathBuf::from("/music/b.flac"),
            PathBuf::from("/music/c.ogg"),
        ];
        let app = App::new(Config::default(), files, Arc::new(reader), tx);
        (app, rx)
    }

    fn library() -> StaticTagReader {
        StaticTagReader::default()
            .with("/music/a.mp3", &[(TagKey::Title, "Song A")])
            .with(
                "/music/b.flac",
                &[
                    (TagKey::Title, "Song B"),
                    (TagKey::Album, "X"),
                    (TagKey::Album, "Y"),
                ],
            )
    }

    /// Feed the next worker result back into the app.
    async fn pump(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("worker result");
        app.handle_action(action).unwrap();
    }

    async fn ready_app() -> (App, mpsc::UnboundedReceiver<Action>) {
        let (mut app, mut rx) = test_app(library());
        app.init();
        pump(&mut app, &mut rx).await;
        app.handle_action(Action::Resize(110, 30)).unwrap();
        (app, rx)
    }

    #[tokio::test]
    async fn test_starts_uninitialized() {
        let (app, _rx) = test_app(library());
        assert_eq!(app.phase, Phase::Uninitialized);
        assert!(app.table.columns.is_empty());
        assert!(app.table.rows.is_empty());
    }

    #[tokio::test]
    async fn test_rows_then_resize() {
        let (mut app, mut rx) = test_app(library());
        app.init();
        assert!(app.is_loading());
        pump(&mut app, &mut rx).await;
        assert!(!app.is_loading());

        app.handle_action(Action::Resize(110, 30)).unwrap();

        assert_eq!(app.phase, Phase::Ready);
        let widths: Vec<_> = app.table.columns.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![29, 43, 29]);
        assert_eq!(app.table.viewport_height, 26);
        assert_eq!(
            app.table.rows,
            vec![
                vec!["a.mp3", "Song A", ""],
                vec!["b.flac", "Song B", ""],
                vec!["c.ogg", "", ""],
            ]
        );
    }

    #[tokio::test]
    async fn test_resize_before_rows_arrive() {
        let (mut app, mut rx) = test_app(library());
        app.init();
        app.handle_action(Action::Resize(80, 24)).unwrap();
        assert_eq!(app.phase, Phase::Ready);
        assert_eq!(app.table.columns.len(), 3);
        assert!(app.table.rows.is_empty());

        pump(&mut app, &mut rx).await;
        assert_eq!(app.table.rows.len(), 3);
        assert_eq!(app.table.cursor(), Some(0));
    }

    #[tokio::test]
    async fn test_too_small_keeps_table() {
        let (mut app, _rx) = ready_app().await;
        let rows = app.table.rows.clone();
        let wide = app.table.columns.clone();

        app.handle_action(Action::Resize(15, 30)).unwrap();
        assert!(app.is_too_small());
        assert_eq!(app.table.rows, rows);
        assert_eq!(app.table.columns, wide);

        app.handle_action(Action::Resize(60, 5)).unwrap();
        assert!(app.is_too_small());

        app.handle_action(Action::Resize(60, 20)).unwrap();
        assert!(!app.is_too_small());
        assert_eq!(app.table.rows, rows);
        let widths: Vec<_> = app.table.columns.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![14, 21, 14]);
    }

    #[tokio::test]
    async fn test_first_resize_too_small_stays_uninitialized() {
        let (mut app, _rx) = test_app(library());
        app.handle_action(Action::Resize(10, 4)).unwrap();
        assert_eq!(app.phase, Phase::Uninitialized);
        assert!(app.table.columns.is_empty());
    }

    #[tokio::test]
    async fn test_focus_gates_navigation() {
        let (mut app, _rx) = ready_app().await;

        app.handle_action(Action::NavigateDown).unwrap();
        assert_eq!(app.table.cursor(), Some(1));

        app.handle_action(Action::ToggleFocus).unwrap();
        assert!(!app.table.is_focused());
        app.handle_action(Action::NavigateDown).unwrap();
        app.handle_action(Action::JumpToBottom).unwrap();
        assert_eq!(app.table.cursor(), Some(1));

        app.handle_action(Action::ToggleFocus).unwrap();
        app.handle_action(Action::JumpToBottom).unwrap();
        assert_eq!(app.table.cursor(), Some(2));
        app.handle_action(Action::JumpToTop).unwrap();
        assert_eq!(app.table.cursor(), Some(0));
    }

    #[tokio::test]
    async fn test_preview_selected_title() {
        let (mut app, mut rx) = ready_app().await;
        app.handle_action(Action::NavigateDown).unwrap();

        app.handle_action(Action::Preview).unwrap();
        pump(&mut app, &mut rx).await;

        assert_eq!(app.status.as_deref(), Some("Edit song: Song B"));
    }

    #[tokio::test]
    async fn test_preview_read_failure_is_blank() {
        let (mut app, mut rx) = ready_app().await;
        app.handle_action(Action::JumpToBottom).unwrap();

        app.handle_action(Action::Preview).unwrap();
        pump(&mut app, &mut rx).await;

        assert_eq!(app.status.as_deref(), Some("Edit song: "));
    }

    #[tokio::test]
    async fn test_preview_without_rows_does_nothing() {
        let (mut app, mut rx) = test_app(library());
        app.handle_action(Action::Resize(80, 24)).unwrap();
        app.handle_action(Action::Preview).unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(app.status, None);
    }

    #[tokio::test]
    async fn test_quit_from_every_state() {
        let (mut app, _rx) = test_app(library());
        app.handle_action(Action::Quit).unwrap();
        assert!(app.should_quit);

        let (mut app, _rx) = ready_app().await;
        app.handle_action(Action::Quit).unwrap();
        assert!(app.should_quit);

        let (mut app, _rx) = ready_app().await;
        app.handle_action(Action::Resize(5, 5)).unwrap();
        app.handle_action(Action::ToggleFocus).unwrap();
        app.handle_action(Action::Quit).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_toggle_column_rebuilds_rows_and_columns_together() {
        let (mut app, mut rx) = ready_app().await;

        // Show DiscNumber
        app.handle_action(Action::ToggleColumn(3)).unwrap();
        assert!(app.is_loading());
        assert_eq!(app.table.columns.len(), 3);
        assert_eq!(app.table.rows[0].len(), 3);

        pump(&mut app, &mut rx).await;

        let names: Vec<_> = app.table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["File", "Title", "Album", "DiscNumber"]);
        assert!(app.table.rows.iter().all(|row| row.len() == 4));
    }

    #[tokio::test]
    async fn test_superseded_row_build_is_dropped() {
        let (mut app, mut rx) = ready_app().await;

        app.handle_action(Action::ToggleColumn(0)).unwrap();
        app.handle_action(Action::ToggleColumn(2)).unwrap();
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        let names: Vec<_> = app.table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Title"]);
        assert_eq!(app.table.rows[0], vec!["Song A"]);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_last_column_cannot_be_hidden() {
        let (mut app, mut rx) = ready_app().await;
        app.handle_action(Action::ToggleColumn(0)).unwrap();
        app.handle_action(Action::ToggleColumn(1)).unwrap();
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        app.handle_action(Action::ToggleColumn(2)).unwrap();

        assert!(!app.is_loading());
        assert_eq!(
            app.status.as_deref(),
            Some("At least one column must stay visible")
        );
        assert_eq!(app.table.columns.len(), 1);

        // A later successful toggle replaces the notice
        app.handle_action(Action::ToggleColumn(0)).unwrap();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.status, None);
        assert_eq!(app.table.columns.len(), 2);
    }

    #[tokio::test]
    async fn test_navigation_clears_preview() {
        let (mut app, mut rx) = ready_app().await;
        app.handle_action(Action::Preview).unwrap();
        pump(&mut app, &mut rx).await;
        assert_eq!(app.status.as_deref(), Some("Edit song: Song A"));

        app.handle_action(Action::NavigateDown).unwrap();
        assert_eq!(app.status, None);
    }

    #[tokio::test]
    async fn test_toggle_unknown_column_is_ignored() {
        let (mut app, mut rx) = ready_app().await;
        app.handle_action(Action::ToggleColumn(8)).unwrap();
        assert!(!app.is_loading());
        assert!(rx.try_recv().is_err());
    }
}
