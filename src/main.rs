//! tagtable - Browse the audio files of a directory as a table of their tags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{info, trace};
use tracing_subscriber::prelude::*;

mod action;
mod app;
mod config;
mod library;
mod tui;
mod ui;

use action::Action;
use app::App;
use config::Config;
use library::{scan_files, SignatureClassifier, SymphoniaTagReader};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "tagtable")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hooks
    tui::install_hooks()?;

    // Initialize logging
    let log_file = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tagtable")
        .join("tagtable.log");

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_subscriber::fmt::layer()
        .with_writer(std::fs::File::create(&log_file)?)
        .with_ansi(false);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::sink) // Don't write to stdout in TUI mode
        .finish()
        .with(file_appender)
        .try_init()
        .ok();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    // Discover audio files before the terminal is taken over
    let cwd = std::env::current_dir().wrap_err("Failed to read working directory")?;
    let files = scan_files(&cwd, &SignatureClassifier)
        .wrap_err_with(|| format!("Failed to scan {}", cwd.display()))?;
    info!("Found {} audio files in {}", files.len(), cwd.display());

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(config, files, Arc::new(SymphoniaTagReader), action_tx.clone());
    app.init();

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &action_tx, &mut action_rx);

    tui::restore()?;

    result
}

/// Load the configuration.
///
/// A broken file at the default location falls back to the defaults; an
/// explicit `--config` must load.
fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load_from(path);
    }

    Ok(Config::load_or_default(Config::config_path().as_deref()))
}

/// Main event loop.
fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    action_tx: &mpsc::UnboundedSender<Action>,
    action_rx: &mut mpsc::UnboundedReceiver<Action>,
) -> Result<()> {
    // Lay out the table before the first frame
    let (width, height) = crossterm::terminal::size()?;
    app.handle_action(Action::Resize(width, height))?;

    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with timeout
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = handle_key_event(key.code, key.modifiers);
                        if action != Action::None {
                            action_tx.send(action)?;
                        }
                    }
                }
                Event::Resize(width, height) => {
                    action_tx.send(Action::Resize(width, height))?;
                }
                _ => {}
            }
        }

        // Process all pending actions
        while let Ok(action) = action_rx.try_recv() {
            app.handle_action(action)?;
        }

        if app.should_quit {
            break;
        }
    }

    terminal.clear()?;

    Ok(())
}

/// Map key events to actions.
fn handle_key_event(code: KeyCode, modifiers: KeyModifiers) -> Action {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    let action = match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,

        KeyCode::Esc => Action::ToggleFocus,
        KeyCode::Enter => Action::Preview,

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Action::NavigateUp,
        KeyCode::Down | KeyCode::Char('j') => Action::NavigateDown,
        KeyCode::PageUp | KeyCode::Char('b') => Action::PageUp,
        KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' ') => Action::PageDown,
        KeyCode::Char('u') => Action::ScrollHalfPageUp,
        KeyCode::Char('d') => Action::ScrollHalfPageDown,
        KeyCode::Home | KeyCode::Char('g') => Action::JumpToTop,
        KeyCode::End | KeyCode::Char('G') => Action::JumpToBottom,

        // Column visibility
        KeyCode::Char(c @ '1'..='9') => Action::ToggleColumn(c as usize - '1' as usize),

        _ => Action::None,
    };

    trace!(?code, ?modifiers, ?action, "key");
    action
}
