//! perch: a terminal dashboard of recently changed files in a git
//! repository, with a diff-marked, syntax-highlighted preview.
//!
//! # Startup sequence
//!
//! 1. Parse the CLI and validate the target directory. Failures here print
//!    to stderr and exit with code 1 before the terminal is touched.
//! 2. Logging, config, and theme.
//! 3. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 4. Event task, status worker, and the initial refresh.
//!
//! `restore_tui()` runs after the event loop exits however it exits: quit
//! key, SIGTERM, closed input, or a draw error. The panic hook covers panics.

mod config;
mod effects;
mod error;
mod event;
mod git;
mod highlight;
mod logging;
mod theme;
mod tui;
mod ui;

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use perch_core::source::{Highlighter, StatusSource};
use perch_core::update::{update, Model, Msg};
use tracing::{info, warn};

use crate::effects::Executor;
use crate::error::StartupError;
use crate::event::{AppEvent, EventHandler};
use crate::git::worker::spawn_status_worker;
use crate::git::Git2Source;
use crate::highlight::SyntectHighlighter;
use crate::theme::Theme;
use crate::ui::keybindings::{map_key, map_mouse};

/// How often the loop wakes up to check for SIGTERM when idle.
const HEARTBEAT: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "perch", version, about = "Watch the files changing in a git repository")]
struct Cli {
    /// Directory to watch; must be inside a git repository.
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Write logs here instead of the default per-process file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Resolves `dir` to an absolute directory inside a git repository.
fn validate_dir(dir: &Path) -> Result<PathBuf, StartupError> {
    let canonical = dir
        .canonicalize()
        .map_err(|e| StartupError::io(format!("cannot open {}", dir.display()), e))?;
    if !canonical.is_dir() {
        return Err(StartupError::NotADirectory(canonical));
    }
    git2::Repository::discover(&canonical).map_err(|_| StartupError::NotARepository(canonical.clone()))?;
    Ok(canonical)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dir = match validate_dir(&cli.dir) {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("perch: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Logging failure is not fatal; the dashboard works without a log file.
    let _log_guard = match logging::init(cli.log_file) {
        Ok(guard) => {
            info!(log_file = %guard.log_file.display(), dir = %dir.display(), "perch starting");
            Some(guard)
        }
        Err(err) => {
            eprintln!("perch: logging disabled: {err}");
            None
        }
    };

    let config = config::Config::load();
    let theme = Theme::from_name(&config.theme);
    SyntectHighlighter::warm_up();

    match run(dir, &theme).await {
        Ok(()) => {
            info!("perch exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("perch: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(dir: PathBuf, theme: &Theme) -> std::io::Result<()> {
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let result = event_loop(&mut terminal, dir, theme, &term_flag).await;

    tui::restore_tui()?;
    result
}

async fn event_loop(
    terminal: &mut tui::Tui,
    dir: PathBuf,
    theme: &Theme,
    term_flag: &AtomicBool,
) -> std::io::Result<()> {
    let handler = EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let source: Arc<dyn StatusSource> = Arc::new(Git2Source);
    let highlighter: Arc<dyn Highlighter> = Arc::new(SyntectHighlighter);
    let dir_label = dir.display().to_string();
    let (status_tx, _worker) = spawn_status_worker(dir, Arc::clone(&source), handler.tx.clone())?;
    let executor = Executor::new(handler.tx, status_tx, source, highlighter);

    let size = terminal.size()?;
    let (mut model, effects) = Model::init(usize::from(size.width), usize::from(size.height));
    if executor.execute(effects).is_break() {
        return Ok(());
    }

    'event_loop: loop {
        tokio::select! {
            _ = tokio::time::sleep(HEARTBEAT) => {}
            maybe_event = rx.recv() => {
                let msg = match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, &mut model, theme, &dir_label))?;
                        None
                    }
                    Some(AppEvent::Key(key)) => map_key(key, model.show_help).map(Msg::Action),
                    Some(AppEvent::Mouse(mouse)) => map_mouse(mouse, model.show_help).map(Msg::Action),
                    Some(AppEvent::Resize(width, height)) => Some(Msg::Resize {
                        width: usize::from(width),
                        height: usize::from(height),
                    }),
                    Some(AppEvent::Tick) => Some(Msg::Tick),
                    Some(AppEvent::FilesLoaded(files)) => Some(Msg::FilesLoaded(files)),
                    Some(AppEvent::DebounceFired { generation }) => Some(Msg::DebounceFired { generation }),
                    Some(AppEvent::PreviewLoaded(loaded)) => Some(Msg::PreviewLoaded(*loaded)),
                    Some(AppEvent::Quit) | None => break 'event_loop,
                };
                if let Some(msg) = msg {
                    let (next, effects) = update(model, msg);
                    model = next;
                    if let ControlFlow::Break(()) = executor.execute(effects) {
                        break 'event_loop;
                    }
                }
            }
        }
        if term_flag.load(Ordering::Relaxed) {
            warn!("SIGTERM received");
            break 'event_loop;
        }
    }
    Ok(())
}
