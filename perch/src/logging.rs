//! Logging setup: everything goes to a file because the terminal belongs to
//! the TUI.
//!
//! ## Environment Variables
//!
//! 1. **`PERCH_LOG`** (highest priority). A bare level such as `debug` is
//!    expanded to both perch crates; anything with `=`, `:` or `,` is used
//!    as a full filter.
//! 2. **`RUST_LOG`**, used as-is.
//! 3. **Default**: `warn` globally, `info` for perch crates.
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/perch/logs/perch-<pid>.log`
//! - macOS: `~/Library/Application Support/perch/logs/perch-12345.log`
//! - Linux: `~/.local/share/perch/logs/perch-12345.log`
//!
//! Override with `--log-file <path>`.

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "warn,perch=info,perch_core=info";

/// Returned from [`init`]; hold it for the life of the process so buffered
/// lines are flushed on exit.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Installs the global subscriber writing to `override_path` or the default
/// log file.
pub fn init(override_path: Option<PathBuf>) -> Result<LogGuard, Box<dyn std::error::Error + Send + Sync>> {
    let (log_dir, filename) = resolve_log_path(override_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    Registry::default()
        .with(create_filter(env::var("PERCH_LOG").ok(), env::var("RUST_LOG").ok()))
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Splits the log location into a directory and a file name.
///
/// An override with an extension names the file; one without is a directory.
fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("perch-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map_or(filename, |n| n.to_string_lossy().into_owned());
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("perch")
        .join("logs");
    (dir, filename)
}

fn create_filter(perch_log: Option<String>, rust_log: Option<String>) -> EnvFilter {
    EnvFilter::new(filter_directives(perch_log, rust_log))
}

/// Filter string chosen by the `PERCH_LOG` > `RUST_LOG` > default priority.
fn filter_directives(perch_log: Option<String>, rust_log: Option<String>) -> String {
    if let Some(level) = perch_log {
        if level.contains(['=', ':', ',']) {
            return level;
        }
        return format!("warn,perch={level},perch_core={level}");
    }
    rust_log.unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}
