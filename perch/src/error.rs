//! Fatal startup failures.
//!
//! Everything after startup degrades instead of failing; these are the only
//! errors that end the process with a non-zero exit code.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} is not inside a git repository", .0.display())]
    NotARepository(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}
