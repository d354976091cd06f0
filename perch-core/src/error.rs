//! Error type shared by the core and its collaborators.

use std::path::PathBuf;

/// Failures surfaced by collaborators or by parsing.
///
/// None of these are fatal inside the core: the preview builder turns every
/// variant into a degraded [`crate::preview::PreviewContent`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("git: {0}")]
    Git(String),
    #[error("malformed hunk header: {0:?}")]
    MalformedHunk(String),
    #[error("highlighter returned {got} lines, expected {expected}")]
    LineCountMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
