//! Collaborator seams: where file lists, diffs, and colours come from.
//!
//! The binary implements these on top of git2 and syntect; tests use fakes.
//! Implementations must be callable from any thread because preview builds
//! run off the event loop.

use std::path::Path;

use crate::error::Result;
use crate::preview::split_lines;
use crate::types::{DiffStats, FileEntry};

/// Status and diff provider.
pub trait StatusSource: Send + Sync {
    /// Changed files under `dir`, most recently touched first.
    fn list_changed_files(&self, dir: &Path) -> Result<Vec<FileEntry>>;

    /// Zero-context unified diff of `repo_path` against HEAD in `git_root`.
    fn unified_diff(&self, git_root: &Path, repo_path: &Path) -> Result<String>;

    /// Numeric added/deleted summary of the same diff.
    fn diff_summary(&self, git_root: &Path, repo_path: &Path) -> Result<DiffStats>;
}

/// Syntax colouriser.
pub trait Highlighter: Send + Sync {
    /// One ANSI-coloured string per line of `split_lines(content)`, each
    /// closed so it can be wrapped on its own. Unknown file types come back
    /// as plain lines.
    fn highlight(&self, content: &str, path: &Path) -> Vec<String>;
}

/// Highlighter that returns lines unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, content: &str, _path: &Path) -> Vec<String> {
        split_lines(content)
    }
}
