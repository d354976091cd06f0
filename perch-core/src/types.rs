//! Owned data types shared by every component.
//!
//! All types are fully owned and `Send` so they can be produced on a
//! background thread and handed to the event loop inside a message.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Where a changed file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Modified, added, deleted, or untracked in the working tree.
    Uncommitted,
    /// Touched by one of the recent commits and clean in the working tree.
    Committed,
}

/// Display category derived from a porcelain-style change code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Modified,
    Deleted,
    Renamed,
    Committed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::New => "new",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Committed => "committed",
        }
    }
}

/// One changed file as reported by the status collaborator.
///
/// Identity is `path`. Entries are immutable and replaced wholesale on every
/// refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Path relative to the watched directory. Used for display and identity.
    pub path: PathBuf,
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    /// Path relative to `git_root`, as git knows it.
    pub repo_path: PathBuf,
    /// Working directory of the repository that owns this file.
    pub git_root: PathBuf,
    pub origin: Origin,
    /// Two-character porcelain-style code, e.g. `" M"`, `"??"`, `"D "`.
    pub change_code: String,
    /// Short commit id for committed entries.
    pub commit_id: Option<String>,
    /// Age of the commit at listing time, for committed entries.
    pub commit_age: Option<Duration>,
    pub mod_time: SystemTime,
}

impl FileEntry {
    pub fn is_deleted(&self) -> bool {
        self.origin == Origin::Uncommitted && self.change_code.contains('D')
    }

    pub fn change_kind(&self) -> ChangeKind {
        if self.origin == Origin::Committed {
            return ChangeKind::Committed;
        }
        let code = self.change_code.as_str();
        if code == "??" || code.contains('A') {
            ChangeKind::New
        } else if code.contains('D') {
            ChangeKind::Deleted
        } else if code.contains('R') {
            ChangeKind::Renamed
        } else {
            ChangeKind::Modified
        }
    }
}

/// Sorts entries most recently touched first. Ties keep path order so the
/// list does not shuffle between refreshes.
pub fn sort_by_recency(files: &mut [FileEntry]) {
    files.sort_by(|a, b| b.mod_time.cmp(&a.mod_time).then_with(|| a.path.cmp(&b.path)));
}

/// Per-line diff classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffStatus {
    #[default]
    Unchanged,
    Added,
    Deleted,
}

/// 1-based line number in the new file → classification.
///
/// Deleted lines are anchored at the line preceding the removal point.
/// Unchanged lines are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffLineMap(BTreeMap<usize, DiffStatus>);

impl DiffLineMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `status` at `line`; a later write to the same line wins.
    pub fn insert(&mut self, line: usize, status: DiffStatus) {
        self.0.insert(line, status);
    }

    pub fn get(&self, line: usize) -> DiffStatus {
        self.0.get(&line).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Lowest line number carrying a change.
    pub fn first_changed_line(&self) -> Option<usize> {
        self.0.keys().next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, DiffStatus)> + '_ {
        self.0.iter().map(|(&line, &status)| (line, status))
    }

    /// Moves every anchor past `line_count` onto the last line.
    ///
    /// Deletions at end of file point just past the new content; they are
    /// shown on the last line that still exists. An existing entry on the
    /// last line keeps its status.
    pub fn clamp_to(&mut self, line_count: usize) {
        if line_count == 0 {
            self.0.clear();
            return;
        }
        let overflow = self.0.split_off(&(line_count + 1));
        if let Some((_, status)) = overflow.into_iter().next_back() {
            self.0.entry(line_count).or_insert(status);
        }
    }
}

impl FromIterator<(usize, DiffStatus)> for DiffLineMap {
    fn from_iter<T: IntoIterator<Item = (usize, DiffStatus)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Added/deleted line counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
}

/// One terminal row produced by wrapping a logical preview line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualLine {
    /// Index into the preview's highlighted lines.
    pub logical_index: usize,
    /// 0 for the primary segment, 1.. for continuations.
    pub segment_index: usize,
    /// Two-column marker: `"+ "`, `"- "`, `"· "`, or blank on continuations.
    pub gutter: &'static str,
    /// ANSI-bearing text, closed with a reset when it carries open styles.
    pub text: String,
    pub diff_status: DiffStatus,
}
