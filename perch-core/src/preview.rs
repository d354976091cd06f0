//! Preview building and the committed-file cache.
//!
//! [`PreviewRequest::run`] is the background half of the preview pipeline:
//! it takes an immutable snapshot of the selected [`FileEntry`] and produces
//! a complete [`PreviewContent`]. The event-loop half lives in
//! [`crate::update`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::diff;
use crate::error::Error;
use crate::source::{Highlighter, StatusSource};
use crate::types::{DiffLineMap, DiffStats, FileEntry, Origin, VisualLine};
use crate::wrap::WrapCache;

/// Files above this size are not previewed.
pub const MAX_PREVIEW_BYTES: usize = 10 * 1024 * 1024;

/// Prefix inspected for NUL bytes when sniffing binary content.
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

const UNSUPPORTED_EXTENSIONS: &[&str] = &[
    "xcuserstate", "xcworkspace", "pbxproj", "png", "jpg", "jpeg", "gif", "ico", "webp", "exe",
    "dll", "so", "dylib", "zip", "tar", "gz", "rar", "mp3", "mp4", "wav", "mov", "ttf", "otf",
    "woff", "woff2", "pdf",
];

/// Everything the preview pane shows for one file.
///
/// Built once and never mutated; a new build replaces the whole value.
/// When `message` is set the line vectors are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewContent {
    pub message: Option<String>,
    pub raw_lines: Vec<String>,
    pub highlighted_lines: Vec<String>,
    pub diff_lines: DiffLineMap,
    pub diff_stats: DiffStats,
}

impl PreviewContent {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_message(&self) -> bool {
        self.message.is_some()
    }

    pub fn line_count(&self) -> usize {
        self.highlighted_lines.len()
    }
}

/// The current preview plus its wrap cache, replaced together.
#[derive(Debug, Clone)]
pub struct Preview {
    content: Arc<PreviewContent>,
    wrap: WrapCache,
}

impl Preview {
    pub fn new(content: Arc<PreviewContent>) -> Self {
        Self {
            content,
            wrap: WrapCache::new(),
        }
    }

    pub fn content(&self) -> &Arc<PreviewContent> {
        &self.content
    }

    pub fn wrapped(&mut self, width: usize) -> Arc<[VisualLine]> {
        self.wrap.get_or_wrap(&self.content, width)
    }

    pub fn wrap_cache(&self) -> &WrapCache {
        &self.wrap
    }

    pub fn reset_wrap_cache(&mut self) {
        self.wrap.clear();
    }
}

/// Splits file text into lines. A trailing newline does not add an empty
/// last line and `\r` before `\n` is dropped.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
        .collect()
}

/// Why `path` cannot be previewed from its name alone.
pub fn unsupported_reason(path: &Path) -> Option<&'static str> {
    let text = path.to_string_lossy();
    if text.contains(".xcworkspace") || text.contains(".xcodeproj") {
        return Some("not supported in perch");
    }
    match path.extension().map(|e| e.to_string_lossy().to_lowercase()) {
        None => Some("no file extension, open in your editor"),
        Some(ext) if UNSUPPORTED_EXTENSIONS.contains(&ext.as_str()) => {
            Some("not supported in perch")
        }
        Some(_) => None,
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_BYTES)].contains(&0)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned()
}

/// Builds the preview for `entry`. Every failure becomes a message or a
/// plainer rendering; this never returns an error.
pub fn build_preview(
    entry: &FileEntry,
    source: &dyn StatusSource,
    highlighter: &dyn Highlighter,
) -> PreviewContent {
    let shown = entry.path.display();
    if entry.is_deleted() {
        return PreviewContent::message(format!("{shown} was deleted"));
    }
    if let Some(reason) = unsupported_reason(&entry.path) {
        return PreviewContent::message(format!("{}\n{reason}", display_name(&entry.path)));
    }

    let bytes = match std::fs::read(&entry.abs_path) {
        Ok(bytes) => bytes,
        Err(io) => {
            let err = Error::Io { path: entry.abs_path.clone(), source: io };
            debug!(%err, "preview read failed");
            return PreviewContent::message(format!("couldn't read {shown}"));
        }
    };
    if bytes.len() > MAX_PREVIEW_BYTES {
        return PreviewContent::message(format!(
            "{}\ntoo large to preview",
            display_name(&entry.path)
        ));
    }
    if looks_binary(&bytes) {
        return PreviewContent::message(format!("{}\nbinary file", display_name(&entry.path)));
    }

    let text = String::from_utf8_lossy(&bytes);
    let raw_lines = split_lines(&text);

    let (mut diff_lines, diff_stats) = match entry.origin {
        Origin::Uncommitted => classify_entry(entry, source),
        Origin::Committed => (DiffLineMap::new(), DiffStats::default()),
    };
    diff_lines.clamp_to(raw_lines.len());

    let highlighted_lines = checked_highlight(highlighter, &text, &entry.path, &raw_lines);

    PreviewContent {
        message: None,
        raw_lines,
        highlighted_lines,
        diff_lines,
        diff_stats,
    }
}

fn classify_entry(entry: &FileEntry, source: &dyn StatusSource) -> (DiffLineMap, DiffStats) {
    let text = source
        .unified_diff(&entry.git_root, &entry.repo_path)
        .unwrap_or_else(|err| {
            warn!(path = %entry.path.display(), %err, "diff unavailable");
            String::new()
        });
    let (map, counted) = diff::classify(&text);
    let stats = match source.diff_summary(&entry.git_root, &entry.repo_path) {
        Ok(stats) => stats,
        Err(err) => {
            debug!(path = %entry.path.display(), %err, "diff summary unavailable, using counts");
            counted
        }
    };
    (map, stats)
}

fn checked_highlight(
    highlighter: &dyn Highlighter,
    text: &str,
    path: &Path,
    raw_lines: &[String],
) -> Vec<String> {
    let lines = highlighter.highlight(text, path);
    if lines.len() == raw_lines.len() {
        return lines;
    }
    let err = Error::LineCountMismatch { expected: raw_lines.len(), got: lines.len() };
    warn!(path = %path.display(), %err, "falling back to plain text");
    raw_lines.to_vec()
}

/// Snapshot handed to a background preview build.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    /// Debounce generation that dispatched this build.
    pub generation: u64,
    /// Selection index at dispatch time.
    pub index: usize,
    pub entry: FileEntry,
    /// Keep the viewport position instead of jumping when applied.
    pub keep_scroll: bool,
}

impl PreviewRequest {
    pub fn run(self, source: &dyn StatusSource, highlighter: &dyn Highlighter) -> PreviewLoaded {
        let content = build_preview(&self.entry, source, highlighter);
        PreviewLoaded {
            generation: self.generation,
            index: self.index,
            path: self.entry.path,
            content: Arc::new(content),
            keep_scroll: self.keep_scroll,
        }
    }
}

/// Result of a background build, applied only if still current.
#[derive(Debug, Clone)]
pub struct PreviewLoaded {
    pub generation: u64,
    pub index: usize,
    pub path: PathBuf,
    pub content: Arc<PreviewContent>,
    pub keep_scroll: bool,
}

/// Cache of committed-file previews. Uncommitted files are never stored.
#[derive(Debug, Default, Clone)]
pub struct PreviewCache {
    entries: HashMap<(PathBuf, String), Arc<PreviewContent>>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(entry: &FileEntry) -> Option<(PathBuf, String)> {
        match entry.origin {
            Origin::Committed => {
                Some((entry.path.clone(), entry.commit_id.clone().unwrap_or_default()))
            }
            Origin::Uncommitted => None,
        }
    }

    pub fn get(&self, entry: &FileEntry) -> Option<Arc<PreviewContent>> {
        Self::key(entry).and_then(|key| self.entries.get(&key).cloned())
    }

    /// Stores `content` if `entry` is committed. Returns whether it was stored.
    pub fn insert(&mut self, entry: &FileEntry, content: Arc<PreviewContent>) -> bool {
        match Self::key(entry) {
            Some(key) => {
                self.entries.insert(key, content);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
