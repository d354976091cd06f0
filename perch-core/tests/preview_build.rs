//! Building previews from files on disk with fake status and highlighter.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use perch_core::preview::{build_preview, split_lines, unsupported_reason, PreviewCache};
use perch_core::source::{Highlighter, PlainHighlighter, StatusSource};
use perch_core::types::{DiffStats, DiffStatus, FileEntry, Origin};
use perch_core::{Error, Result};
use tempfile::TempDir;

#[derive(Default)]
struct FakeSource {
    diff: String,
    summary: Option<DiffStats>,
    diff_calls: AtomicUsize,
}

impl StatusSource for FakeSource {
    fn list_changed_files(&self, _dir: &Path) -> Result<Vec<FileEntry>> {
        Ok(Vec::new())
    }

    fn unified_diff(&self, _git_root: &Path, _repo_path: &Path) -> Result<String> {
        self.diff_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.diff.clone())
    }

    fn diff_summary(&self, _git_root: &Path, _repo_path: &Path) -> Result<DiffStats> {
        self.summary.ok_or_else(|| Error::Git("no summary".into()))
    }
}

/// Wraps every line in red.
struct RedHighlighter;

impl Highlighter for RedHighlighter {
    fn highlight(&self, content: &str, _path: &Path) -> Vec<String> {
        split_lines(content).into_iter().map(|l| format!("\x1b[31m{l}\x1b[0m")).collect()
    }
}

/// Drops the last line, which the builder must not accept.
struct ShortHighlighter;

impl Highlighter for ShortHighlighter {
    fn highlight(&self, content: &str, _path: &Path) -> Vec<String> {
        let mut lines = split_lines(content);
        lines.pop();
        lines
    }
}

fn entry_in(dir: &TempDir, name: &str, origin: Origin, code: &str) -> FileEntry {
    FileEntry {
        path: PathBuf::from(name),
        abs_path: dir.path().join(name),
        repo_path: PathBuf::from(name),
        git_root: dir.path().to_path_buf(),
        origin,
        change_code: code.to_owned(),
        commit_id: (origin == Origin::Committed).then(|| "abc1234".to_owned()),
        commit_age: None,
        mod_time: SystemTime::now(),
    }
}

#[test]
fn uncommitted_file_gets_diff_markers() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {\n    one();\n    two();\n}\n").unwrap();
    let source = FakeSource {
        diff: "@@ -1,0 +2,2 @@\n+    one();\n+    two();\n".into(),
        ..FakeSource::default()
    };
    let entry = entry_in(&dir, "main.rs", Origin::Uncommitted, " M");

    let content = build_preview(&entry, &source, &RedHighlighter);
    assert!(content.message.is_none());
    assert_eq!(content.raw_lines.len(), 4);
    assert_eq!(content.line_count(), 4);
    assert_eq!(content.raw_lines[1], "    one();");
    assert!(content.highlighted_lines[0].starts_with("\x1b[31m"));
    assert_eq!(content.diff_lines.get(2), DiffStatus::Added);
    assert_eq!(content.diff_lines.get(3), DiffStatus::Added);
    assert_eq!(content.diff_stats, DiffStats { added: 2, deleted: 0 });
}

#[test]
fn summary_overrides_counted_stats() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "x\n").unwrap();
    let source = FakeSource {
        diff: "@@ -1 +1 @@\n-y\n+x\n".into(),
        summary: Some(DiffStats { added: 7, deleted: 3 }),
        ..FakeSource::default()
    };
    let entry = entry_in(&dir, "a.txt", Origin::Uncommitted, " M");
    let content = build_preview(&entry, &source, &PlainHighlighter);
    assert_eq!(content.diff_stats, DiffStats { added: 7, deleted: 3 });
}

#[test]
fn deletion_past_the_end_lands_on_the_last_line() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
    let source = FakeSource {
        diff: "@@ -3,2 +4,0 @@\n-three\n-four\n".into(),
        ..FakeSource::default()
    };
    let entry = entry_in(&dir, "a.txt", Origin::Uncommitted, " M");
    let content = build_preview(&entry, &source, &PlainHighlighter);
    assert_eq!(content.diff_lines.get(2), DiffStatus::Deleted);
    assert_eq!(content.diff_lines.len(), 1);
}

#[test]
fn committed_file_is_not_diffed() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "one\n").unwrap();
    let source = FakeSource {
        diff: "@@ -0,0 +1 @@\n+one\n".into(),
        ..FakeSource::default()
    };
    let entry = entry_in(&dir, "a.txt", Origin::Committed, "");
    let content = build_preview(&entry, &source, &PlainHighlighter);
    assert!(content.diff_lines.is_empty());
    assert_eq!(source.diff_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn deleted_file_shows_a_message() {
    let dir = TempDir::new().unwrap();
    let entry = entry_in(&dir, "gone.rs", Origin::Uncommitted, " D");
    let content = build_preview(&entry, &FakeSource::default(), &PlainHighlighter);
    assert_eq!(content.message.as_deref(), Some("gone.rs was deleted"));
    assert!(content.raw_lines.is_empty());
}

#[test]
fn unreadable_file_shows_a_message() {
    let dir = TempDir::new().unwrap();
    let entry = entry_in(&dir, "missing.rs", Origin::Uncommitted, "??");
    let content = build_preview(&entry, &FakeSource::default(), &PlainHighlighter);
    assert_eq!(content.message.as_deref(), Some("couldn't read missing.rs"));
}

#[test]
fn unsupported_types_are_named() {
    assert_eq!(unsupported_reason(Path::new("logo.PNG")), Some("not supported in perch"));
    assert_eq!(
        unsupported_reason(Path::new("Makefile")),
        Some("no file extension, open in your editor")
    );
    assert_eq!(
        unsupported_reason(Path::new("App.xcodeproj/project.pbxproj")),
        Some("not supported in perch")
    );
    assert_eq!(unsupported_reason(Path::new("src/lib.rs")), None);

    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("img")).unwrap();
    fs::write(dir.path().join("img/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    let entry = entry_in(&dir, "img/logo.png", Origin::Uncommitted, "??");
    let content = build_preview(&entry, &FakeSource::default(), &PlainHighlighter);
    assert_eq!(content.message.as_deref(), Some("logo.png\nnot supported in perch"));
}

#[test]
fn binary_content_is_detected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blob.dat"), [b'a', 0, b'b']).unwrap();
    let entry = entry_in(&dir, "blob.dat", Origin::Uncommitted, "??");
    let content = build_preview(&entry, &FakeSource::default(), &PlainHighlighter);
    assert_eq!(content.message.as_deref(), Some("blob.dat\nbinary file"));
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("latin.txt"), b"caf\xe9\nok\n").unwrap();
    let entry = entry_in(&dir, "latin.txt", Origin::Uncommitted, "??");
    let content = build_preview(&entry, &FakeSource::default(), &PlainHighlighter);
    assert_eq!(content.raw_lines, vec!["caf\u{fffd}".to_owned(), "ok".to_owned()]);
}

#[test]
fn highlighter_line_mismatch_falls_back_to_plain() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.rs"), "a\nb\nc\n").unwrap();
    let entry = entry_in(&dir, "a.rs", Origin::Uncommitted, "??");
    let content = build_preview(&entry, &FakeSource::default(), &ShortHighlighter);
    assert_eq!(content.highlighted_lines, content.raw_lines);
    assert_eq!(content.line_count(), 3);
}

#[test]
fn empty_file_has_no_lines() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("empty.rs"), "").unwrap();
    let source = FakeSource {
        diff: "@@ -1 +0,0 @@\n-gone\n".into(),
        ..FakeSource::default()
    };
    let entry = entry_in(&dir, "empty.rs", Origin::Uncommitted, " M");
    let content = build_preview(&entry, &source, &PlainHighlighter);
    assert!(content.message.is_none());
    assert_eq!(content.line_count(), 0);
    assert!(content.diff_lines.is_empty());
}

#[test]
fn line_splitting_rules() {
    assert!(split_lines("").is_empty());
    assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b"]);
    assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
    assert_eq!(split_lines("no newline"), vec!["no newline"]);
}

#[test]
fn cache_only_holds_committed_previews() {
    let dir = TempDir::new().unwrap();
    let committed = entry_in(&dir, "a.txt", Origin::Committed, "");
    let uncommitted = entry_in(&dir, "b.txt", Origin::Uncommitted, " M");
    let content = std::sync::Arc::new(Default::default());

    let mut cache = PreviewCache::new();
    assert!(cache.insert(&committed, std::sync::Arc::clone(&content)));
    assert!(!cache.insert(&uncommitted, content));
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&committed).is_some());
    assert!(cache.get(&uncommitted).is_none());

    let mut newer = committed.clone();
    newer.commit_id = Some("def5678".into());
    assert!(cache.get(&newer).is_none());
}
