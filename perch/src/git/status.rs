//! Changed-file listing and per-file diffs via git2.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use git2::{Delta, Diff, DiffFormat, DiffOptions, Repository, Sort, Status, StatusEntry, StatusOptions};
use perch_core::source::StatusSource;
use perch_core::types::{sort_by_recency, DiffStats, FileEntry, Origin};
use perch_core::{Error, Result};
use tracing::{debug, warn};

/// Commits walked back from HEAD for the "recently committed" entries.
const RECENT_COMMITS: usize = 10;

/// Length of the abbreviated commit id shown in the list.
const SHORT_ID_LEN: usize = 7;

/// `StatusSource` backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Source;

impl StatusSource for Git2Source {
    fn list_changed_files(&self, dir: &Path) -> Result<Vec<FileEntry>> {
        let repo = Repository::discover(dir).map_err(git_error)?;
        let mut files = Vec::new();
        let mut seen = HashSet::new();
        collect_uncommitted(&repo, dir, &mut files, &mut seen).map_err(git_error)?;
        if let Err(err) = collect_committed(&repo, dir, &mut files, &mut seen) {
            // Unborn HEAD and shallow clones end up here; the uncommitted list
            // is still worth showing.
            debug!(%err, "recent commits unavailable");
        }
        sort_by_recency(&mut files);
        Ok(files)
    }

    fn unified_diff(&self, git_root: &Path, repo_path: &Path) -> Result<String> {
        let repo = Repository::open(git_root).map_err(git_error)?;
        let diff = file_diff(&repo, repo_path).map_err(git_error)?;
        render_patch(&diff).map_err(git_error)
    }

    fn diff_summary(&self, git_root: &Path, repo_path: &Path) -> Result<DiffStats> {
        let repo = Repository::open(git_root).map_err(git_error)?;
        let diff = file_diff(&repo, repo_path).map_err(git_error)?;
        let stats = diff.stats().map_err(git_error)?;
        Ok(DiffStats {
            added: stats.insertions(),
            deleted: stats.deletions(),
        })
    }
}

fn git_error(err: git2::Error) -> Error {
    Error::Git(err.message().to_owned())
}

/// Canonical working directory of `repo`.
fn work_root(repo: &Repository) -> std::result::Result<PathBuf, git2::Error> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| git2::Error::from_str("bare repositories have no working tree"))?;
    Ok(workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf()))
}

fn collect_uncommitted(
    repo: &Repository,
    dir: &Path,
    files: &mut Vec<FileEntry>,
    seen: &mut HashSet<PathBuf>,
) -> std::result::Result<(), git2::Error> {
    let git_root = work_root(repo)?;
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut opts))?;
    for entry in statuses.iter() {
        let Some(repo_path) = entry_path(&entry) else {
            continue;
        };
        let abs_path = git_root.join(&repo_path);

        // libgit2 reports a nested repository as one untracked directory.
        if entry.path().is_some_and(|p| p.ends_with('/')) {
            if abs_path.join(".git").exists() {
                collect_nested(&abs_path, dir, files, seen);
            }
            continue;
        }

        let Ok(shown) = abs_path.strip_prefix(dir) else {
            continue;
        };
        let Some(change_code) = change_code(entry.status()) else {
            continue;
        };
        if !seen.insert(shown.to_path_buf()) {
            continue;
        }

        let mod_time = mtime(&abs_path)
            .or_else(|| abs_path.parent().and_then(mtime))
            .unwrap_or(UNIX_EPOCH);
        files.push(FileEntry {
            path: shown.to_path_buf(),
            abs_path: abs_path.clone(),
            repo_path,
            git_root: git_root.clone(),
            origin: Origin::Uncommitted,
            change_code,
            commit_id: None,
            commit_age: None,
            mod_time,
        });
    }
    Ok(())
}

fn collect_nested(root: &Path, dir: &Path, files: &mut Vec<FileEntry>, seen: &mut HashSet<PathBuf>) {
    if !root.starts_with(dir) {
        return;
    }
    let result = Repository::open(root).and_then(|nested| collect_uncommitted(&nested, dir, files, seen));
    if let Err(err) = result {
        warn!(root = %root.display(), %err, "skipping nested repository");
    }
}

/// Files touched by the most recent commits that are not already listed.
fn collect_committed(
    repo: &Repository,
    dir: &Path,
    files: &mut Vec<FileEntry>,
    seen: &mut HashSet<PathBuf>,
) -> std::result::Result<(), git2::Error> {
    let git_root = work_root(repo)?;
    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TIME)?;
    walk.push_head()?;

    let now = SystemTime::now();
    for oid in walk.take(RECENT_COMMITS) {
        let commit = repo.find_commit(oid?)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let seconds = u64::try_from(commit.time().seconds()).unwrap_or(0);
        let when = UNIX_EPOCH + Duration::from_secs(seconds);
        let short_id: String = commit.id().to_string().chars().take(SHORT_ID_LEN).collect();

        for delta in diff.deltas() {
            if delta.status() == Delta::Deleted {
                continue;
            }
            let Some(repo_path) = delta.new_file().path() else {
                continue;
            };
            let abs_path = git_root.join(repo_path);
            let Ok(shown) = abs_path.strip_prefix(dir) else {
                continue;
            };
            if !seen.insert(shown.to_path_buf()) {
                continue;
            }
            files.push(FileEntry {
                path: shown.to_path_buf(),
                abs_path: abs_path.clone(),
                repo_path: repo_path.to_path_buf(),
                git_root: git_root.clone(),
                origin: Origin::Committed,
                change_code: String::new(),
                commit_id: Some(short_id.clone()),
                commit_age: Some(now.duration_since(when).unwrap_or_default()),
                mod_time: when,
            });
        }
    }
    Ok(())
}

/// Current path of a status entry; renames report their new name.
fn entry_path(entry: &StatusEntry<'_>) -> Option<PathBuf> {
    let from_delta = |delta: Option<git2::DiffDelta<'_>>| {
        delta.and_then(|d| d.new_file().path().map(Path::to_path_buf))
    };
    from_delta(entry.index_to_workdir())
        .or_else(|| from_delta(entry.head_to_index()))
        .or_else(|| entry.path().map(PathBuf::from))
}

/// Two-column porcelain-style code: index column then worktree column.
fn change_code(status: Status) -> Option<String> {
    if status.is_ignored() || status == Status::CURRENT {
        return None;
    }
    if status.is_conflicted() {
        return Some("UU".to_owned());
    }
    if status.is_wt_new() {
        return Some("??".to_owned());
    }
    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };
    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };
    Some(format!("{index}{worktree}"))
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Zero-context diff of one path: HEAD tree against the working tree with
/// the index, untracked content included.
fn file_diff<'r>(repo: &'r Repository, repo_path: &Path) -> std::result::Result<Diff<'r>, git2::Error> {
    let head_tree = repo.head().ok().and_then(|head| head.peel_to_tree().ok());
    let mut opts = DiffOptions::new();
    opts.context_lines(0)
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true)
        .disable_pathspec_match(true)
        .pathspec(repo_path);
    repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))
}

/// Patch text as `git diff -U0` would print it.
fn render_patch(diff: &Diff<'_>) -> std::result::Result<String, git2::Error> {
    let mut out = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' | '-' | ' ' => out.push(line.origin()),
            // End-of-file newline markers carry no line of their own.
            '=' | '>' | '<' => return true,
            _ => {}
        }
        out.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(out)
}
