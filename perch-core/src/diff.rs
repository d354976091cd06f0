//! Unified-diff line classifier.
//!
//! Turns the zero-context unified diff of a single file into a
//! [`DiffLineMap`] keyed by new-file line numbers plus add/delete counts.
//! Malformed input degrades to an empty map; the caller never sees an error.

use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{DiffLineMap, DiffStats, DiffStatus};

/// Parsed `@@ -old_start[,old_count] +new_start[,new_count] @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
}

/// Parses a hunk header line. Counts default to 1 when omitted.
pub fn parse_hunk_header(line: &str) -> Result<HunkHeader> {
    let malformed = || Error::MalformedHunk(line.to_owned());
    let rest = line.strip_prefix("@@ ").ok_or_else(malformed)?;
    let mut parts = rest.split_whitespace();
    let old = parts.next().and_then(|p| p.strip_prefix('-')).ok_or_else(malformed)?;
    let new = parts.next().and_then(|p| p.strip_prefix('+')).ok_or_else(malformed)?;
    if parts.next() != Some("@@") {
        return Err(malformed());
    }
    let (old_start, old_count) = parse_range(old).ok_or_else(malformed)?;
    let (new_start, new_count) = parse_range(new).ok_or_else(malformed)?;
    Ok(HunkHeader { old_start, old_count, new_start, new_count })
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Classifies every line of `diff`, degrading to an empty result on bad input.
pub fn classify(diff: &str) -> (DiffLineMap, DiffStats) {
    match try_classify(diff) {
        Ok(result) => result,
        Err(err) => {
            warn!(%err, "unparseable diff, showing file without markers");
            (DiffLineMap::new(), DiffStats::default())
        }
    }
}

/// Strict variant of [`classify`] that reports the first malformed header.
pub fn try_classify(diff: &str) -> Result<(DiffLineMap, DiffStats)> {
    let mut map = DiffLineMap::new();
    let mut stats = DiffStats::default();
    let mut hunk: Option<HunkCursor> = None;

    for line in diff.lines() {
        if line.starts_with("@@") {
            let header = parse_hunk_header(line)?;
            hunk = Some(HunkCursor::new(header));
            continue;
        }
        if line.starts_with("diff ") {
            hunk = None;
            continue;
        }
        let Some(cursor) = hunk.as_mut() else {
            continue;
        };
        if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }
        if let Some(rest) = line.strip_prefix('+') {
            if rest.starts_with("++") && cursor.new_remaining == 0 {
                hunk = None;
                continue;
            }
            cursor.new_remaining = cursor.new_remaining.saturating_sub(1);
            cursor.line += 1;
            map.insert(cursor.line, DiffStatus::Added);
            stats.added += 1;
        } else if let Some(rest) = line.strip_prefix('-') {
            if rest.starts_with("--") && cursor.old_remaining == 0 {
                hunk = None;
                continue;
            }
            cursor.old_remaining = cursor.old_remaining.saturating_sub(1);
            map.insert(cursor.line.max(1), DiffStatus::Deleted);
            stats.deleted += 1;
        } else {
            cursor.old_remaining = cursor.old_remaining.saturating_sub(1);
            cursor.new_remaining = cursor.new_remaining.saturating_sub(1);
            cursor.line += 1;
        }
    }

    Ok((map, stats))
}

/// Running position inside one hunk.
struct HunkCursor {
    /// Last new-file line consumed; the next added line is `line + 1`.
    line: usize,
    old_remaining: usize,
    new_remaining: usize,
}

impl HunkCursor {
    fn new(header: HunkHeader) -> Self {
        Self {
            line: header.new_start.saturating_sub(1),
            old_remaining: header.old_count,
            new_remaining: header.new_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_without_counts_defaults_to_one() {
        let h = parse_hunk_header("@@ -7 +9 @@ fn main()").unwrap();
        assert_eq!(h, HunkHeader { old_start: 7, old_count: 1, new_start: 9, new_count: 1 });
    }

    #[test]
    fn header_rejects_garbage() {
        assert!(parse_hunk_header("@@ nonsense @@").is_err());
        assert!(parse_hunk_header("@@ -1,2 +x,3 @@").is_err());
        assert!(parse_hunk_header("@@ -1,2 +3,4").is_err());
    }
}
