//! Syntax highlighting with syntect.
//!
//! Produces one 24-bit ANSI string per source line, each closed with a reset
//! so lines can be wrapped independently. A single `HighlightLines` is used
//! per file so block comments and strings spanning lines colour correctly.

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use perch_core::ansi::{restyle_ranges, strip_ansi, RESET};
use perch_core::preview::split_lines;
use perch_core::source::Highlighter;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use tracing::{debug, warn};

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const SYNTECT_THEME: &str = "base16-ocean.dark";

/// Muted magenta for ERB tags (xterm 139).
const ERB_TAG_STYLE: &str = "\x1b[38;5;139m";

/// `Highlighter` backed by syntect's bundled syntaxes and themes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    /// Forces the lazy syntax and theme sets to load.
    pub fn warm_up() {
        let _ = &*PS;
        let _ = &*TS;
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, content: &str, path: &Path) -> Vec<String> {
        let erb = is_erb(path);
        let Some(syntax) = find_syntax(path, content) else {
            return split_lines(content);
        };
        let theme = TS.themes.get(SYNTECT_THEME).or_else(|| TS.themes.values().next());
        let Some(theme) = theme else {
            return split_lines(content);
        };

        match highlight_lines(content, syntax, theme) {
            Ok(lines) if erb => lines.iter().map(|l| style_erb_tags(l)).collect(),
            Ok(lines) => lines,
            Err(err) => {
                warn!(path = %path.display(), %err, "highlighting failed, showing plain text");
                split_lines(content)
            }
        }
    }
}

fn highlight_lines(
    content: &str,
    syntax: &SyntaxReference,
    theme: &SyntectTheme,
) -> Result<Vec<String>, syntect::Error> {
    let mut h = HighlightLines::new(syntax, theme);
    let mut out = Vec::new();
    for line in LinesWithEndings::from(content) {
        let ranges = h.highlight_line(line, &PS)?;
        let mut escaped = as_24_bit_terminal_escaped(&ranges, false);
        let trimmed = escaped.trim_end_matches(['\n', '\r']).len();
        escaped.truncate(trimmed);
        escaped.push_str(RESET);
        out.push(escaped);
    }
    Ok(out)
}

fn is_erb(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("erb"))
}

/// Syntax for `path`. ERB templates use their inner extension
/// (`show.html.erb` is HTML); unknown extensions try the first line.
fn find_syntax(path: &Path, content: &str) -> Option<&'static SyntaxReference> {
    let target = if is_erb(path) { path.file_stem().map(Path::new) } else { Some(path) };
    let ext = target
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_owned)
        .or_else(|| is_erb(path).then(|| "html".to_owned()));

    let by_ext = ext.as_deref().and_then(|e| PS.find_syntax_by_extension(e));
    let syntax = by_ext.or_else(|| {
        let first = content.lines().next().unwrap_or_default();
        PS.find_syntax_by_first_line(first)
    });
    if syntax.is_none() {
        debug!(path = %path.display(), "no syntax, plain text");
    }
    syntax
}

/// Recolours every `<% ... %>` tag in an already highlighted line.
fn style_erb_tags(line: &str) -> String {
    let ranges = erb_tag_ranges(&strip_ansi(line));
    if ranges.is_empty() {
        return line.to_owned();
    }
    restyle_ranges(line, &ranges, ERB_TAG_STYLE)
}

/// Char ranges of complete `<% ... %>` tags in plain text.
fn erb_tag_ranges(plain: &str) -> Vec<Range<usize>> {
    let chars: Vec<char> = plain.chars().collect();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i + 1 < chars.len() {
        if chars[i] != '<' || chars[i + 1] != '%' {
            i += 1;
            continue;
        }
        let close = (i + 2..chars.len().saturating_sub(1))
            .find(|&j| chars[j] == '%' && chars[j + 1] == '>');
        match close {
            Some(j) => {
                ranges.push(i..j + 2);
                i = j + 2;
            }
            None => break,
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_matches_split_lines() {
        let samples = [
            ("main.rs", "fn main() {\n    /* multi\n line */\n}\n"),
            ("a.py", "x = 1\r\ny = 2"),
            ("empty.rs", ""),
            ("blank.rs", "\n\n\n"),
        ];
        for (name, text) in samples {
            let lines = SyntectHighlighter.highlight(text, Path::new(name));
            assert_eq!(lines.len(), split_lines(text).len(), "{name}");
        }
    }

    #[test]
    fn lines_are_closed_and_keep_their_text() {
        let text = "let x = \"hi\";\nlet y = 2;\n";
        let lines = SyntectHighlighter.highlight(text, Path::new("x.rs"));
        for (line, raw) in lines.iter().zip(split_lines(text)) {
            assert!(line.ends_with(RESET));
            assert_eq!(strip_ansi(line), raw);
        }
        assert!(lines[0].contains("\x1b[38;2;"));
    }

    #[test]
    fn unknown_types_come_back_plain() {
        let text = "just some words\nmore words\n";
        let lines = SyntectHighlighter.highlight(text, Path::new("notes.zzz"));
        assert_eq!(lines, vec!["just some words", "more words"]);
    }

    #[test]
    fn erb_tags_are_restyled() {
        let text = "<p><%= @user.name %></p>\n";
        let lines = SyntectHighlighter.highlight(text, Path::new("show.html.erb"));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(&format!("{ERB_TAG_STYLE}<%= @user.name %>{RESET}")));
        assert_eq!(strip_ansi(&lines[0]), "<p><%= @user.name %></p>");
    }

    #[test]
    fn unterminated_erb_tag_is_left_alone() {
        assert_eq!(style_erb_tags("<% open"), "<% open");
        assert_eq!(
            style_erb_tags("a <%# c %> b"),
            format!("a {RESET}{ERB_TAG_STYLE}<%# c %>{RESET} b")
        );
        assert_eq!(erb_tag_ranges("<%a%><%b%>"), vec![0..5, 5..10]);
    }
}
