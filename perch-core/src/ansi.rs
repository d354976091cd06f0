//! Width-aware handling of ANSI-coloured text.
//!
//! Measures, slices, and recolours strings that carry CSI escape sequences.
//! Escape sequences never count towards display width. Only SGR sequences
//! (those ending in `m`) take part in open-style tracking.

use std::borrow::Cow;
use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Display columns a tab occupies.
pub const TAB_WIDTH: usize = 4;

/// SGR reset.
pub const RESET: &str = "\x1b[0m";

/// A lexical unit of ANSI-bearing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Escape(&'a str),
    Char(char),
}

/// Splits a string into escape sequences and single characters.
struct Tokens<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<Token<'a>> {
        Tokens { s: self.s, pos: self.pos }.next()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.s.get(self.pos..)?;
        if rest.is_empty() {
            return None;
        }
        if let Some(len) = escape_len(rest) {
            self.pos += len;
            return Some(Token::Escape(&rest[..len]));
        }
        let c = rest.chars().next()?;
        self.pos += c.len_utf8();
        Some(Token::Char(c))
    }
}

/// Length of the CSI sequence at the start of `s`, if there is one.
///
/// An unterminated sequence runs to the end of the string.
fn escape_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != 0x1b || bytes[1] != b'[' {
        return None;
    }
    let end = bytes[2..]
        .iter()
        .position(|b| (0x40..=0x7e).contains(b))
        .map_or(bytes.len(), |i| i + 3);
    Some(end)
}

/// SGR parameters of `seq`, or `None` when it is not an SGR sequence.
fn sgr_params(seq: &str) -> Option<&str> {
    seq.strip_prefix("\x1b[")?.strip_suffix('m')
}

fn is_full_reset(params: &str) -> bool {
    params.is_empty() || params.bytes().all(|b| b == b'0')
}

/// Display width of a single character. Tabs count as [`TAB_WIDTH`].
pub fn char_width(c: char) -> usize {
    if c == '\t' {
        TAB_WIDTH
    } else {
        c.width().unwrap_or(0)
    }
}

/// Replaces each tab with [`TAB_WIDTH`] spaces. Terminals drop a raw tab
/// in a cell, so rows must never reach the screen with one.
pub fn expand_tabs(s: &str) -> Cow<'_, str> {
    if s.contains('\t') {
        Cow::Owned(s.replace('\t', &" ".repeat(TAB_WIDTH)))
    } else {
        Cow::Borrowed(s)
    }
}

/// Display columns of `s`, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    Tokens::new(s)
        .map(|t| match t {
            Token::Escape(_) => 0,
            Token::Char(c) => char_width(c),
        })
        .sum()
}

/// `s` with every escape sequence removed.
pub fn strip_ansi(s: &str) -> String {
    Tokens::new(s)
        .filter_map(|t| match t {
            Token::Escape(_) => None,
            Token::Char(c) => Some(c),
        })
        .collect()
}

/// SGR sequences in effect at some point of a string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct OpenStyle(String);

impl OpenStyle {
    fn apply(&mut self, seq: &str) {
        let Some(params) = sgr_params(seq) else {
            return;
        };
        if is_full_reset(params) {
            self.0.clear();
            return;
        }
        if params.starts_with("0;") {
            self.0.clear();
        }
        self.0.push_str(seq);
    }

    fn is_open(&self) -> bool {
        !self.0.is_empty()
    }
}

/// Result of [`slice_to_width`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<'a> {
    /// The leading part, closed with a reset if it left styles open.
    pub content: String,
    /// Unconsumed input. Empty when the whole string fit.
    pub remainder: &'a str,
    /// SGR sequences open at the cut point; prefix them to `remainder` to
    /// continue with the same style.
    pub carry: String,
}

/// Takes as much of `s` as fits in `max_width` columns.
///
/// Escape sequences are copied verbatim. Sequences directly after the last
/// fitting character stay with the leading part, so `remainder` is either
/// empty or starts with a visible character. A character wider than
/// `max_width` is still taken on its own so callers always make progress.
pub fn slice_to_width(s: &str, max_width: usize) -> Slice<'_> {
    let mut content = String::with_capacity(s.len().min(max_width * 4));
    let mut style = OpenStyle::default();
    let mut width = 0;
    let mut tokens = Tokens::new(s);
    let mut cut = s.len();

    while let Some(token) = tokens.peek() {
        match token {
            Token::Escape(seq) => {
                content.push_str(seq);
                style.apply(seq);
            }
            Token::Char(c) => {
                let w = char_width(c);
                let full = width >= max_width;
                if (full && w > 0) || (width > 0 && width + w > max_width) {
                    cut = tokens.offset();
                    break;
                }
                content.push(c);
                width += w;
            }
        }
        tokens.next();
    }

    if style.is_open() {
        content.push_str(RESET);
    }

    Slice {
        content,
        remainder: &s[cut..],
        carry: style.0,
    }
}

/// Prefixes `bg_code` and re-applies it after every reset inside `s`.
///
/// Keeps a background colour alive across the resets a syntax highlighter
/// emits. Callers still pad and reset at the end of the row.
pub fn inject_background(s: &str, bg_code: &str) -> String {
    if bg_code.is_empty() {
        return s.to_owned();
    }
    let mut out = String::with_capacity(s.len() + bg_code.len() * 4);
    out.push_str(bg_code);
    for token in Tokens::new(s) {
        match token {
            Token::Escape(seq) => {
                out.push_str(seq);
                let resets = sgr_params(seq)
                    .is_some_and(|p| is_full_reset(p) || p.starts_with("0;"));
                if resets {
                    out.push_str(bg_code);
                }
            }
            Token::Char(c) => out.push(c),
        }
    }
    out
}

/// Paints the visible characters in `ranges` with `style` alone.
///
/// `ranges` are char indices into `strip_ansi(s)`, sorted and disjoint.
/// Escapes inside a range are dropped; after a range the styles that were
/// open at that point are restored.
pub fn restyle_ranges(s: &str, ranges: &[Range<usize>], style: &str) -> String {
    let mut out = String::with_capacity(s.len() + ranges.len() * 16);
    let mut open = OpenStyle::default();
    let mut pending = ranges.iter().peekable();
    let mut index = 0;
    let mut inside = false;

    for token in Tokens::new(s) {
        match token {
            Token::Escape(seq) => {
                open.apply(seq);
                if !inside {
                    out.push_str(seq);
                }
            }
            Token::Char(c) => {
                while pending.peek().is_some_and(|r| r.end <= index) {
                    pending.next();
                }
                let in_range = pending.peek().is_some_and(|r| r.contains(&index));
                if in_range && !inside {
                    out.push_str(RESET);
                    out.push_str(style);
                } else if !in_range && inside {
                    out.push_str(RESET);
                    out.push_str(&open.0);
                }
                inside = in_range;
                out.push(c);
                index += 1;
            }
        }
    }
    if inside {
        out.push_str(RESET);
    }
    out
}
