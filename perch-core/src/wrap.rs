//! Wrapping of highlighted preview lines into terminal rows.
//!
//! One logical line becomes one or more [`VisualLine`]s. Continuations carry
//! the styles that were open at the cut point and a hanging indent that
//! mirrors the raw line's leading whitespace.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ansi::{self, RESET, TAB_WIDTH};
use crate::preview::PreviewContent;
use crate::types::{DiffStatus, VisualLine};

/// Columns in front of the text: a two-column margin plus a two-column marker.
pub const GUTTER_WIDTH: usize = 4;

/// Smallest text width a row is wrapped to. Narrower requests are widened.
pub const MIN_CONTENT_WIDTH: usize = 10;

const CONTINUATION_GUTTER: &str = "  ";

/// Marker shown in front of the first segment of a line.
pub fn gutter_for(status: DiffStatus) -> &'static str {
    match status {
        DiffStatus::Added => "+ ",
        DiffStatus::Deleted => "- ",
        DiffStatus::Unchanged => "· ",
    }
}

/// Leading whitespace of `raw` in columns; tabs count as [`TAB_WIDTH`].
pub fn leading_indent(raw: &str) -> usize {
    raw.chars()
        .map_while(|c| match c {
            ' ' => Some(1),
            '\t' => Some(TAB_WIDTH),
            _ => None,
        })
        .sum()
}

/// Row width actually used for wrapping `max_width`.
pub fn effective_width(max_width: usize) -> usize {
    max_width.max(GUTTER_WIDTH + MIN_CONTENT_WIDTH)
}

/// Splits one highlighted line into rows no wider than `max_width`
/// (gutter included).
///
/// `raw_line` is the unhighlighted source of the same line and only decides
/// the hanging indent, which is capped at half the text width. Tabs are
/// expanded to spaces so the row's measured and drawn widths agree.
pub fn wrap_line(
    highlighted: &str,
    raw_line: &str,
    logical_index: usize,
    max_width: usize,
    status: DiffStatus,
) -> Vec<VisualLine> {
    let content_width = effective_width(max_width) - GUTTER_WIDTH;
    let indent = leading_indent(raw_line).min(content_width / 2);
    let indent_str = " ".repeat(indent);

    let mut rows = Vec::new();
    let mut input = ansi::expand_tabs(highlighted).into_owned();
    let mut segment = 0;

    loop {
        let avail = if segment == 0 { content_width } else { content_width - indent };
        let slice = ansi::slice_to_width(&input, avail);

        let text = if segment == 0 {
            slice.content
        } else {
            format!("{indent_str}{}", slice.content)
        };
        rows.push(VisualLine {
            logical_index,
            segment_index: segment,
            gutter: if segment == 0 { gutter_for(status) } else { CONTINUATION_GUTTER },
            text,
            diff_status: status,
        });

        if slice.remainder.is_empty() {
            break;
        }
        input = format!("{}{}", slice.carry, slice.remainder);
        segment += 1;
    }

    rows
}

/// Wraps every line of `content` at `max_width`.
pub fn wrap_all(content: &PreviewContent, max_width: usize) -> Vec<VisualLine> {
    content
        .highlighted_lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| {
            let raw = content.raw_lines.get(i).map_or("", String::as_str);
            wrap_line(line, raw, i, max_width, content.diff_lines.get(i + 1))
        })
        .collect()
}

/// Wrapped rows of one [`PreviewContent`], keyed by terminal width.
///
/// Cleared only when the content changes; a new width adds an entry.
#[derive(Debug, Default, Clone)]
pub struct WrapCache {
    by_width: HashMap<usize, Arc<[VisualLine]>>,
}

impl WrapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of `content` at `width`, wrapping on first use.
    pub fn get_or_wrap(&mut self, content: &PreviewContent, width: usize) -> Arc<[VisualLine]> {
        self.by_width
            .entry(width)
            .or_insert_with(|| wrap_all(content, width).into())
            .clone()
    }

    pub fn contains(&self, width: usize) -> bool {
        self.by_width.contains_key(&width)
    }

    pub fn len(&self) -> usize {
        self.by_width.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_width.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_width.clear();
    }
}

/// SGR codes used to turn a [`VisualLine`] into a finished terminal row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowStyle<'a> {
    pub added_bg: &'a str,
    pub deleted_bg: &'a str,
    pub added_gutter: &'a str,
    pub deleted_gutter: &'a str,
    pub neutral_gutter: &'a str,
}

/// Renders one row exactly `width` columns wide (or wider only if the text
/// itself overflows): margin, coloured marker, text, background, padding.
pub fn compose_row(line: &VisualLine, width: usize, style: &RowStyle<'_>) -> String {
    let (bg, gutter_fg) = match line.diff_status {
        DiffStatus::Added => (style.added_bg, style.added_gutter),
        DiffStatus::Deleted => (style.deleted_bg, style.deleted_gutter),
        DiffStatus::Unchanged => ("", style.neutral_gutter),
    };

    let gutter = if gutter_fg.is_empty() {
        format!("  {}", line.gutter)
    } else {
        format!("  {gutter_fg}{}{RESET}", line.gutter)
    };
    let pad = width.saturating_sub(GUTTER_WIDTH + ansi::visible_width(&line.text));

    let mut row = String::with_capacity(gutter.len() + line.text.len() + pad + 16);
    if bg.is_empty() {
        row.push_str(&gutter);
        row.push_str(&line.text);
        row.extend(std::iter::repeat_n(' ', pad));
    } else {
        row.push_str(&ansi::inject_background(&gutter, bg));
        row.push_str(&ansi::inject_background(&line.text, bg));
        row.extend(std::iter::repeat_n(' ', pad));
        row.push_str(RESET);
    }
    row
}

/// Centres each line of `message` horizontally in `width` and the block
/// vertically in `height`. Blank rows above the block are included.
pub fn center_message(message: &str, width: usize, height: usize) -> Vec<String> {
    let lines: Vec<&str> = message.split('\n').collect();
    let top = height.saturating_sub(lines.len()) / 2;

    let mut rows = vec![String::new(); top];
    rows.extend(lines.iter().map(|line| {
        let pad = width.saturating_sub(ansi::visible_width(line)) / 2;
        format!("{}{line}", " ".repeat(pad))
    }));
    rows
}
