//! Vertical layout of the dashboard.
//!
//! Pure layout arithmetic, recomputed on every render from the live frame
//! area and the user-adjustable list height:
//!
//! ```text
//! header          1 row
//! file list       list_height rows
//! divider         1 row
//! preview header  1 row
//! divider         1 row
//! preview         remaining rows
//! footer          1 row
//! ```
//!
//! The five fixed rows match `perch_core::update::CHROME_ROWS`, so the
//! preview area here and `Model::preview_height` always agree.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Rects for one frame. Valid only inside the current draw closure.
#[derive(Debug, Clone, Copy)]
pub struct DashboardLayout {
    pub header: Rect,
    pub list: Rect,
    pub top_divider: Rect,
    pub preview_header: Rect,
    pub bottom_divider: Rect,
    pub preview: Rect,
    pub footer: Rect,
}

pub fn compute_layout(area: Rect, list_height: usize) -> DashboardLayout {
    let list_height = u16::try_from(list_height).unwrap_or(u16::MAX);
    let [header, list, top_divider, preview_header, bottom_divider, preview, footer] =
        area.layout(&Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(list_height),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ]));
    DashboardLayout {
        header,
        list,
        top_divider,
        preview_header,
        bottom_divider,
        preview,
        footer,
    }
}

/// A full-width horizontal rule.
pub fn divider(width: u16, theme: &Theme) -> Line<'static> {
    Line::styled("─".repeat(usize::from(width)), Style::default().fg(theme.divider))
}

/// Puts `left` and `right` at opposite ends of a `width`-column line with
/// at least one space between them.
pub fn pad_line<'a>(mut left: Vec<Span<'a>>, right: Vec<Span<'a>>, width: u16) -> Line<'a> {
    let used: usize = left.iter().chain(&right).map(|s| s.content.width()).sum();
    let gap = usize::from(width).saturating_sub(used).max(1);
    left.push(Span::raw(" ".repeat(gap)));
    left.extend(right);
    Line::from(left)
}

/// Last `n` components of `path`, prefixed with `.../` when shortened.
pub fn truncate_path(path: &str, n: usize) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() <= n {
        return path.to_owned();
    }
    format!(".../{}", parts[parts.len() - n..].join("/"))
}
