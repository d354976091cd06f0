//! File list renderer: header row plus the visible window of entries.
//!
//! Each entry shows a change icon and its path; committed entries also show
//! how long ago they were committed. Hidden entries above or below the
//! window are signalled with a `...` row.

use std::time::Duration;

use perch_core::registry::FileRegistry;
use perch_core::types::{ChangeKind, FileEntry};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Theme;
use crate::ui::layout::{pad_line, truncate_path};

/// Renders the header row into `header` and the entries into `list`.
pub fn render_file_list(
    frame: &mut Frame,
    header: Rect,
    list: Rect,
    registry: &FileRegistry,
    loaded: bool,
    dir: &str,
    theme: &Theme,
) {
    let muted = Style::default().fg(theme.muted);
    let left = vec![
        Span::styled("✧ ", Style::default().fg(theme.title)),
        Span::styled("LATEST PROGRESS", muted),
        Span::styled("  ↑↓", muted),
    ];
    let right = vec![Span::styled(format!("perched on {} ", truncate_path(dir, 2)), muted)];
    frame.render_widget(Paragraph::new(pad_line(left, right, header.width)), header);

    let lines = if registry.is_empty() {
        let msg = if loaded { "  no changes yet" } else { "  loading..." };
        vec![Line::styled(msg, muted)]
    } else {
        entry_lines(registry, list.width, theme)
    };
    frame.render_widget(Paragraph::new(lines), list);
}

fn entry_lines(registry: &FileRegistry, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let muted = Style::default().fg(theme.muted);
    let window = registry.window();
    let max_path = usize::from(width).saturating_sub(8).max(10);
    let selected = registry.selected_index();

    let mut lines = Vec::with_capacity(window.rows());
    if window.more_above {
        lines.push(Line::styled("  ...", muted));
    }
    for (index, entry) in registry.files()[window.start..window.end].iter().enumerate() {
        lines.push(entry_line(entry, window.start + index == selected, max_path, width, theme));
    }
    if window.more_below {
        lines.push(Line::styled("  ...", muted));
    }
    lines
}

fn entry_line(entry: &FileEntry, selected: bool, max_path: usize, width: u16, theme: &Theme) -> Line<'static> {
    let kind = entry.change_kind();
    let icon_color = match kind {
        ChangeKind::New => theme.file_new,
        ChangeKind::Modified | ChangeKind::Renamed => theme.file_modified,
        ChangeKind::Deleted => theme.file_deleted,
        ChangeKind::Committed => theme.file_committed,
    };
    let path = shorten(&entry.path.to_string_lossy(), max_path);

    let (marker, path_style, icon_style) = if selected {
        let style = Style::default()
            .fg(theme.selected_fg)
            .bg(theme.selected_bg)
            .add_modifier(Modifier::BOLD);
        ("› ", style, style.fg(icon_color))
    } else {
        ("  ", Style::default(), Style::default().fg(icon_color))
    };

    let left = vec![
        Span::styled(marker, path_style),
        Span::styled(icon(kind), icon_style),
        Span::styled(path, path_style),
    ];
    let right = match entry.commit_age {
        Some(age) => vec![Span::styled(format!("{} ", format_age(age)), Style::default().fg(theme.muted))],
        None => Vec::new(),
    };
    pad_line(left, right, width)
}

/// Two-column icon: new, committed, or anything else changed.
pub fn icon(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::New => "✦ ",
        ChangeKind::Committed => "✓ ",
        ChangeKind::Modified | ChangeKind::Deleted | ChangeKind::Renamed => "- ",
    }
}

/// Keeps the tail of `path` within `max` characters.
fn shorten(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count <= max {
        return path.to_owned();
    }
    let tail: String = path.chars().skip(count - max + 3).collect();
    format!("...{tail}")
}

/// Compact age: `45s`, `5m`, `3h`, `2d`.
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..60 => format!("{secs}s"),
        60..3_600 => format!("{}m", secs / 60),
        3_600..86_400 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}
