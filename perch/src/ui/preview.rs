//! Preview pane: a one-row header describing the selected file, and the
//! wrapped, diff-marked rows inside the viewport.

use ansi_to_tui::IntoText;
use perch_core::ansi::strip_ansi;
use perch_core::types::FileEntry;
use perch_core::update::{Model, PreviewView};
use perch_core::wrap::compose_row;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Theme;
use crate::ui::layout::pad_line;

pub fn render_preview_header(frame: &mut Frame, area: Rect, model: &Model, theme: &Theme) {
    let muted = Style::default().fg(theme.muted);
    let Some(entry) = model.registry.selected() else {
        frame.render_widget(Paragraph::new(Line::styled("  no file selected", muted)), area);
        return;
    };

    let mut left = vec![
        Span::raw("  "),
        Span::styled(basename(entry), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", entry.change_kind().label()), muted),
    ];
    if let Some(content) = model.preview_content() {
        let stats = content.diff_stats;
        if stats.added > 0 || stats.deleted > 0 {
            left.push(Span::raw("  "));
            left.push(Span::styled(format!("+{}", stats.added), Style::default().fg(theme.stat_added)));
            left.push(Span::raw(" "));
            left.push(Span::styled(format!("-{}", stats.deleted), Style::default().fg(theme.stat_deleted)));
        }
    }
    let right = vec![Span::styled("j k scroll ", muted)];
    frame.render_widget(Paragraph::new(pad_line(left, right, area.width)), area);
}

pub fn render_preview(frame: &mut Frame, area: Rect, model: &mut Model, theme: &Theme) {
    let view = model.preview_view();
    let range = model.viewport.visible_range(view.len());
    let text = match view {
        PreviewView::Empty => Text::default(),
        PreviewView::Message(rows) => Text::from(
            rows[range]
                .iter()
                .map(|row| Line::styled(row.clone(), Style::default().fg(theme.muted)))
                .collect::<Vec<_>>(),
        ),
        PreviewView::Rows(rows) => {
            let style = theme.row_style();
            let joined = rows[range]
                .iter()
                .map(|line| compose_row(line, model.width, &style))
                .collect::<Vec<_>>()
                .join("\n");
            ansi_text(joined)
        }
    };
    frame.render_widget(Paragraph::new(text), area);
}

/// Parses SGR escapes into styled spans; on malformed input the rows are
/// shown without styling rather than dropped.
fn ansi_text(joined: String) -> Text<'static> {
    match joined.as_bytes().into_text() {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!("ansi parse failed: {err}");
            Text::from(strip_ansi(&joined))
        }
    }
}

fn basename(entry: &FileEntry) -> String {
    entry
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.path.to_string_lossy().into_owned())
}
