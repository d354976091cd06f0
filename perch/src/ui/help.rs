//! Help overlay: a centred modal listing the key bindings.
//!
//! Drawn inside the same `terminal.draw()` closure as everything else;
//! `Clear` erases the dashboard beneath the box first.

use ratatui::{
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;

const HELP_WIDTH: u16 = 44;

/// Renders the overlay. Skipped when the terminal is too small to fit it.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme) {
    let text = build_help_text(theme);
    let height = u16::try_from(text.lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let area = frame.area();
    if area.width < HELP_WIDTH || area.height < height {
        return;
    }

    let overlay = area.centered(Constraint::Length(HELP_WIDTH), Constraint::Length(height));
    frame.render_widget(Clear, overlay);

    let block = Block::bordered()
        .title(" keys  ? or Esc to close ")
        .border_style(Style::default().fg(theme.divider));
    frame.render_widget(Paragraph::new(text).block(block), overlay);
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let heading = Style::default().fg(theme.title);
    Text::from(vec![
        Line::styled("Files", heading),
        Line::from("  ↑ / ↓         Previous / next file"),
        Line::from("  + / -         Grow / shrink the list"),
        Line::from(""),
        Line::styled("Preview", heading),
        Line::from("  j / k         Scroll down / up"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  wheel         Scroll three lines"),
        Line::from(""),
        Line::styled("General", heading),
        Line::from("  ?             Toggle this help"),
        Line::from("  q / Ctrl-c    Quit"),
    ])
}
