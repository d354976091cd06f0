//! Dashboard rendering.
//!
//! [`render`] is the single entry point, called once per `AppEvent::Render`
//! inside `terminal.draw()`. Layout arithmetic lives in `layout.rs`; each
//! region has its own renderer module.

pub mod file_list;
pub mod help;
pub mod keybindings;
pub mod layout;
pub mod preview;

use perch_core::update::Model;
use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Theme;
use layout::{compute_layout, divider, pad_line};

/// Renders one complete frame.
///
/// Takes the model mutably only so the preview can fill its wrap cache for
/// the current width.
pub fn render(frame: &mut Frame, model: &mut Model, theme: &Theme, dir: &str) {
    let layout = compute_layout(frame.area(), model.registry.list_height());

    file_list::render_file_list(
        frame,
        layout.header,
        layout.list,
        &model.registry,
        model.files_loaded,
        dir,
        theme,
    );
    frame.render_widget(Paragraph::new(divider(layout.top_divider.width, theme)), layout.top_divider);
    preview::render_preview_header(frame, layout.preview_header, model, theme);
    frame.render_widget(
        Paragraph::new(divider(layout.bottom_divider.width, theme)),
        layout.bottom_divider,
    );
    preview::render_preview(frame, layout.preview, model, theme);
    frame.render_widget(Paragraph::new(footer(model, layout.footer.width, theme)), layout.footer);

    if model.show_help {
        help::render_help_overlay(frame, theme);
    }
}

/// Key hints on the left, scroll position on the right.
fn footer(model: &mut Model, width: u16, theme: &Theme) -> Line<'static> {
    let muted = Style::default().fg(theme.muted);
    let left = vec![Span::styled("  ↑↓ file  j k scroll  +/- list  ? help  q quit", muted)];
    let total = model.preview_view().len();
    let right = if total > model.viewport.height {
        let bottom = (model.viewport.offset + model.viewport.height).min(total);
        vec![Span::styled(format!("{bottom}/{total} "), muted)]
    } else {
        Vec::new()
    };
    pad_line(left, right, width)
}
