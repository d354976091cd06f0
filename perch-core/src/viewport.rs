//! Scroll position of the preview pane, counted in wrapped rows.

use std::ops::Range;

use crate::types::{DiffLineMap, VisualLine};

/// Rows of context shown above the first change when jumping to it.
pub const CHANGE_CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub offset: usize,
    pub height: usize,
    /// Width the preview is wrapped at.
    pub width: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { offset: 0, width, height }
    }

    pub fn max_offset(&self, total: usize) -> usize {
        total.saturating_sub(self.height)
    }

    pub fn clamp(&mut self, total: usize) {
        self.offset = self.offset.min(self.max_offset(total));
    }

    pub fn line_down(&mut self, n: usize, total: usize) {
        self.offset = self.offset.saturating_add(n).min(self.max_offset(total));
    }

    pub fn line_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self, total: usize) {
        self.offset = self.max_offset(total);
    }

    fn half_page(&self) -> usize {
        (self.height / 2).max(1)
    }

    pub fn half_page_down(&mut self, total: usize) {
        self.line_down(self.half_page(), total);
    }

    pub fn half_page_up(&mut self) {
        self.line_up(self.half_page());
    }

    /// Resizes the pane. The offset is only clamped, never reset.
    pub fn resize(&mut self, width: usize, height: usize, total: usize) {
        self.width = width;
        self.height = height;
        self.clamp(total);
    }

    /// Scrolls so `row` appears with [`CHANGE_CONTEXT`] rows above it; rows
    /// already near the top leave the view at the top.
    pub fn reveal_with_context(&mut self, row: usize, total: usize) {
        self.offset = row.saturating_sub(CHANGE_CONTEXT).min(self.max_offset(total));
    }

    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        start..(start + self.height).min(total)
    }
}

/// Row index of the first segment of the first changed line.
pub fn first_change_row(rows: &[VisualLine], diff: &DiffLineMap) -> Option<usize> {
    let line = diff.first_changed_line()?;
    rows.iter()
        .position(|r| r.logical_index + 1 >= line && r.segment_index == 0)
}
