//! Ordered file list, selection, and the visible list window.
//!
//! The registry is the only owner of the file list and of
//! [`SelectionState`]. Refreshes replace the list wholesale and carry the
//! selection over by path, except when the user is "following" the newest
//! file at the top.

use std::path::{Path, PathBuf};

use crate::types::FileEntry;

/// Rows kept visible above the selection when moving up.
const TOP_BUFFER: usize = 1;
/// Rows kept visible below the selection when moving down.
const BOTTOM_BUFFER: usize = 2;

/// Fewest rows the list may have: one entry plus both indicators.
pub const MIN_LIST_HEIGHT: usize = 3;

/// Selection and scroll bookkeeping for the file list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Always within `0..len` while the list is non-empty, 0 otherwise.
    pub selected_index: usize,
    /// First file shown in the list window.
    pub list_scroll_offset: usize,
    /// Path whose preview is currently shown, if any.
    pub last_loaded_path: Option<PathBuf>,
}

/// Contiguous slice of the list to draw, plus continuation markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListWindow {
    pub start: usize,
    pub end: usize,
    /// Draw a "more above" row before the slice.
    pub more_above: bool,
    /// Draw a "more below" row after the slice.
    pub more_below: bool,
}

impl ListWindow {
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Rows used including the indicator rows.
    pub fn rows(&self) -> usize {
        self.len() + usize::from(self.more_above) + usize::from(self.more_below)
    }
}

/// What a refresh did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// The same path is selected as before the refresh.
    pub same_file: bool,
}

#[derive(Debug, Clone)]
pub struct FileRegistry {
    files: Vec<FileEntry>,
    selection: SelectionState,
    /// Rows available for entries and indicators.
    list_height: usize,
}

impl FileRegistry {
    /// Heights below [`MIN_LIST_HEIGHT`] are raised to it.
    pub fn new(list_height: usize) -> Self {
        Self {
            files: Vec::new(),
            selection: SelectionState::default(),
            list_height: list_height.max(MIN_LIST_HEIGHT),
        }
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selected_index(&self) -> usize {
        self.selection.selected_index
    }

    pub fn selected(&self) -> Option<&FileEntry> {
        self.files.get(self.selection.selected_index)
    }

    pub fn list_height(&self) -> usize {
        self.list_height
    }

    /// Replaces the list, carrying the selection over.
    ///
    /// A selection at index 0 stays at 0 (follow newest). Otherwise the
    /// previously selected path is searched for and index 0 is the fallback.
    pub fn apply_refresh(&mut self, files: Vec<FileEntry>) -> RefreshOutcome {
        let old_index = self.selection.selected_index;
        let previous = self.selected().map(|f| f.path.clone());
        self.files = files;

        if self.files.is_empty() {
            self.selection.selected_index = 0;
            self.selection.list_scroll_offset = 0;
            self.selection.last_loaded_path = None;
            return RefreshOutcome { same_file: false };
        }

        let index = if old_index == 0 {
            0
        } else {
            previous
                .as_deref()
                .and_then(|p| self.position(p))
                .unwrap_or(0)
        };
        self.selection.selected_index = index.min(self.files.len() - 1);

        if self.selection.selected_index == old_index {
            self.keep_selection_visible();
        } else {
            self.center_selection();
        }

        RefreshOutcome {
            same_file: previous.as_deref() == self.selected().map(|f| f.path.as_path()),
        }
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.files.iter().position(|f| f.path == path)
    }

    /// Moves the selection up one entry. Returns whether it moved.
    pub fn select_prev(&mut self) -> bool {
        if self.selection.selected_index == 0 {
            return false;
        }
        self.selection.selected_index -= 1;
        let sel = self.selection.selected_index;
        if sel < self.selection.list_scroll_offset + TOP_BUFFER {
            self.selection.list_scroll_offset = sel.saturating_sub(TOP_BUFFER);
        }
        self.keep_selection_visible();
        true
    }

    /// Moves the selection down one entry. Returns whether it moved.
    pub fn select_next(&mut self) -> bool {
        if self.selection.selected_index + 1 >= self.files.len() {
            return false;
        }
        self.selection.selected_index += 1;
        let sel = self.selection.selected_index;
        let capacity = self.list_height.saturating_sub(2).max(1);
        let buffer = if capacity <= BOTTOM_BUFFER { 0 } else { BOTTOM_BUFFER };
        if sel >= self.selection.list_scroll_offset + capacity - buffer {
            self.selection.list_scroll_offset = (sel + buffer + 1).saturating_sub(capacity);
        }
        self.keep_selection_visible();
        true
    }

    /// Changes the rows available to the list, never below
    /// [`MIN_LIST_HEIGHT`]. Selection is untouched.
    pub fn set_list_height(&mut self, list_height: usize) {
        self.list_height = list_height.max(MIN_LIST_HEIGHT);
        self.keep_selection_visible();
    }

    /// Slice to draw for the current scroll offset.
    pub fn window(&self) -> ListWindow {
        self.window_at(self.selection.list_scroll_offset)
    }

    pub fn last_loaded_path(&self) -> Option<&Path> {
        self.selection.last_loaded_path.as_deref()
    }

    pub fn mark_loaded(&mut self, path: PathBuf) {
        self.selection.last_loaded_path = Some(path);
    }

    /// Forgets which file is loaded so the next request rebuilds it.
    pub fn clear_loaded(&mut self) {
        self.selection.last_loaded_path = None;
    }

    fn window_at(&self, scroll: usize) -> ListWindow {
        let n = self.files.len();
        if n == 0 {
            return ListWindow::default();
        }
        let start = scroll.min(n - 1);
        let mut slots = self.list_height;
        let more_above = start > 0;
        if more_above {
            slots = slots.saturating_sub(1);
        }
        let more_below = start + slots < n;
        if more_below {
            slots = slots.saturating_sub(1);
        }
        let end = (start + slots.max(1)).min(n);
        ListWindow { start, end, more_above, more_below }
    }

    /// Nudges the scroll offset until the selection is inside the window.
    fn keep_selection_visible(&mut self) {
        let n = self.files.len();
        if n == 0 {
            self.selection.list_scroll_offset = 0;
            return;
        }
        let sel = self.selection.selected_index;
        let mut scroll = self.selection.list_scroll_offset.min(n - 1);
        for _ in 0..=n {
            let window = self.window_at(scroll);
            if sel < window.start {
                scroll = sel;
            } else if sel >= window.end {
                scroll += sel + 1 - window.end;
            } else {
                break;
            }
        }
        self.selection.list_scroll_offset = scroll;
    }

    /// Scrolls so the selection sits in the middle of the window, without
    /// leaving empty rows at the bottom.
    fn center_selection(&mut self) {
        let sel = self.selection.selected_index;
        let n = self.files.len();
        let mut scroll = sel.saturating_sub(self.list_height / 2);
        while scroll > 0 {
            let wider = self.window_at(scroll - 1);
            if wider.end >= n && wider.contains(sel) {
                scroll -= 1;
            } else {
                break;
            }
        }
        self.selection.list_scroll_offset = scroll;
        self.keep_selection_visible();
    }
}
