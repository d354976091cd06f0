//! The event-loop state machine.
//!
//! [`update`] is a pure transition: it takes the previous [`Model`] and one
//! [`Msg`] and returns the next model plus the [`Effect`]s the runtime must
//! perform (timers, background loads, refreshes). Nothing here touches the
//! terminal, the filesystem, or a clock, so every scenario can be replayed
//! in tests by feeding messages by hand.
//!
//! Stale work is never cancelled. A debounce that fires for an old
//! generation, or a preview load for a selection that has moved on, is
//! simply ignored when its message arrives.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::preview::{Preview, PreviewCache, PreviewContent, PreviewLoaded, PreviewRequest};
pub use crate::registry::MIN_LIST_HEIGHT;
use crate::registry::FileRegistry;
use crate::types::{FileEntry, Origin, VisualLine};
use crate::viewport::{first_change_row, Viewport};
use crate::wrap::center_message;

/// Delay between the last selection change and the preview build.
pub const DEBOUNCE: Duration = Duration::from_millis(30);

/// Interval between file-list refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Default rows for file entries and continuation markers.
pub const DEFAULT_LIST_HEIGHT: usize = 7;

/// Rows outside the list and the preview: list header, two dividers,
/// preview header, footer.
pub const CHROME_ROWS: usize = 5;

/// The list never grows past `height - PREVIEW_RESERVE`.
const PREVIEW_RESERVE: usize = 10;

/// User intents, already decoupled from concrete keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectPrev,
    SelectNext,
    ScrollDown(usize),
    ScrollUp(usize),
    ScrollTop,
    ScrollBottom,
    HalfPageDown,
    HalfPageUp,
    GrowList,
    ShrinkList,
    ToggleHelp,
    Quit,
}

/// Inputs to [`update`].
#[derive(Debug, Clone)]
pub enum Msg {
    Action(Action),
    Resize { width: usize, height: usize },
    /// Periodic refresh tick.
    Tick,
    FilesLoaded(Vec<FileEntry>),
    DebounceFired { generation: u64 },
    PreviewLoaded(PreviewLoaded),
}

/// Work requested from the runtime.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Send `DebounceFired { generation }` after `delay`.
    ScheduleDebounce { generation: u64, delay: Duration },
    /// Build a preview off the loop and send `PreviewLoaded`.
    LoadPreview(PreviewRequest),
    /// Fetch the file list and send `FilesLoaded`.
    RefreshFiles,
    Quit,
}

/// A preview build waiting for its debounce to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    generation: u64,
    index: usize,
    keep_scroll: bool,
}

/// What the preview pane should draw this frame.
#[derive(Debug, Clone)]
pub enum PreviewView {
    Empty,
    Message(Vec<String>),
    Rows(Arc<[VisualLine]>),
}

impl PreviewView {
    pub fn len(&self) -> usize {
        match self {
            PreviewView::Empty => 0,
            PreviewView::Message(rows) => rows.len(),
            PreviewView::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Complete UI state.
#[derive(Debug, Clone)]
pub struct Model {
    pub registry: FileRegistry,
    pub viewport: Viewport,
    pub width: usize,
    pub height: usize,
    /// True once the first file list has arrived.
    pub files_loaded: bool,
    pub show_help: bool,
    preview: Option<Preview>,
    /// Path of the file `preview` was built for.
    shown: Option<PathBuf>,
    cache: PreviewCache,
    generation: u64,
    /// Generation of the newest preview sent or applied; older results
    /// are discarded on arrival.
    dispatched: u64,
    pending: Option<Pending>,
}

impl Model {
    pub fn new(width: usize, height: usize) -> Self {
        let mut model = Self {
            registry: FileRegistry::new(DEFAULT_LIST_HEIGHT),
            viewport: Viewport::new(width, 1),
            width,
            height,
            files_loaded: false,
            show_help: false,
            preview: None,
            shown: None,
            cache: PreviewCache::new(),
            generation: 0,
            dispatched: 0,
            pending: None,
        };
        model.relayout();
        model
    }

    /// Initial model plus the first refresh.
    pub fn init(width: usize, height: usize) -> (Self, Vec<Effect>) {
        (Self::new(width, height), vec![Effect::RefreshFiles])
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn preview_content(&self) -> Option<&Arc<PreviewContent>> {
        self.preview.as_ref().map(Preview::content)
    }

    pub fn cache(&self) -> &PreviewCache {
        &self.cache
    }

    /// Generation of the debounce currently awaited, if any.
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.map(|p| p.generation)
    }

    /// Rows available to the preview pane.
    pub fn preview_height(&self) -> usize {
        self.height
            .saturating_sub(self.registry.list_height() + CHROME_ROWS)
            .max(1)
    }

    /// Rows the preview pane shows at the current width.
    pub fn preview_view(&mut self) -> PreviewView {
        let (width, height) = (self.viewport.width, self.viewport.height);
        let Some(preview) = self.preview.as_mut() else {
            return PreviewView::Empty;
        };
        match &preview.content().message {
            Some(message) => PreviewView::Message(center_message(message, width, height)),
            None => PreviewView::Rows(preview.wrapped(width)),
        }
    }

    fn preview_total(&mut self) -> usize {
        self.preview_view().len()
    }

    fn relayout(&mut self) {
        let max_list = self.max_list_height();
        if self.registry.list_height() > max_list {
            self.registry.set_list_height(max_list);
        }
        self.viewport.width = self.width;
        let total = self.preview_total();
        let height = self.preview_height();
        self.viewport.resize(self.width, height, total);
    }

    fn max_list_height(&self) -> usize {
        self.height.saturating_sub(PREVIEW_RESERVE).max(MIN_LIST_HEIGHT)
    }

    /// Starts a debounce for the current selection.
    fn schedule_preview(&mut self, keep_scroll: bool) -> Vec<Effect> {
        self.generation += 1;
        self.pending = Some(Pending {
            generation: self.generation,
            index: self.registry.selected_index(),
            keep_scroll,
        });
        vec![Effect::ScheduleDebounce {
            generation: self.generation,
            delay: DEBOUNCE,
        }]
    }

    fn clear_preview(&mut self) {
        self.preview = None;
        self.shown = None;
        self.pending = None;
        self.registry.clear_loaded();
        self.viewport.goto_top();
    }

    /// Installs `content` as the current preview and positions the view.
    fn apply_content(&mut self, entry: &FileEntry, content: Arc<PreviewContent>, keep_scroll: bool) {
        let jump = entry.origin == Origin::Uncommitted && !content.diff_lines.is_empty();
        let diff = content.diff_lines.clone();
        self.preview = Some(Preview::new(content));
        self.shown = Some(entry.path.clone());
        self.registry.mark_loaded(entry.path.clone());

        let total = self.preview_total();
        if keep_scroll {
            self.viewport.clamp(total);
        } else if jump {
            let row = match self.preview_view() {
                PreviewView::Rows(rows) => first_change_row(&rows, &diff),
                _ => None,
            };
            match row {
                Some(row) => self.viewport.reveal_with_context(row, total),
                None => self.viewport.goto_top(),
            }
        } else {
            self.viewport.goto_top();
        }
    }

    fn on_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SelectPrev => {
                if self.registry.select_prev() {
                    return self.schedule_preview(false);
                }
            }
            Action::SelectNext => {
                if self.registry.select_next() {
                    return self.schedule_preview(false);
                }
            }
            Action::ScrollDown(n) => {
                let total = self.preview_total();
                self.viewport.line_down(n, total);
            }
            Action::ScrollUp(n) => self.viewport.line_up(n),
            Action::ScrollTop => self.viewport.goto_top(),
            Action::ScrollBottom => {
                let total = self.preview_total();
                self.viewport.goto_bottom(total);
            }
            Action::HalfPageDown => {
                let total = self.preview_total();
                self.viewport.half_page_down(total);
            }
            Action::HalfPageUp => self.viewport.half_page_up(),
            Action::GrowList => {
                let height = self.registry.list_height();
                if height < self.max_list_height() {
                    self.registry.set_list_height(height + 1);
                    self.relayout();
                }
            }
            Action::ShrinkList => {
                let height = self.registry.list_height();
                if height > MIN_LIST_HEIGHT {
                    self.registry.set_list_height(height - 1);
                    self.relayout();
                }
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Quit => return vec![Effect::Quit],
        }
        Vec::new()
    }

    fn on_files_loaded(&mut self, files: Vec<FileEntry>) -> Vec<Effect> {
        self.files_loaded = true;
        let outcome = self.registry.apply_refresh(files);
        if self.registry.is_empty() {
            self.clear_preview();
            return Vec::new();
        }
        // Scroll is kept only when the file on screen is still the selection;
        // a selection whose preview never arrived opens like any other.
        let keep_scroll = outcome.same_file
            && self.shown.as_deref() == self.registry.selected().map(|e| e.path.as_path());
        // Content or diff may have changed on disk even for the same path.
        self.registry.clear_loaded();
        self.schedule_preview(keep_scroll)
    }

    fn on_debounce(&mut self, generation: u64) -> Vec<Effect> {
        let Some(pending) = self.pending.filter(|p| p.generation == generation) else {
            debug!(generation, "stale debounce ignored");
            return Vec::new();
        };
        self.pending = None;

        let index = self.registry.selected_index();
        if pending.index != index {
            debug!(generation, "debounce for a moved selection ignored");
            return Vec::new();
        }
        let Some(entry) = self.registry.selected().cloned() else {
            return Vec::new();
        };

        if self.preview.is_some() && self.registry.last_loaded_path() == Some(entry.path.as_path()) {
            debug!(path = %entry.path.display(), "preview already loaded");
            return Vec::new();
        }
        if let Some(content) = self.cache.get(&entry) {
            debug!(path = %entry.path.display(), "preview served from cache");
            self.dispatched = generation;
            self.apply_content(&entry, content, pending.keep_scroll);
            return Vec::new();
        }

        debug!(path = %entry.path.display(), index, generation, "preview load dispatched");
        self.dispatched = generation;
        vec![Effect::LoadPreview(PreviewRequest {
            generation,
            index,
            entry,
            keep_scroll: pending.keep_scroll,
        })]
    }

    fn on_preview_loaded(&mut self, loaded: PreviewLoaded) -> Vec<Effect> {
        if loaded.generation < self.dispatched {
            debug!(
                path = %loaded.path.display(),
                generation = loaded.generation,
                newest = self.dispatched,
                "superseded preview discarded"
            );
            return Vec::new();
        }
        let current = self
            .registry
            .selected()
            .filter(|e| self.registry.selected_index() == loaded.index && e.path == loaded.path)
            .cloned();
        let Some(entry) = current else {
            debug!(path = %loaded.path.display(), "stale preview discarded");
            return Vec::new();
        };
        self.cache.insert(&entry, Arc::clone(&loaded.content));
        self.apply_content(&entry, loaded.content, loaded.keep_scroll);
        Vec::new()
    }
}

/// Applies one message. Returns the next model and the effects to run.
pub fn update(mut model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    let effects = match msg {
        Msg::Action(action) => model.on_action(action),
        Msg::Resize { width, height } => {
            model.width = width;
            model.height = height;
            model.relayout();
            Vec::new()
        }
        Msg::Tick => vec![Effect::RefreshFiles],
        Msg::FilesLoaded(files) => model.on_files_loaded(files),
        Msg::DebounceFired { generation } => model.on_debounce(generation),
        Msg::PreviewLoaded(loaded) => model.on_preview_loaded(loaded),
    };
    (model, effects)
}
