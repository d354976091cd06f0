//! End-to-end runs of the update loop with effects executed by hand.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use perch_core::source::{PlainHighlighter, StatusSource};
use perch_core::types::{DiffStats, FileEntry, Origin};
use perch_core::update::{
    update, Action, Effect, Model, Msg, PreviewView, CHROME_ROWS, DEBOUNCE, MIN_LIST_HEIGHT,
};
use perch_core::Result;
use tempfile::TempDir;

#[derive(Default)]
struct FakeSource {
    diffs: HashMap<PathBuf, String>,
}

impl StatusSource for FakeSource {
    fn list_changed_files(&self, _dir: &Path) -> Result<Vec<FileEntry>> {
        Ok(Vec::new())
    }

    fn unified_diff(&self, _git_root: &Path, repo_path: &Path) -> Result<String> {
        Ok(self.diffs.get(repo_path).cloned().unwrap_or_default())
    }

    fn diff_summary(&self, _git_root: &Path, _repo_path: &Path) -> Result<DiffStats> {
        Ok(DiffStats::default())
    }
}

struct Harness {
    dir: TempDir,
    source: FakeSource,
    model: Option<Model>,
    loads: Vec<PathBuf>,
    refreshes: usize,
}

impl Harness {
    fn new(width: usize, height: usize) -> Self {
        let (model, effects) = Model::init(width, height);
        assert!(matches!(effects.as_slice(), [Effect::RefreshFiles]));
        Self {
            dir: TempDir::new().unwrap(),
            source: FakeSource::default(),
            model: Some(model),
            loads: Vec::new(),
            refreshes: 0,
        }
    }

    fn model(&mut self) -> &mut Model {
        self.model.as_mut().unwrap()
    }

    fn file(&self, name: &str, lines: usize, origin: Origin) -> FileEntry {
        let text: String = (1..=lines).map(|i| format!("line {i}\n")).collect();
        fs::write(self.dir.path().join(name), text).unwrap();
        FileEntry {
            path: PathBuf::from(name),
            abs_path: self.dir.path().join(name),
            repo_path: PathBuf::from(name),
            git_root: self.dir.path().to_path_buf(),
            origin,
            change_code: if origin == Origin::Committed { String::new() } else { " M".into() },
            commit_id: (origin == Origin::Committed).then(|| format!("c-{name}")),
            commit_age: None,
            mod_time: SystemTime::UNIX_EPOCH,
        }
    }

    /// Feeds one message without running any effects.
    fn send(&mut self, msg: Msg) -> Vec<Effect> {
        let model = self.model.take().unwrap();
        let (model, effects) = update(model, msg);
        self.model = Some(model);
        effects
    }

    /// Feeds one message and runs every resulting effect to completion.
    fn settle(&mut self, msg: Msg) {
        let mut queue = vec![msg];
        while let Some(msg) = queue.pop() {
            for effect in self.send(msg) {
                match effect {
                    Effect::ScheduleDebounce { generation, delay } => {
                        assert_eq!(delay, DEBOUNCE);
                        queue.push(Msg::DebounceFired { generation });
                    }
                    Effect::LoadPreview(request) => {
                        self.loads.push(request.entry.path.clone());
                        queue.push(Msg::PreviewLoaded(request.run(&self.source, &PlainHighlighter)));
                    }
                    Effect::RefreshFiles => self.refreshes += 1,
                    Effect::Quit => {}
                }
            }
        }
    }

    fn shown(&mut self) -> Option<String> {
        self.model()
            .preview_content()
            .and_then(|c| c.raw_lines.first().cloned())
    }
}

#[test]
fn first_refresh_loads_the_top_file() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("a.txt", 3, Origin::Uncommitted), h.file("b.txt", 3, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files));

    assert_eq!(h.loads, vec![PathBuf::from("a.txt")]);
    assert!(h.model().files_loaded);
    let loaded = h.model().registry.last_loaded_path().map(Path::to_path_buf);
    assert_eq!(loaded, Some(PathBuf::from("a.txt")));
    assert!(matches!(h.model().preview_view(), PreviewView::Rows(rows) if rows.len() == 3));
}

#[test]
fn rapid_selection_changes_load_once() {
    let mut h = Harness::new(80, 30);
    let files: Vec<_> = (0..5).map(|i| h.file(&format!("f{i}.txt"), 2, Origin::Uncommitted)).collect();
    h.settle(Msg::FilesLoaded(files));
    h.loads.clear();

    let mut generations = Vec::new();
    for _ in 0..3 {
        for effect in h.send(Msg::Action(Action::SelectNext)) {
            match effect {
                Effect::ScheduleDebounce { generation, .. } => generations.push(generation),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
    assert_eq!(generations.len(), 3);

    for generation in &generations[..2] {
        assert!(h.send(Msg::DebounceFired { generation: *generation }).is_empty());
    }
    h.settle(Msg::DebounceFired { generation: generations[2] });

    assert_eq!(h.loads, vec![PathBuf::from("f3.txt")]);
    assert_eq!(h.model().registry.selected_index(), 3);
}

#[test]
fn committed_file_is_loaded_once() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("c.txt", 4, Origin::Committed), h.file("u.txt", 4, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files));

    h.settle(Msg::Action(Action::SelectNext));
    h.settle(Msg::Action(Action::SelectPrev));
    h.settle(Msg::Action(Action::SelectNext));

    let committed = h.loads.iter().filter(|p| p.as_path() == Path::new("c.txt")).count();
    let uncommitted = h.loads.iter().filter(|p| p.as_path() == Path::new("u.txt")).count();
    assert_eq!(committed, 1);
    assert_eq!(uncommitted, 2);
    assert_eq!(h.model().cache().len(), 1);
}

#[test]
fn stale_preview_is_discarded() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("a.txt", 2, Origin::Uncommitted), h.file("b.txt", 2, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files));

    let mut effects = h.send(Msg::Action(Action::SelectNext));
    let Some(Effect::ScheduleDebounce { generation, .. }) = effects.pop() else {
        panic!("expected a debounce");
    };
    let Some(Effect::LoadPreview(request)) = h.send(Msg::DebounceFired { generation }).pop() else {
        panic!("expected a load");
    };

    // The user moves back before the build for b.txt finishes.
    h.send(Msg::Action(Action::SelectPrev));
    let loaded = request.run(&h.source, &PlainHighlighter);
    assert!(h.send(Msg::PreviewLoaded(loaded)).is_empty());

    let shown = h.model().registry.last_loaded_path().map(Path::to_path_buf);
    assert_eq!(shown, Some(PathBuf::from("a.txt")));
}

#[test]
fn uncommitted_preview_opens_at_the_first_change() {
    let mut h = Harness::new(80, 30);
    h.source.diffs.insert(PathBuf::from("big.rs"), "@@ -29,0 +30 @@\n+line 30\n".into());
    let files = vec![h.file("big.rs", 60, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files));

    assert_eq!(h.model().viewport.offset, 29 - 3);
}

#[test]
fn refresh_of_the_same_file_keeps_scroll() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("a.txt", 100, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files.clone()));
    h.settle(Msg::Action(Action::ScrollDown(17)));
    assert_eq!(h.model().viewport.offset, 17);

    h.settle(Msg::Tick);
    assert_eq!(h.refreshes, 1);
    h.settle(Msg::FilesLoaded(files));

    assert_eq!(h.loads.len(), 2);
    assert_eq!(h.model().viewport.offset, 17);
}

#[test]
fn new_file_at_the_top_resets_scroll() {
    let mut h = Harness::new(80, 30);
    let a = h.file("a.txt", 100, Origin::Uncommitted);
    h.settle(Msg::FilesLoaded(vec![a.clone()]));
    h.settle(Msg::Action(Action::ScrollDown(40)));

    let b = h.file("b.txt", 100, Origin::Uncommitted);
    h.settle(Msg::FilesLoaded(vec![b, a]));
    assert_eq!(h.shown().as_deref(), Some("line 1"));
    assert_eq!(h.model().registry.last_loaded_path(), Some(Path::new("b.txt")));
    assert_eq!(h.model().viewport.offset, 0);
}

#[test]
fn empty_list_clears_the_preview() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("a.txt", 3, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files));
    assert!(h.model().preview().is_some());

    h.settle(Msg::FilesLoaded(Vec::new()));
    assert!(h.model().preview().is_none());
    assert!(h.model().preview_view().is_empty());
    assert!(h.model().pending_generation().is_none());
}

#[test]
fn message_previews_are_centred() {
    let mut h = Harness::new(60, 30);
    let mut gone = h.file("gone.txt", 1, Origin::Uncommitted);
    gone.change_code = " D".into();
    h.settle(Msg::FilesLoaded(vec![gone]));

    let PreviewView::Message(rows) = h.model().preview_view() else {
        panic!("expected a message");
    };
    assert_eq!(rows.last().map(|r| r.trim()), Some("gone.txt was deleted"));
}

#[test]
fn list_height_is_bounded() {
    let mut h = Harness::new(80, 20);
    let before = h.model().preview_height();
    h.settle(Msg::Action(Action::ShrinkList));
    assert_eq!(h.model().preview_height(), before + 1);

    for _ in 0..50 {
        h.settle(Msg::Action(Action::ShrinkList));
    }
    assert_eq!(h.model().registry.list_height(), 3);

    for _ in 0..50 {
        h.settle(Msg::Action(Action::GrowList));
    }
    assert_eq!(h.model().registry.list_height(), 20 - 10);
    assert!(h.model().preview_height() >= 1);
}

#[test]
fn resize_rewraps_and_clamps() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("a.txt", 40, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files));
    h.settle(Msg::Action(Action::ScrollBottom));
    let bottom = h.model().viewport.offset;
    assert_eq!(bottom, 40 - h.model().preview_height());

    h.settle(Msg::Resize { width: 100, height: 60 });
    assert_eq!(h.model().viewport.width, 100);
    assert_eq!(h.model().viewport.offset, 0);
}

#[test]
fn quit_and_help() {
    let mut h = Harness::new(80, 30);
    assert!(matches!(h.send(Msg::Action(Action::Quit)).as_slice(), [Effect::Quit]));
    h.send(Msg::Action(Action::ToggleHelp));
    assert!(h.model().show_help);
    h.send(Msg::Action(Action::ToggleHelp));
    assert!(!h.model().show_help);
}

#[test]
fn refresh_interval_is_two_seconds() {
    assert_eq!(perch_core::update::REFRESH_INTERVAL, Duration::from_secs(2));
}

#[test]
fn refresh_before_the_debounce_still_opens_at_the_first_change() {
    let mut h = Harness::new(80, 30);
    h.source.diffs.insert(PathBuf::from("b.rs"), "@@ -49,0 +50 @@\n+line 50\n".into());
    let files = vec![h.file("a.rs", 100, Origin::Uncommitted), h.file("b.rs", 100, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files.clone()));
    h.settle(Msg::Action(Action::ScrollDown(80)));
    assert_eq!(h.model().viewport.offset, 80);

    // The refresh lands while the debounce for b.rs is still waiting.
    assert!(!h.send(Msg::Action(Action::SelectNext)).is_empty());
    h.settle(Msg::FilesLoaded(files));

    assert_eq!(h.model().registry.last_loaded_path(), Some(Path::new("b.rs")));
    assert_eq!(h.model().viewport.offset, 49 - 3);
}

#[test]
fn older_build_of_the_same_file_does_not_replace_a_newer_one() {
    let mut h = Harness::new(80, 30);
    let files = vec![h.file("a.txt", 5, Origin::Uncommitted)];
    h.settle(Msg::FilesLoaded(files.clone()));

    let build = |h: &mut Harness| {
        let Some(Effect::ScheduleDebounce { generation, .. }) = h.send(Msg::FilesLoaded(files.clone())).pop() else {
            panic!("expected a debounce");
        };
        let Some(Effect::LoadPreview(request)) = h.send(Msg::DebounceFired { generation }).pop() else {
            panic!("expected a load");
        };
        request.run(&h.source, &PlainHighlighter)
    };

    let older = build(&mut h);
    fs::write(h.dir.path().join("a.txt"), "NEW 1\nNEW 2\n").unwrap();
    let newer = build(&mut h);
    assert!(older.generation < newer.generation);

    h.send(Msg::PreviewLoaded(newer));
    assert_eq!(h.shown().as_deref(), Some("NEW 1"));
    h.send(Msg::PreviewLoaded(older));
    assert_eq!(h.shown().as_deref(), Some("NEW 1"));
}

#[test]
fn shrinking_terminal_shrinks_an_oversized_list() {
    let mut h = Harness::new(80, 40);
    for _ in 0..30 {
        h.settle(Msg::Action(Action::GrowList));
    }
    assert_eq!(h.model().registry.list_height(), 30);

    h.settle(Msg::Resize { width: 80, height: 20 });
    assert_eq!(h.model().registry.list_height(), 10);
    assert_eq!(h.model().preview_height(), 20 - 10 - CHROME_ROWS);

    h.settle(Msg::Resize { width: 80, height: 8 });
    assert_eq!(h.model().registry.list_height(), MIN_LIST_HEIGHT);
}
