//! Event bus for perch.
//!
//! All user input, timer ticks, and background-task results are normalised into
//! a single `AppEvent` enum and sent over a tokio unbounded MPSC channel. The
//! main loop receives from this channel, turns each event into a
//! [`perch_core::update::Msg`] where one applies, and redraws on `Render`.
//!
//! Two independent intervals drive the render and refresh cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Refresh interval** (2 s) re-reads the changed-file list.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use perch_core::preview::PreviewLoaded;
use perch_core::types::FileEntry;
use perch_core::update::REFRESH_INTERVAL;
use tokio::sync::mpsc;
use tokio::time::{interval, interval_at, Instant};

/// Frame interval.
pub const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// A mouse event from the terminal (wheel scrolling).
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Refresh tick (every 2 s).
    Tick,
    /// Render tick triggers a `terminal.draw()` call (≈30 FPS / 33 ms).
    Render,
    /// Fresh file list from the status worker.
    FilesLoaded(Vec<FileEntry>),
    /// A debounce sleep finished.
    DebounceFired { generation: u64 },
    /// A background preview build finished.
    PreviewLoaded(Box<PreviewLoaded>),
    /// Quit signal (from SIGTERM or a closed input stream).
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned and distributed to background tasks;
/// the receiver (`rx`) is owned by the main event loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that drives terminal input and timers.
///
/// - `reader.next().fuse()` keeps `tokio::select!` from polling a finished
///   stream future.
/// - Only `KeyEventKind::Press` is forwarded; Windows also reports releases.
/// - The first refresh tick is delayed by one period because startup already
///   requests a file list.
/// - The task ends once the receiver is gone.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut refresh_interval = interval_at(Instant::now() + REFRESH_INTERVAL, REFRESH_INTERVAL);
        let mut render_interval = interval(RENDER_INTERVAL);
        let mut reader = EventStream::new();

        loop {
            let refresh_tick = refresh_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let event = tokio::select! {
                _ = refresh_tick => AppEvent::Tick,
                _ = render_tick => AppEvent::Render,
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                    Some(Ok(Event::Resize(w, h))) => AppEvent::Resize(w, h),
                    Some(Ok(Event::Mouse(mouse))) => AppEvent::Mouse(mouse),
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => AppEvent::Quit,
                },
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    });
}
