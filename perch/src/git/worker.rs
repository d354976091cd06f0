//! Background thread that produces the changed-file list.
//!
//! Listing walks the whole working tree, so it runs on its own
//! `std::thread` fed by a crossbeam channel. Results go back to the event
//! loop as `AppEvent::FilesLoaded`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use perch_core::source::StatusSource;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event::AppEvent;

/// Requests accepted by the status worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRequest {
    Refresh,
}

/// Spawns the worker. It exits when every `Sender` is dropped or the event
/// loop has gone away.
pub fn spawn_status_worker(
    dir: PathBuf,
    source: Arc<dyn StatusSource>,
    event_tx: UnboundedSender<AppEvent>,
) -> std::io::Result<(Sender<StatusRequest>, JoinHandle<()>)> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = std::thread::Builder::new()
        .name("perch-status".into())
        .spawn(move || status_worker_loop(&dir, source.as_ref(), &rx, &event_tx))?;
    Ok((tx, handle))
}

/// Serves requests until the channel closes. Requests that queued up while a
/// listing was running are coalesced into one.
pub fn status_worker_loop(
    dir: &Path,
    source: &dyn StatusSource,
    rx: &Receiver<StatusRequest>,
    event_tx: &UnboundedSender<AppEvent>,
) {
    while let Ok(StatusRequest::Refresh) = rx.recv() {
        let skipped = rx.try_iter().count();
        if skipped > 0 {
            debug!(skipped, "coalesced refresh requests");
        }
        match source.list_changed_files(dir) {
            Ok(files) => {
                debug!(count = files.len(), "file list refreshed");
                if event_tx.send(AppEvent::FilesLoaded(files)).is_err() {
                    break;
                }
            }
            Err(err) => warn!(%err, "listing changed files failed, keeping previous list"),
        }
    }
}
