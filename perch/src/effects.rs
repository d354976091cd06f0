//! Runs the side effects that `perch_core::update` asks for.
//!
//! Every effect finishes by sending an [`AppEvent`] back to the main loop,
//! so the model only ever changes inside `update`.

use std::ops::ControlFlow;
use std::sync::Arc;

use crossbeam_channel::Sender;
use perch_core::source::{Highlighter, StatusSource};
use perch_core::update::Effect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event::AppEvent;
use crate::git::worker::StatusRequest;

pub struct Executor {
    event_tx: UnboundedSender<AppEvent>,
    status_tx: Sender<StatusRequest>,
    source: Arc<dyn StatusSource>,
    highlighter: Arc<dyn Highlighter>,
}

impl Executor {
    pub fn new(
        event_tx: UnboundedSender<AppEvent>,
        status_tx: Sender<StatusRequest>,
        source: Arc<dyn StatusSource>,
        highlighter: Arc<dyn Highlighter>,
    ) -> Self {
        Self {
            event_tx,
            status_tx,
            source,
            highlighter,
        }
    }

    /// Starts every effect in order. Returns `Break` on `Effect::Quit`;
    /// effects after it are dropped.
    pub fn execute(&self, effects: Vec<Effect>) -> ControlFlow<()> {
        for effect in effects {
            match effect {
                Effect::ScheduleDebounce { generation, delay } => {
                    let tx = self.event_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(AppEvent::DebounceFired { generation });
                    });
                }
                Effect::LoadPreview(request) => {
                    debug!(path = %request.entry.path.display(), index = request.index, "loading preview");
                    let tx = self.event_tx.clone();
                    let source = Arc::clone(&self.source);
                    let highlighter = Arc::clone(&self.highlighter);
                    tokio::spawn(async move {
                        let built = tokio::task::spawn_blocking(move || {
                            request.run(source.as_ref(), highlighter.as_ref())
                        })
                        .await;
                        match built {
                            Ok(loaded) => {
                                let _ = tx.send(AppEvent::PreviewLoaded(Box::new(loaded)));
                            }
                            Err(err) => warn!(%err, "preview build task failed"),
                        }
                    });
                }
                Effect::RefreshFiles => {
                    if self.status_tx.send(StatusRequest::Refresh).is_err() {
                        warn!("status worker is gone, refresh skipped");
                    }
                }
                Effect::Quit => return ControlFlow::Break(()),
            }
        }
        ControlFlow::Continue(())
    }
}
