//! Event loop binding a dispatcher to the host's event stream.
//!
//! The session multiplexes host events with the single dataset fetch on the
//! current task. Nodes are `Rc`-based, so the session future is `!Send` and
//! runs on a current-thread runtime (or inside a `LocalSet`).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

use fceplus_dataset::{DatasetError, ReferenceDataset};
use fceplus_dom::Document;

use crate::config::EngineConfig;
use crate::dispatcher::{Dispatcher, HostEvent};

/// Sending side of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<HostEvent>,
    dataset_settled: Arc<Notify>,
}

impl SessionHandle {
    /// Queue a host event. Returns `false` once the session has ended.
    pub fn send(&self, event: HostEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Wait until the dataset fetch has settled and been handled.
    pub async fn dataset_settled(&self) {
        self.dataset_settled.notified().await;
    }
}

/// A running annotation session for one page.
pub struct Session {
    dispatcher: Dispatcher,
    events: mpsc::UnboundedReceiver<HostEvent>,
    dataset_settled: Arc<Notify>,
}

impl Session {
    /// Create a session for `document` and the handle that feeds it.
    pub fn new(document: Document, config: &EngineConfig) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dataset_settled = Arc::new(Notify::new());
        let session = Self {
            dispatcher: Dispatcher::new(document, config),
            events: rx,
            dataset_settled: dataset_settled.clone(),
        };
        let handle = SessionHandle {
            events: tx,
            dataset_settled,
        };
        (session, handle)
    }

    /// Run until every handle is dropped and the dataset fetch has settled.
    ///
    /// Returns the disposed dispatcher so its final state can be inspected.
    pub async fn run<F>(mut self, load: F) -> Dispatcher
    where
        F: Future<Output = Result<ReferenceDataset, DatasetError>>,
    {
        info!("Session started");
        tokio::pin!(load);
        let mut load_pending = true;
        let mut events_open = true;

        while load_pending || events_open {
            // Host events already queued go before the dataset result.
            tokio::select! {
                biased;
                event = self.events.recv(), if events_open => match event {
                    Some(event) => self.dispatcher.handle(event),
                    None => {
                        debug!("Host event channel closed");
                        events_open = false;
                    }
                },
                result = &mut load, if load_pending => {
                    load_pending = false;
                    self.dispatcher.handle(HostEvent::DatasetLoaded(result));
                    self.dataset_settled.notify_one();
                }
            }
        }

        self.dispatcher.dispose();
        info!(total = self.dispatcher.aggregate().total(), "Session ended");
        self.dispatcher
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
