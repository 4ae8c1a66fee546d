//! Debounced background saving
//!
//! ```text
//! editor.commit() ──submit──▶ ┌─────────────────────────┐
//!                             │ autosave task           │
//!                             │  pending: last state    │── idle elapsed ──▶ CardStore::save
//!                             │  timer reset on submit  │
//!                             └─────────────────────────┘
//!                                         │
//!                                 SaveNotice (broadcast)
//! ```
//!
//! Bursts of commits coalesce into one save of the newest state. A failed
//! save is reported and logged; the in-memory state is never touched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::CardState;
use crate::storage::CardStore;
use crate::types::CardId;

/// Default capacity for the notice broadcast channel
const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// Outcome of one background save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveNotice {
    Saved(CardId),
    Failed(String),
}

enum SaveRequest {
    State(CardState),
    /// Save whatever is pending right away
    Flush,
    /// Another card became active: drop pending work and the remembered id
    Reset,
}

/// Handle to the background save task
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<SaveRequest>,
    notice_tx: broadcast::Sender<SaveNotice>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Start the task. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn CardStore>, idle: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(save_loop(store, idle, rx, notice_tx.clone(), cancel.clone()));
        Self {
            tx,
            notice_tx,
            cancel,
            task,
        }
    }

    /// Subscribe to save notices
    pub fn subscribe(&self) -> broadcast::Receiver<SaveNotice> {
        self.notice_tx.subscribe()
    }

    /// Queue a committed state; restarts the idle timer
    pub fn submit(&self, state: CardState) {
        let _ = self.tx.send(SaveRequest::State(state));
    }

    /// Save the pending state without waiting for the idle period
    pub fn flush(&self) {
        let _ = self.tx.send(SaveRequest::Flush);
    }

    /// Forget pending work and the id of the previous card
    pub fn reset(&self) {
        let _ = self.tx.send(SaveRequest::Reset);
    }

    /// Save anything pending and stop the task
    pub async fn shutdown(self) {
        info!("Shutting down autosave");
        drop(self.tx);
        let _ = self.task.await;
    }

    /// Stop immediately, discarding pending work
    pub fn abort(&self) {
        self.cancel.cancel();
    }
}

async fn save_loop(
    store: Arc<dyn CardStore>,
    idle: Duration,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
    notice_tx: broadcast::Sender<SaveNotice>,
    cancel: CancellationToken,
) {
    debug!(idle_ms = idle.as_millis() as u64, "Autosave task started");
    let mut pending: Option<CardState> = None;
    // Id minted by the first save of this card, reused until the next reset
    let mut card_id: Option<CardId> = None;

    loop {
        let request = if pending.is_some() {
            tokio::select! {
                _ = cancel.cancelled() => break,
                request = rx.recv() => request,
                _ = tokio::time::sleep(idle) => Some(SaveRequest::Flush),
            }
        } else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                request = rx.recv() => request,
            }
        };

        match request {
            Some(SaveRequest::State(state)) => pending = Some(state),
            Some(SaveRequest::Flush) => {
                if let Some(state) = pending.take() {
                    save(&store, state, &mut card_id, &notice_tx).await;
                }
            }
            Some(SaveRequest::Reset) => {
                pending = None;
                card_id = None;
            }
            None => {
                if let Some(state) = pending.take() {
                    save(&store, state, &mut card_id, &notice_tx).await;
                }
                break;
            }
        }
    }
    debug!("Autosave task ended");
}

/// Run one save on the blocking pool; redb commits are synchronous
async fn save(
    store: &Arc<dyn CardStore>,
    mut state: CardState,
    card_id: &mut Option<CardId>,
    notice_tx: &broadcast::Sender<SaveNotice>,
) {
    if state.card_id.is_none() {
        state.card_id = card_id.clone();
    }
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || store.save(&state)).await;
    let notice = match result {
        Ok(Ok(id)) => {
            info!(%id, "Autosaved card");
            *card_id = Some(id.clone());
            SaveNotice::Saved(id)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Autosave failed");
            SaveNotice::Failed(e.to_string())
        }
        Err(e) => {
            warn!(error = %e, "Autosave task panicked");
            SaveNotice::Failed(e.to_string())
        }
    };
    let _ = notice_tx.send(notice);
}
