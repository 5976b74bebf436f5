//! Single-resolution outcome slot shared by the reader, writer and timer.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

use super::TransferOutcome;

/// The first `resolve` call decides the transfer outcome; later calls are no-ops.
#[derive(Clone)]
pub(crate) struct OutcomeSlot {
    sender: Arc<Mutex<Option<oneshot::Sender<TransferOutcome>>>>,
}

impl OutcomeSlot {
    pub(crate) fn new() -> (Self, oneshot::Receiver<TransferOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Report a terminal signal. Returns true if this signal decided the outcome.
    pub(crate) fn resolve(&self, outcome: TransferOutcome) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                tracing::debug!(outcome = ?outcome, "transfer outcome decided");
                tx.send(outcome).is_ok()
            }
            None => {
                tracing::debug!(late = ?outcome, "signal arrived after outcome was decided");
                false
            }
        }
    }
}
