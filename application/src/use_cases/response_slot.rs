//! One-shot, exactly-once-settled reply holder.
//!
//! A [`ResponseSlot`] is the producer half, owned by the bridge's pending
//! request; a [`SlotWaiter`] is the consumer half, held by the suspended
//! tool call.

use mcpbot_domain::{AbortReason, ElicitationOutcome};
use thiserror::Error;
use tokio::sync::oneshot;

/// Settlement failures. Logged by the bridge, never seen by the waiter.
#[derive(Debug, Error, PartialEq)]
pub enum SlotError {
    #[error("response slot already settled")]
    AlreadySettled,

    /// The waiter stopped listening (timed out or cancelled) before the outcome arrived.
    #[error("response slot waiter is gone")]
    WaiterGone(ElicitationOutcome),
}

/// Producer half of a response slot.
#[derive(Debug)]
pub struct ResponseSlot {
    tx: Option<oneshot::Sender<ElicitationOutcome>>,
}

/// Consumer half of a response slot.
#[derive(Debug)]
pub struct SlotWaiter {
    rx: oneshot::Receiver<ElicitationOutcome>,
}

impl ResponseSlot {
    /// Create a fresh, unsettled slot and its waiter.
    pub fn create() -> (ResponseSlot, SlotWaiter) {
        let (tx, rx) = oneshot::channel();
        (ResponseSlot { tx: Some(tx) }, SlotWaiter { rx })
    }

    /// Settle the slot. The first call wins.
    pub fn settle(&mut self, outcome: ElicitationOutcome) -> Result<(), SlotError> {
        let tx = self.tx.take().ok_or(SlotError::AlreadySettled)?;
        tx.send(outcome).map_err(SlotError::WaiterGone)
    }

    pub fn is_settled(&self) -> bool {
        self.tx.is_none()
    }
}

impl SlotWaiter {
    /// Wait for the outcome.
    ///
    /// A slot dropped without being settled yields `Aborted(SessionClosed)`.
    pub async fn wait(self) -> ElicitationOutcome {
        self.rx
            .await
            .unwrap_or(ElicitationOutcome::Aborted(AbortReason::SessionClosed))
    }
}
