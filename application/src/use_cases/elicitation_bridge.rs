//! Elicitation bridge
//!
//! Correlates the single outstanding elicitation of a session with its
//! eventual answer. Tool code calls [`ElicitationBridge::request`] and
//! suspends; the session sequencer resolves the request with
//! [`submit`](ElicitationBridge::submit), [`decline`](ElicitationBridge::decline)
//! or [`abort`](ElicitationBridge::abort).
//!
//! ```text
//!  Idle ──request──▶ Pending ──submit──▶ Answered ─┐
//!   ▲                   │  ├──decline─▶ Declined  ─┤
//!   │                   │  └──abort───▶ Aborted   ─┤
//!   │                   └─request─▶ Rejected       │
//!   └──────────────────────────────────────────────┘
//! ```

use crate::config::BridgeConfig;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::session_event::OutboundEvent;
use crate::use_cases::response_slot::ResponseSlot;
use async_trait::async_trait;
use mcpbot_domain::{
    AbortReason, AnswerConversionError, ElicitationError, ElicitationId, ElicitationOutcome,
    ElicitationPrompt, Elicitor, SessionId,
};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Result of a resolution attempt from the interactive side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The pending request was settled
    Settled(ElicitationId),
    /// Nothing was pending; the call had no effect
    NoPending,
}

struct PendingRequest {
    id: ElicitationId,
    prompt: ElicitationPrompt,
    slot: ResponseSlot,
}

#[derive(Default)]
struct BridgeState {
    pending: Option<PendingRequest>,
    /// Set once the session is torn down; every later request aborts with this reason
    closed: Option<AbortReason>,
    next_id: u64,
}

/// Per-session single-outstanding-request elicitation bridge.
pub struct ElicitationBridge {
    session_id: SessionId,
    state: Mutex<BridgeState>,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    config: BridgeConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ElicitationBridge {
    pub fn new(
        session_id: SessionId,
        outbound: mpsc::UnboundedSender<OutboundEvent>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            session_id,
            state: Mutex::new(BridgeState::default()),
            outbound,
            config,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    // The lock is never held across an await, so a poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the human for a value and wait for the outcome.
    ///
    /// Fails fast with [`ElicitationError::ConcurrentElicitationRejected`] when
    /// another request is outstanding. On every other path `pending` is
    /// cleared before this returns, including when the future is dropped.
    pub async fn request(
        &self,
        prompt: ElicitationPrompt,
    ) -> Result<ElicitationOutcome, ElicitationError> {
        let (id, waiter) = {
            let mut state = self.lock();
            if let Some(reason) = state.closed {
                debug!(session = %self.session_id, "Elicitation requested on a closed session");
                return Ok(ElicitationOutcome::Aborted(reason));
            }
            if let Some(current) = &state.pending {
                warn!(
                    session = %self.session_id,
                    pending = %current.id,
                    "Rejecting concurrent elicitation"
                );
                return Err(ElicitationError::ConcurrentElicitationRejected);
            }
            state.next_id += 1;
            let id = ElicitationId(state.next_id);
            let (slot, waiter) = ResponseSlot::create();
            state.pending = Some(PendingRequest {
                id,
                prompt: prompt.clone(),
                slot,
            });
            (id, waiter)
        };
        let _guard = PendingGuard { bridge: self, id };

        info!(session = %self.session_id, elicitation = %id, "Elicitation requested");
        self.conversation_logger.log(ConversationEvent::new(
            "elicitation_requested",
            json!({
                "session": self.session_id.to_string(),
                "elicitation": id.to_string(),
                "message": prompt.message,
                "shape": prompt.shape,
            }),
        ));

        let event = OutboundEvent::ElicitationPrompt {
            id,
            message: prompt.message,
            shape: prompt.shape,
        };
        if self.outbound.send(event).is_err() {
            warn!(session = %self.session_id, elicitation = %id, "Transport closed before prompt delivery");
            return Ok(ElicitationOutcome::Aborted(AbortReason::TransportClosed));
        }

        let outcome = match self.config.elicitation_timeout {
            Some(limit) => tokio::time::timeout(limit, waiter.wait())
                .await
                .unwrap_or_else(|_| {
                    info!(session = %self.session_id, elicitation = %id, "Elicitation timed out");
                    ElicitationOutcome::Aborted(AbortReason::TimedOut)
                }),
            None => waiter.wait().await,
        };
        Ok(outcome)
    }

    /// Resolve the pending request with a raw answer.
    ///
    /// A reply that does not fit the expected shape is returned as an error
    /// and leaves the request pending.
    pub fn submit(&self, raw: &str) -> Result<SubmitStatus, AnswerConversionError> {
        let mut state = self.lock();
        let value = match &state.pending {
            Some(pending) => pending.prompt.shape.convert(raw)?,
            None => {
                debug!(session = %self.session_id, "Answer with no pending elicitation ignored");
                return Ok(SubmitStatus::NoPending);
            }
        };
        let pending = state.pending.take();
        drop(state);
        Ok(self.settle(pending, ElicitationOutcome::Answered(value)))
    }

    /// Resolve the pending request as declined by the human.
    pub fn decline(&self) -> SubmitStatus {
        let pending = self.lock().pending.take();
        self.settle(pending, ElicitationOutcome::Declined)
    }

    /// Resolve the pending request as aborted.
    pub fn abort(&self, reason: AbortReason) -> SubmitStatus {
        let pending = self.lock().pending.take();
        self.settle(pending, ElicitationOutcome::Aborted(reason))
    }

    /// Abort whatever is pending and refuse every later request.
    pub fn close(&self, reason: AbortReason) -> SubmitStatus {
        let pending = {
            let mut state = self.lock();
            if state.closed.is_none() {
                state.closed = Some(reason);
            }
            state.pending.take()
        };
        self.settle(pending, ElicitationOutcome::Aborted(reason))
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed.is_some()
    }

    /// The outstanding prompt, if any.
    pub fn pending_prompt(&self) -> Option<(ElicitationId, ElicitationPrompt)> {
        self.lock()
            .pending
            .as_ref()
            .map(|p| (p.id, p.prompt.clone()))
    }

    fn settle(&self, pending: Option<PendingRequest>, outcome: ElicitationOutcome) -> SubmitStatus {
        let Some(PendingRequest { id, mut slot, .. }) = pending else {
            return SubmitStatus::NoPending;
        };
        info!(
            session = %self.session_id,
            elicitation = %id,
            action = outcome.action(),
            "Elicitation settled"
        );
        self.conversation_logger.log(ConversationEvent::new(
            "elicitation_settled",
            json!({
                "session": self.session_id.to_string(),
                "elicitation": id.to_string(),
                "action": outcome.action(),
                "outcome": outcome,
            }),
        ));
        if let Err(e) = slot.settle(outcome) {
            debug!(session = %self.session_id, elicitation = %id, error = %e, "Settlement not delivered");
        }
        SubmitStatus::Settled(id)
    }
}

#[async_trait]
impl Elicitor for ElicitationBridge {
    async fn elicit(
        &self,
        prompt: ElicitationPrompt,
    ) -> Result<ElicitationOutcome, ElicitationError> {
        self.request(prompt).await
    }
}

/// Clears `pending` for one request on every exit path.
struct PendingGuard<'a> {
    bridge: &'a ElicitationBridge,
    id: ElicitationId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.bridge.lock();
        if state.pending.as_ref().is_some_and(|p| p.id == self.id) {
            state.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpbot_domain::ExpectedShape;
    use serde_json::json;
    use std::time::Duration;

    fn create_test_bridge(
        config: BridgeConfig,
    ) -> (Arc<ElicitationBridge>, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ElicitationBridge::new(SessionId(1), tx, config)), rx)
    }

    fn confirm() -> ElicitationPrompt {
        ElicitationPrompt::new("Do you want to roll 3 dice?", ExpectedShape::confirmation())
    }

    /// Spawn a request and wait until its prompt has been published.
    async fn spawn_request(
        bridge: &Arc<ElicitationBridge>,
        rx: &mut mpsc::UnboundedReceiver<OutboundEvent>,
    ) -> tokio::task::JoinHandle<Result<ElicitationOutcome, ElicitationError>> {
        let b = bridge.clone();
        let handle = tokio::spawn(async move { b.request(confirm()).await });
        match rx.recv().await {
            Some(OutboundEvent::ElicitationPrompt { message, .. }) => {
                assert_eq!(message, "Do you want to roll 3 dice?");
            }
            other => panic!("expected prompt, got {other:?}"),
        }
        handle
    }

    #[tokio::test]
    async fn test_submit_answers_request() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        let handle = spawn_request(&bridge, &mut rx).await;

        assert!(bridge.is_pending());
        assert!(matches!(bridge.submit("y"), Ok(SubmitStatus::Settled(_))));

        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome, ElicitationOutcome::Answered(json!("y")));
        assert!(!bridge.is_pending());
    }

    #[tokio::test]
    async fn test_concurrent_request_rejected() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        let first = spawn_request(&bridge, &mut rx).await;

        let second = bridge.request(confirm()).await;
        assert_eq!(second, Err(ElicitationError::ConcurrentElicitationRejected));
        assert!(rx.try_recv().is_err());

        // The first request is untouched.
        assert!(bridge.is_pending());
        bridge.decline();
        assert_eq!(first.await.unwrap().unwrap(), ElicitationOutcome::Declined);
        assert!(!bridge.is_pending());
    }

    #[tokio::test]
    async fn test_invalid_answer_leaves_request_pending() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        let handle = spawn_request(&bridge, &mut rx).await;

        let err = bridge.submit("maybe").unwrap_err();
        assert_eq!(err.raw, "maybe");
        assert!(bridge.is_pending());
        assert!(!handle.is_finished());

        bridge.submit("YES").unwrap();
        assert_eq!(
            handle.await.unwrap().unwrap(),
            ElicitationOutcome::Answered(json!("yes"))
        );
    }

    #[tokio::test]
    async fn test_abort_unblocks_waiter() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        let handle = spawn_request(&bridge, &mut rx).await;

        assert!(matches!(
            bridge.abort(AbortReason::Disconnected),
            SubmitStatus::Settled(_)
        ));
        assert_eq!(
            handle.await.unwrap().unwrap(),
            ElicitationOutcome::Aborted(AbortReason::Disconnected)
        );
        assert!(!bridge.is_pending());

        // Abort is not terminal; the bridge keeps cycling.
        let again = spawn_request(&bridge, &mut rx).await;
        bridge.submit("y").unwrap();
        assert!(again.await.unwrap().unwrap().is_answered());
    }

    #[tokio::test]
    async fn test_stray_submit_is_noop() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());

        assert_eq!(bridge.submit("y"), Ok(SubmitStatus::NoPending));
        assert_eq!(bridge.decline(), SubmitStatus::NoPending);
        assert_eq!(bridge.abort(AbortReason::Disconnected), SubmitStatus::NoPending);

        let handle = spawn_request(&bridge, &mut rx).await;
        assert!(!handle.is_finished());
        bridge.submit("y").unwrap();
        assert!(handle.await.unwrap().unwrap().is_answered());
    }

    #[tokio::test]
    async fn test_closed_bridge_aborts_immediately() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        let handle = spawn_request(&bridge, &mut rx).await;

        bridge.close(AbortReason::Disconnected);
        assert_eq!(
            handle.await.unwrap().unwrap(),
            ElicitationOutcome::Aborted(AbortReason::Disconnected)
        );

        let later = bridge.request(confirm()).await.unwrap();
        assert_eq!(later, ElicitationOutcome::Aborted(AbortReason::Disconnected));
        assert!(bridge.is_closed());
        assert!(!bridge.is_pending());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_transport_closed_aborts_and_clears() {
        let (bridge, rx) = create_test_bridge(BridgeConfig::default());
        drop(rx);

        let outcome = bridge.request(confirm()).await.unwrap();
        assert_eq!(outcome, ElicitationOutcome::Aborted(AbortReason::TransportClosed));
        assert!(!bridge.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_and_clears() {
        let config = BridgeConfig::default().with_timeout(Duration::from_secs(30));
        let (bridge, mut rx) = create_test_bridge(config);
        let handle = spawn_request(&bridge, &mut rx).await;

        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(
            handle.await.unwrap().unwrap(),
            ElicitationOutcome::Aborted(AbortReason::TimedOut)
        );
        assert!(!bridge.is_pending());
        assert_eq!(bridge.submit("y"), Ok(SubmitStatus::NoPending));
    }

    #[tokio::test]
    async fn test_cancelled_request_clears_pending() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        let handle = spawn_request(&bridge, &mut rx).await;

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!bridge.is_pending());
    }

    #[tokio::test]
    async fn test_pending_prompt_exposes_shape() {
        let (bridge, mut rx) = create_test_bridge(BridgeConfig::default());
        assert!(bridge.pending_prompt().is_none());

        let _handle = spawn_request(&bridge, &mut rx).await;
        let (id, prompt) = bridge.pending_prompt().unwrap();
        assert_eq!(id, ElicitationId(1));
        assert_eq!(prompt.shape, ExpectedShape::confirmation());
    }
}
