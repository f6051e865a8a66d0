//! Session registry
//!
//! Keyed map of live sessions. Every connection gets its own [`ChatSession`]
//! and therefore its own elicitation bridge; sessions never share state.

use crate::ports::session_event::{InboundEvent, OutboundEvent};
use crate::use_cases::chat_session::{ChatServices, ChatSession, SessionHandle};
use mcpbot_domain::SessionId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::{info, warn};

type SessionMap = Arc<RwLock<HashMap<SessionId, SessionHandle>>>;

/// Registry of live chat sessions.
pub struct SessionRegistry {
    services: ChatServices,
    sessions: SessionMap,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new(services: ChatServices) -> Self {
        Self {
            services,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Open a new session writing to `outbound`.
    ///
    /// The session removes itself from the registry once torn down.
    pub fn open(&self, outbound: mpsc::UnboundedSender<OutboundEvent>) -> SessionHandle {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (handle, task) = ChatSession::spawn(id, self.services.clone(), outbound);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle.clone());
        info!(session = %id, live = self.len(), "Session opened");

        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            match task.await {
                Ok(summary) => info!(
                    session = %summary.id,
                    reason = %summary.reason,
                    turns = summary.turns,
                    "Session closed"
                ),
                Err(e) => warn!(session = %id, error = %e, "Session task failed"),
            }
            sessions
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        });
        handle
    }

    pub fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disconnect every live session (process shutdown).
    pub fn close_all(&self) {
        let handles: Vec<_> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for handle in handles {
            let _ = handle.send(InboundEvent::Disconnect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation_gateway::{
        GatewayError, GenerationGateway, GenerationReply, GenerationRequest,
    };
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedGateway;

    #[async_trait]
    impl GenerationGateway for FixedGateway {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationReply, GatewayError> {
            Ok(GenerationReply::new("ok"))
        }
    }

    async fn wait_until_empty(registry: &SessionRegistry) {
        for _ in 0..100 {
            if registry.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sessions still registered: {:?}", registry.ids());
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_ids() {
        let registry = SessionRegistry::new(ChatServices::new(Arc::new(FixedGateway)));
        let (tx, _rx) = mpsc::unbounded_channel();

        let a = registry.open(tx.clone());
        let b = registry.open(tx);

        assert_ne!(a.id(), b.id());
        assert_eq!(registry.ids(), vec![a.id(), b.id()]);
        assert!(registry.get(a.id()).is_some());
    }

    #[tokio::test]
    async fn test_session_removed_after_disconnect() {
        let registry = SessionRegistry::new(ChatServices::new(Arc::new(FixedGateway)));
        let (tx, _rx) = mpsc::unbounded_channel();

        let handle = registry.open(tx);
        handle.send(InboundEvent::Disconnect).unwrap();

        wait_until_empty(&registry).await;
        assert!(registry.get(handle.id()).is_none());
    }

    #[tokio::test]
    async fn test_close_all() {
        let registry = SessionRegistry::new(ChatServices::new(Arc::new(FixedGateway)));
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.open(tx.clone());
        registry.open(tx);
        assert_eq!(registry.len(), 2);

        registry.close_all();
        wait_until_empty(&registry).await;
    }
}
