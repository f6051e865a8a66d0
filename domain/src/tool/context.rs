//! Per-call tool context

use crate::elicitation::{AutoDeclineElicitor, Elicitor};
use crate::session::SessionId;
use std::sync::Arc;

/// Context handed to every tool execution.
///
/// Carries the elicitor of the session whose generation invoked the tool,
/// so a tool can pause and ask the human at that session.
#[derive(Clone)]
pub struct ToolContext {
    session_id: Option<SessionId>,
    elicitor: Arc<dyn Elicitor>,
}

impl ToolContext {
    pub fn new(session_id: SessionId, elicitor: Arc<dyn Elicitor>) -> Self {
        Self {
            session_id: Some(session_id),
            elicitor,
        }
    }

    /// Context with no human attached; every elicitation is declined.
    pub fn detached() -> Self {
        Self {
            session_id: None,
            elicitor: Arc::new(AutoDeclineElicitor),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn elicitor(&self) -> &dyn Elicitor {
        self.elicitor.as_ref()
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
