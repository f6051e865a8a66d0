//! Session event types exchanged with transport adapters
//!
//! [`InboundEvent`]s flow from a transport (WebSocket, terminal) into a
//! [`ChatSession`](crate::use_cases::chat_session::ChatSession);
//! [`OutboundEvent`]s flow back out to be rendered or serialized.

use mcpbot_domain::{AnswerIntent, ElicitationId, ExpectedShape, Role};

/// Events a transport delivers to a session, processed in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A new chat message from the human
    UserMessage(String),
    /// A reply to the pending elicitation prompt
    ElicitationAnswer { text: String, intent: AnswerIntent },
    /// Clear the conversation history
    Reset,
    /// The remote peer went away
    Disconnect,
    /// The transport hit an unrecoverable error
    FatalError(String),
}

impl InboundEvent {
    /// Answer whose intent is inferred from its text.
    pub fn answer(text: impl Into<String>) -> Self {
        let text = text.into();
        let intent = AnswerIntent::infer(&text);
        InboundEvent::ElicitationAnswer { text, intent }
    }
}

/// Events a session emits for its transport to render
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Informational notice (welcome, history cleared)
    System(String),
    /// Echo of a message accepted into history
    Echo { role: Role, text: String },
    /// A generation has started
    Thinking,
    /// A tool is waiting for the human
    ElicitationPrompt {
        id: ElicitationId,
        message: String,
        shape: ExpectedShape,
    },
    /// Final reply of a generation
    AssistantReply(String),
    /// Something went wrong; the session is still usable
    Error(String),
}

impl OutboundEvent {
    /// Wire name of the event kind, as used by the web protocol.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEvent::System(_) => "system",
            OutboundEvent::Echo { .. } => "user",
            OutboundEvent::Thinking => "thinking",
            OutboundEvent::ElicitationPrompt { .. } => "elicitation",
            OutboundEvent::AssistantReply(_) => "assistant",
            OutboundEvent::Error(_) => "error",
        }
    }
}
