//! JSON frames of the browser chat protocol
//!
//! ```text
//! client → server   {"type":"message","message":"roll 3 dice"}
//!                   {"type":"elicitation_response","message":"y","action":"accept"}
//!                   {"type":"reset"}
//! server → client   {"type":"system"|"user"|"thinking"|"elicitation"|"assistant"|"error",
//!                    "message":"..."}
//! ```

use mcpbot_application::{InboundEvent, OutboundEvent};
use mcpbot_domain::AnswerIntent;
use serde::{Deserialize, Serialize};

/// Text shown while a generation runs
pub const THINKING_TEXT: &str = "Gemini is thinking...";

/// Frame sent by the browser
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Message {
        message: String,
    },
    ElicitationResponse {
        message: String,
        /// `accept`, `decline` or `cancel`; inferred from the text when absent
        #[serde(default)]
        action: Option<String>,
    },
    Reset,
}

impl ClientFrame {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Malformed frame: {}", e))
    }

    /// Session event for this frame.
    pub fn into_inbound(self) -> Result<InboundEvent, String> {
        match self {
            ClientFrame::Message { message } => Ok(InboundEvent::UserMessage(message)),
            ClientFrame::ElicitationResponse {
                message,
                action: None,
            } => Ok(InboundEvent::answer(message)),
            ClientFrame::ElicitationResponse {
                message,
                action: Some(action),
            } => {
                let intent = AnswerIntent::from_action(&action).map_err(|e| e.to_string())?;
                Ok(InboundEvent::ElicitationAnswer {
                    text: message,
                    intent,
                })
            }
            ClientFrame::Reset => Ok(InboundEvent::Reset),
        }
    }
}

/// Frame sent to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

impl ServerFrame {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&OutboundEvent> for ServerFrame {
    fn from(event: &OutboundEvent) -> Self {
        let message = match event {
            OutboundEvent::System(text)
            | OutboundEvent::AssistantReply(text)
            | OutboundEvent::Error(text) => text.clone(),
            OutboundEvent::Echo { text, .. } => text.clone(),
            OutboundEvent::Thinking => THINKING_TEXT.to_string(),
            OutboundEvent::ElicitationPrompt { message, .. } => message.clone(),
        };
        Self {
            kind: event.kind(),
            message,
        }
    }
}
