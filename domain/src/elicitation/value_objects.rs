//! Elicitation value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier of one elicitation request, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElicitationId(pub u64);

impl std::fmt::Display for ElicitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "elicit-{}", self.0)
    }
}

/// Structural description of the value a tool expects back.
///
/// The answer itself is opaque; only its shape is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ExpectedShape {
    /// Any non-empty text
    Text,
    /// yes/no style answer
    Boolean,
    /// Whole number
    Integer,
    /// Any number
    Number,
    /// One of a fixed set of values (case-insensitive)
    Choice(Vec<String>),
}

impl ExpectedShape {
    /// Shape accepting `yes` or `y`, used for confirmations.
    pub fn confirmation() -> Self {
        ExpectedShape::Choice(vec!["yes".to_string(), "y".to_string()])
    }

    /// Short human-readable description, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ExpectedShape::Text => "text".to_string(),
            ExpectedShape::Boolean => "yes or no".to_string(),
            ExpectedShape::Integer => "a whole number".to_string(),
            ExpectedShape::Number => "a number".to_string(),
            ExpectedShape::Choice(values) => format!("one of: {}", values.join(", ")),
        }
    }

    /// Convert a raw reply into a value of this shape.
    pub fn convert(&self, raw: &str) -> Result<Value, AnswerConversionError> {
        let trimmed = raw.trim();
        let fail = || AnswerConversionError {
            expected: self.describe(),
            raw: raw.to_string(),
        };

        match self {
            ExpectedShape::Text => {
                if trimmed.is_empty() {
                    Err(fail())
                } else {
                    Ok(Value::String(trimmed.to_string()))
                }
            }
            ExpectedShape::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" => Ok(Value::Bool(true)),
                "no" | "n" | "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            ExpectedShape::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| fail()),
            ExpectedShape::Number => trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(fail),
            ExpectedShape::Choice(values) => values
                .iter()
                .find(|v| v.eq_ignore_ascii_case(trimmed))
                .map(|v| Value::String(v.clone()))
                .ok_or_else(fail),
        }
    }
}

/// What a tool asks the human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElicitationPrompt {
    pub message: String,
    pub shape: ExpectedShape,
}

impl ElicitationPrompt {
    pub fn new(message: impl Into<String>, shape: ExpectedShape) -> Self {
        Self {
            message: message.into(),
            shape,
        }
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::new(message, ExpectedShape::Text)
    }
}

/// Declared intent of a raw reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerIntent {
    Accept,
    Decline,
}

impl AnswerIntent {
    /// Infer intent from reply text: `cancel` or `decline` decline, anything else accepts.
    pub fn infer(text: &str) -> Self {
        let lowered = text.trim().to_ascii_lowercase();
        if lowered == "cancel" || lowered == "decline" {
            AnswerIntent::Decline
        } else {
            AnswerIntent::Accept
        }
    }

    /// Parse an explicit action string (`accept`, `decline`, `cancel`).
    pub fn from_action(action: &str) -> Result<Self, DomainError> {
        match action.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(AnswerIntent::Accept),
            "decline" | "cancel" => Ok(AnswerIntent::Decline),
            other => Err(DomainError::UnknownAction(other.to_string())),
        }
    }
}

/// Why a pending elicitation was aborted rather than answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// The remote peer disconnected.
    Disconnected,
    /// The session was torn down (fatal error or shutdown).
    SessionClosed,
    /// The prompt could not be delivered to the transport.
    TransportClosed,
    /// No answer arrived within the configured timeout.
    TimedOut,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AbortReason::Disconnected => "client disconnected",
            AbortReason::SessionClosed => "session closed",
            AbortReason::TransportClosed => "transport closed",
            AbortReason::TimedOut => "timed out waiting for an answer",
        };
        f.write_str(text)
    }
}

/// Final result of one elicitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum ElicitationOutcome {
    /// The human supplied a value of the expected shape.
    Answered(Value),
    /// The human explicitly declined.
    Declined,
    /// The connection died or the session went away first.
    Aborted(AbortReason),
}

impl ElicitationOutcome {
    /// MCP elicitation action name for this outcome.
    pub fn action(&self) -> &'static str {
        match self {
            ElicitationOutcome::Answered(_) => "accept",
            ElicitationOutcome::Declined => "decline",
            ElicitationOutcome::Aborted(_) => "cancel",
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, ElicitationOutcome::Answered(_))
    }

    pub fn answer(&self) -> Option<&Value> {
        match self {
            ElicitationOutcome::Answered(value) => Some(value),
            _ => None,
        }
    }
}

/// A reply did not match the expected shape.
///
/// Reported back to the transport; the pending request stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid answer {raw:?}: expected {expected}")]
pub struct AnswerConversionError {
    pub expected: String,
    pub raw: String,
}

/// Errors returned to tool code by an elicitation request.
///
/// Declines and aborts are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElicitationError {
    #[error("Another elicitation is already pending for this session")]
    ConcurrentElicitationRejected,
}
