//! Domain layer for mcpbot
//!
//! This crate contains the core entities and value objects shared by every
//! front end. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! A [`History`] is the ordered, role-tagged list of [`Message`]s a session
//! sends to the language model on every turn.
//!
//! ## Elicitation
//!
//! An elicitation is a request from tool code for a piece of information
//! that only the human at the other end of the connection can supply.
//! Tools describe what they want with an [`ElicitationPrompt`] and receive
//! exactly one [`ElicitationOutcome`]: answered, declined or aborted.
//!
//! ## Tools
//!
//! Tools are described by a [`ToolSpec`], invoked with a [`ToolCall`] and
//! report a [`ToolResult`]. Every call gets a [`ToolContext`] carrying the
//! session's [`Elicitor`].

pub mod conversation;
pub mod core;
pub mod elicitation;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use conversation::{History, Message, Role};
pub use core::error::DomainError;
pub use elicitation::{
    elicitor::{AutoDeclineElicitor, Elicitor},
    value_objects::{
        AbortReason, AnswerConversionError, AnswerIntent, ElicitationError, ElicitationId,
        ElicitationOutcome, ElicitationPrompt, ExpectedShape,
    },
};
pub use session::{GenerationId, SessionId};
pub use tool::{
    context::ToolContext,
    entities::{ToolAnnotations, ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    provider::{ProviderError, ToolProvider},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult},
};
