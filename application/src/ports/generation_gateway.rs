//! Generation gateway port
//!
//! Defines the interface to the external language-model collaborator.

use crate::ports::tool_executor::ToolExecutorPort;
use async_trait::async_trait;
use mcpbot_domain::{Message, ToolContext};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Tool-call loop exceeded {0} rounds")]
    ToolRoundsExceeded(usize),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Everything one generation call needs.
#[derive(Clone)]
pub struct GenerationRequest {
    /// Full ordered history, ending with the user message being answered
    pub history: Vec<Message>,
    pub system_instruction: Arc<str>,
    pub tools: Arc<dyn ToolExecutorPort>,
    /// Handed to every tool the model invokes
    pub tool_context: ToolContext,
}

/// Final text of a generation, to be appended to history as the assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub text: String,
}

impl GenerationReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Gateway for LLM communication
///
/// Implementations may invoke tools from `request.tools` any number of times
/// before returning; those tools may in turn suspend on an elicitation.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply, GatewayError>;
}
