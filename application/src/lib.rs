//! Application layer for mcpbot
//!
//! This crate contains the elicitation bridge, the chat session sequencer,
//! port definitions and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BridgeConfig, ChatConfig, DEFAULT_INSTRUCTION};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    generation_gateway::{GatewayError, GenerationGateway, GenerationReply, GenerationRequest},
    session_event::{InboundEvent, OutboundEvent},
    tool_executor::{NoTools, ToolExecutorPort},
};
pub use use_cases::chat_session::{
    ChatServices, ChatSession, SessionError, SessionHandle, SessionSummary,
};
pub use use_cases::elicitation_bridge::{ElicitationBridge, SubmitStatus};
pub use use_cases::generation_task::{GenerationCompletion, GenerationOutcome, GenerationTask};
pub use use_cases::response_slot::{ResponseSlot, SlotError, SlotWaiter};
pub use use_cases::session_registry::SessionRegistry;
