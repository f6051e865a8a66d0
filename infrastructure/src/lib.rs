//! Infrastructure layer for mcpbot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Gemini generation gateway, the tool
//! registry with the built-in tools, configuration file loading and
//! the JSONL conversation logger.

pub mod config;
pub mod gemini;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileGeminiConfig,
    FileLoggingConfig, FileWebConfig,
};
pub use gemini::{GeminiGateway, GeminiSettings};
pub use logging::JsonlConversationLogger;
pub use tools::{BuiltinProvider, ToolRegistry, default_tool_spec};
