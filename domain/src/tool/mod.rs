//! Tool domain module
//!
//! Tools are the stateless request/response plugins the language model can
//! invoke during a generation. A few of them (the dice roller, for one) stop
//! half-way and ask the human for confirmation through the [`Elicitor`]
//! carried in their [`ToolContext`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ + ToolContext│    │ (output)     │
//! └──────────────┘    └──────┬───────┘    └──────────────┘
//!                            │
//!                            └─ elicitor.elicit(prompt) ─▶ human
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`] - registry of available tool definitions
//! - [`ToolDefinition`] - schema for a single tool (name, params, annotations)
//! - [`ToolCall`] - an invocation request with arguments
//! - [`ToolResult`] - execution outcome, success or [`ToolError`]
//! - [`ToolProvider`] - a pluggable source of tools
//!
//! [`Elicitor`]: crate::elicitation::Elicitor

pub mod context;
pub mod entities;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use context::ToolContext;
pub use entities::{ToolAnnotations, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use provider::{ProviderError, ToolProvider};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult};
