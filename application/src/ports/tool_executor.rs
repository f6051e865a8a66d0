//! Tool Executor port
//!
//! Defines the interface for executing tools on behalf of a generation.

use async_trait::async_trait;
use mcpbot_domain::tool::{
    context::ToolContext,
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResult,
};

/// Port for tool execution
///
/// This port defines how the application layer executes tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Execute a tool call.
    ///
    /// May suspend for as long as a human takes to answer an elicitation
    /// raised through `ctx`.
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult;
}

/// Executor with no tools, for sessions that only chat.
#[derive(Debug, Default)]
pub struct NoTools {
    spec: ToolSpec,
}

#[async_trait]
impl ToolExecutorPort for NoTools {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall, _ctx: &ToolContext) -> ToolResult {
        ToolResult::failure(
            &call.tool_name,
            mcpbot_domain::ToolError::not_found(&call.tool_name),
        )
    }
}
