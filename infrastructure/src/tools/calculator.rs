//! addition tool

use mcpbot_domain::tool::{
    entities::{ToolAnnotations, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};

/// Tool name constant
pub const ADDITION: &str = "addition";

/// Get the tool definition for addition
pub fn addition_definition() -> ToolDefinition {
    ToolDefinition::new(ADDITION, "Adds two numbers together.")
        .with_annotations(ToolAnnotations::titled("The additive tool"))
        .with_parameter(ToolParameter::new("a", "First number to add", true).with_type("number"))
        .with_parameter(ToolParameter::new("b", "Second number to add", true).with_type("number"))
}

/// Execute the addition tool
pub fn execute_addition(call: &ToolCall) -> ToolResult {
    let (a, b) = match (call.require_f64("a"), call.require_f64("b")) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            return ToolResult::failure(ADDITION, ToolError::invalid_argument(e));
        }
    };

    ToolResult::success(ADDITION, format!("The sum of {} and {} is {}", a, b, a + b))
}
