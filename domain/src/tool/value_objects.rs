//! Tool domain value objects - immutable result and error types
//!
//! Every tool execution produces a [`ToolResult`]. Failures are values
//! carrying a [`ToolError`], never panics or `Err`s, so a broken tool can
//! only ever spoil its own call.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Error that occurred during tool execution.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing/wrong parameters - the model can fix |
/// | `NOT_FOUND` | Unknown tool or resource |
/// | `EXECUTION_FAILED` | Runtime failure (HTTP error, bad upstream data) |
/// | `NOT_PERFORMED` | The human declined, or the session went away |
/// | `BUSY` | Another elicitation is already pending |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "NOT_PERFORMED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn not_performed(message: impl Into<String>) -> Self {
        Self::new("NOT_PERFORMED", message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::new("BUSY", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution, carrying output or error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    /// Create a successful text result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self::json(tool_name, Value::String(output.into()))
    }

    /// Create a successful structured result
    pub fn json(tool_name: impl Into<String>, output: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output),
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
        }
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the output as text, if it is a plain string
    pub fn output_text(&self) -> Option<&str> {
        self.output.as_ref().and_then(|v| v.as_str())
    }

    /// Get the error
    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// JSON object handed back to the model as the function response.
    pub fn to_response_json(&self) -> Value {
        match (&self.output, &self.error) {
            (Some(output), _) if self.success => json!({ "result": output }),
            (_, Some(error)) => json!({
                "error": {
                    "code": error.code,
                    "message": error.message,
                    "details": error.details,
                }
            }),
            _ => json!({ "result": Value::Null }),
        }
    }
}
