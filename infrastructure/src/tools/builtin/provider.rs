//! Built-in tool provider
//!
//! In-process tools shipped with the bot: the dice roller (which asks the
//! human for confirmation), addition, and with `web-tools` the weather lookup.

use async_trait::async_trait;
use mcpbot_domain::tool::{
    DefaultToolValidator, ToolValidator,
    context::ToolContext,
    entities::{ToolCall, ToolDefinition, ToolSpec},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult},
};

use crate::tools::{calculator, dice};

#[cfg(feature = "web-tools")]
use crate::tools::weather;

/// Priority for the built-in provider (lowest, used as fallback)
pub const BUILTIN_PRIORITY: i32 = -100;

/// Built-in tool provider
#[derive(Debug, Clone)]
pub struct BuiltinProvider {
    /// Available tools
    tool_spec: ToolSpec,
    /// HTTP client for web tools (only available with web-tools feature)
    #[cfg(feature = "web-tools")]
    http_client: reqwest::Client,
}

impl BuiltinProvider {
    /// Create a new built-in provider with all tools
    pub fn new() -> Self {
        Self {
            tool_spec: crate::tools::default_tool_spec(),
            #[cfg(feature = "web-tools")]
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Falling back to default HTTP client");
                    reqwest::Client::new()
                }),
        }
    }

    async fn execute_internal(
        &self,
        call: &ToolCall,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ProviderError> {
        let definition = self
            .tool_spec
            .get(&call.tool_name)
            .ok_or_else(|| ProviderError::ToolNotFound(call.tool_name.clone()))?;

        let validator = DefaultToolValidator;
        if let Err(e) = validator.validate(call, definition) {
            return Ok(ToolResult::failure(
                &call.tool_name,
                ToolError::invalid_argument(e),
            ));
        }

        let result = match call.tool_name.as_str() {
            dice::ROLL_DICE => dice::execute_roll_dice(call, ctx).await,
            calculator::ADDITION => calculator::execute_addition(call),
            #[cfg(feature = "web-tools")]
            weather::GET_WEATHER => weather::execute_get_weather(&self.http_client, call).await,
            _ => {
                return Err(ProviderError::ToolNotFound(call.tool_name.clone()));
            }
        };

        Ok(result)
    }
}

impl Default for BuiltinProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProvider for BuiltinProvider {
    fn id(&self) -> &str {
        "builtin"
    }

    fn display_name(&self) -> &str {
        "Built-in Tools"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(self.tool_spec.all().cloned().collect())
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        match self.execute_internal(call, ctx).await {
            Ok(result) => result,
            Err(ProviderError::ToolNotFound(name)) => {
                ToolResult::failure(&call.tool_name, ToolError::not_found(name))
            }
            Err(e) => ToolResult::failure(&call.tool_name, ToolError::execution_failed(e.to_string())),
        }
    }
}
