//! Tool routing across providers
//!
//! [`ToolRegistry`] is the [`ToolExecutorPort`] handed to the chat session.
//! It asks every provider for its tools once, at startup, and remembers which
//! provider answers for each name. Providers are asked in descending
//! [`ToolProvider::priority`] order and the first one to offer a name owns it,
//! so a provider registered later with a higher priority shadows a built-in.
//!
//! ```ignore
//! let mut tools = ToolRegistry::new().register(BuiltinProvider::new());
//! let count = tools.discover().await;
//! let result = tools.execute(&ToolCall::new("roll_dice"), &ctx).await;
//! ```

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mcpbot_application::ports::tool_executor::ToolExecutorPort;
use mcpbot_domain::tool::{
    context::ToolContext,
    entities::{ToolCall, ToolSpec},
    provider::ToolProvider,
    value_objects::{ToolError, ToolResult},
};
use tracing::{debug, warn};

#[derive(Default)]
pub struct ToolRegistry {
    providers: Vec<Arc<dyn ToolProvider>>,
    spec: ToolSpec,
    /// Position in `providers` of each tool's owner; `None` until discovery
    owners: Option<HashMap<String, usize>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider. Any earlier discovery is discarded.
    pub fn register<P: ToolProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self.spec = ToolSpec::new();
        self.owners = None;
        self
    }

    /// Build the merged tool list and return how many tools it holds.
    ///
    /// Unavailable providers and providers whose listing fails contribute
    /// nothing; the rest of the registry still works.
    pub async fn discover(&mut self) -> usize {
        // Stable, so equal priorities keep registration order
        self.providers.sort_by_key(|p| Reverse(p.priority()));

        let mut spec = ToolSpec::new();
        let mut owners = HashMap::new();
        for (index, provider) in self.providers.iter().enumerate() {
            if !provider.is_available().await {
                debug!(provider = provider.id(), "Skipping unavailable provider");
                continue;
            }
            let tools = match provider.discover_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    warn!(provider = provider.id(), error = %e, "Tool listing failed");
                    continue;
                }
            };
            for tool in tools {
                if owners.contains_key(&tool.name) {
                    debug!(tool = %tool.name, provider = provider.id(), "Shadowed");
                    continue;
                }
                owners.insert(tool.name.clone(), index);
                spec = spec.register(tool);
            }
        }

        let count = owners.len();
        self.spec = spec;
        self.owners = Some(owners);
        count
    }

    /// Id of the provider that answers for `tool`.
    pub fn owner_of(&self, tool: &str) -> Option<&str> {
        self.owner(tool).map(|p| p.id())
    }

    fn owner(&self, tool: &str) -> Option<&Arc<dyn ToolProvider>> {
        let index = *self.owners.as_ref()?.get(tool)?;
        self.providers.get(index)
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        if self.owners.is_none() {
            return ToolResult::failure(
                &call.tool_name,
                ToolError::execution_failed("Tools have not been discovered yet"),
            );
        }
        match self.owner(&call.tool_name) {
            Some(provider) => provider.execute(call, ctx).await,
            None => ToolResult::failure(
                &call.tool_name,
                ToolError::not_found(format!("tool {}", call.tool_name)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::{BUILTIN_PRIORITY, BuiltinProvider};
    use mcpbot_domain::tool::{entities::ToolDefinition, provider::ProviderError};

    /// Offers `addition` (always "42") and `coin_flip`.
    struct OverrideProvider {
        priority: i32,
        available: bool,
    }

    #[async_trait]
    impl ToolProvider for OverrideProvider {
        fn id(&self) -> &str {
            "override"
        }

        fn display_name(&self) -> &str {
            "Override"
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
            Ok(vec![
                ToolDefinition::new("addition", "Always 42"),
                ToolDefinition::new("coin_flip", "Heads"),
            ])
        }

        async fn execute(&self, call: &ToolCall, _ctx: &ToolContext) -> ToolResult {
            ToolResult::success(&call.tool_name, "42")
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl ToolProvider for BrokenProvider {
        fn id(&self) -> &str {
            "broken"
        }

        fn display_name(&self) -> &str {
            "Broken"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
            Err(ProviderError::DiscoveryFailed("listing timed out".into()))
        }

        async fn execute(&self, call: &ToolCall, _ctx: &ToolContext) -> ToolResult {
            ToolResult::success(&call.tool_name, "unreachable")
        }
    }

    async fn builtin_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new().register(BuiltinProvider::new());
        registry.discover().await;
        registry
    }

    #[tokio::test]
    async fn test_builtin_tools_are_routed() {
        let registry = builtin_registry().await;

        assert!(registry.has_tool("roll_dice"));
        assert_eq!(registry.owner_of("addition"), Some("builtin"));

        let call = ToolCall::new("addition").with_arg("a", 40).with_arg("b", 2);
        let result = registry.execute(&call, &ToolContext::detached()).await;
        assert_eq!(result.output_text(), Some("The sum of 40 and 2 is 42"));
    }

    #[tokio::test]
    async fn test_discover_counts_tools() {
        let mut registry = ToolRegistry::new().register(BuiltinProvider::new());
        assert_eq!(
            registry.discover().await,
            crate::tools::default_tool_spec().len()
        );
    }

    #[tokio::test]
    async fn test_context_reaches_tool() {
        let registry = builtin_registry().await;

        // A detached context declines every elicitation
        let call = ToolCall::new("roll_dice").with_arg("n_dice", 2);
        let result = registry.execute(&call, &ToolContext::detached()).await;

        assert_eq!(result.error().unwrap().code, "NOT_PERFORMED");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let registry = builtin_registry().await;

        let result = registry
            .execute(&ToolCall::new("unknown_tool"), &ToolContext::detached())
            .await;

        assert_eq!(result.error().unwrap().code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_execute_before_discovery_fails() {
        let registry = ToolRegistry::new().register(BuiltinProvider::new());

        let call = ToolCall::new("addition").with_arg("a", 1).with_arg("b", 1);
        let result = registry.execute(&call, &ToolContext::detached()).await;

        assert!(result.error().unwrap().message.contains("not been discovered"));
    }

    #[tokio::test]
    async fn test_higher_priority_shadows_builtin() {
        let mut registry = ToolRegistry::new()
            .register(BuiltinProvider::new())
            .register(OverrideProvider {
                priority: 10,
                available: true,
            });
        registry.discover().await;

        assert_eq!(registry.owner_of("addition"), Some("override"));
        assert_eq!(registry.owner_of("roll_dice"), Some("builtin"));
        let result = registry
            .execute(&ToolCall::new("addition"), &ToolContext::detached())
            .await;
        assert_eq!(result.output_text(), Some("42"));
    }

    #[tokio::test]
    async fn test_lower_priority_only_fills_gaps() {
        let mut registry = ToolRegistry::new()
            .register(OverrideProvider {
                priority: BUILTIN_PRIORITY - 1,
                available: true,
            })
            .register(BuiltinProvider::new());
        registry.discover().await;

        assert_eq!(registry.owner_of("addition"), Some("builtin"));
        assert_eq!(registry.owner_of("coin_flip"), Some("override"));
    }

    #[tokio::test]
    async fn test_unavailable_and_failing_providers_are_skipped() {
        let mut registry = ToolRegistry::new()
            .register(BrokenProvider)
            .register(OverrideProvider {
                priority: 10,
                available: false,
            })
            .register(BuiltinProvider::new());

        assert_eq!(
            registry.discover().await,
            crate::tools::default_tool_spec().len()
        );
        assert_eq!(registry.owner_of("coin_flip"), None);
        assert_eq!(registry.owner_of("addition"), Some("builtin"));
    }

    #[tokio::test]
    async fn test_register_discards_discovery() {
        let registry = builtin_registry().await.register(BrokenProvider);

        let result = registry
            .execute(&ToolCall::new("roll_dice"), &ToolContext::detached())
            .await;
        assert_eq!(result.error().unwrap().code, "EXECUTION_FAILED");
        assert!(!registry.has_tool("roll_dice"));
    }
}
