//! Tool implementations for the chat bot
//!
//! Tools are organized into providers behind a [`ToolRegistry`], which is
//! the [`ToolExecutorPort`] a session hands to the generation gateway.
//!
//! ## Providers
//!
//! - `builtin`: in-process tools (roll_dice, addition, get_weather) - always available
//!
//! [`ToolExecutorPort`]: mcpbot_application::ports::tool_executor::ToolExecutorPort

pub mod builtin;
pub mod calculator;
pub mod dice;
#[cfg(feature = "web-tools")]
pub mod weather;

mod registry;

pub use builtin::BuiltinProvider;
pub use registry::ToolRegistry;

use mcpbot_domain::tool::entities::ToolSpec;

/// Create the default tool specification with all available tools
pub fn default_tool_spec() -> ToolSpec {
    let spec = ToolSpec::new()
        .register(dice::roll_dice_definition())
        .register(calculator::addition_definition());

    #[cfg(feature = "web-tools")]
    let spec = spec.register(weather::get_weather_definition());

    spec
}
