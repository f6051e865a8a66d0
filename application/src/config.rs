//! Application-level configuration.
//!
//! Controls how chat sessions and their elicitation bridges behave.

use std::sync::Arc;
use std::time::Duration;

/// Instruction used when none is configured or the configured file is unreadable.
pub const DEFAULT_INSTRUCTION: &str = "You are an exceptionally helpful and friendly chatbot.
Your purpose is to provide concise and accurate information as requested by the user.
If a question is outside of your capabilities, politely inform the user that you are unable to help with that request.";

/// Elicitation bridge behaviour.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Maximum time a tool waits for the human. `None` waits forever.
    pub elicitation_timeout: Option<Duration>,
}

impl BridgeConfig {
    /// Creates a BridgeConfig from a timeout in seconds; `0` means no timeout.
    pub fn from_timeout_seconds(seconds: u64) -> Self {
        Self {
            elicitation_timeout: (seconds > 0).then(|| Duration::from_secs(seconds)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.elicitation_timeout = Some(timeout);
        self
    }
}

/// Per-session chat behaviour, shared by every session of a process.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub system_instruction: Arc<str>,
    pub bridge: BridgeConfig,
    /// Text of the `System` event sent when a session opens
    pub welcome: Option<String>,
    /// How long teardown lets unblocked generations finish before aborting them
    pub teardown_grace: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_instruction: Arc::from(DEFAULT_INSTRUCTION),
            bridge: BridgeConfig::default(),
            welcome: None,
            teardown_grace: Duration::from_millis(250),
        }
    }
}

impl ChatConfig {
    pub fn with_instruction(mut self, instruction: impl Into<Arc<str>>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_bridge(mut self, bridge: BridgeConfig) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = Some(welcome.into());
        self
    }

    pub fn with_teardown_grace(mut self, grace: Duration) -> Self {
        self.teardown_grace = grace;
        self
    }
}
