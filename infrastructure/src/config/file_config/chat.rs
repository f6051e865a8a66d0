//! Chat configuration from TOML (`[chat]` section)

use mcpbot_application::{BridgeConfig, ChatConfig, DEFAULT_INSTRUCTION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileChatConfig {
    /// File holding the system instruction (env `INSTRUCTION_PATH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_path: Option<PathBuf>,
    /// How long a tool waits for an answer; 0 waits forever
    pub elicitation_timeout_seconds: u64,
    /// Grace period for generations during session teardown
    pub teardown_grace_ms: u64,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            instruction_path: None,
            elicitation_timeout_seconds: 0,
            teardown_grace_ms: 250,
        }
    }
}

impl FileChatConfig {
    /// Read the configured instruction, falling back to the built-in one.
    pub fn load_instruction(&self) -> String {
        let Some(path) = &self.instruction_path else {
            return DEFAULT_INSTRUCTION.to_string();
        };
        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(path = %path.display(), "Instruction file is empty, using default");
                DEFAULT_INSTRUCTION.to_string()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read instruction file, using default");
                DEFAULT_INSTRUCTION.to_string()
            }
        }
    }

    /// Application-level chat configuration.
    pub fn to_chat_config(&self) -> ChatConfig {
        ChatConfig::default()
            .with_instruction(self.load_instruction())
            .with_bridge(BridgeConfig::from_timeout_seconds(
                self.elicitation_timeout_seconds,
            ))
            .with_teardown_grace(Duration::from_millis(self.teardown_grace_ms))
    }
}
