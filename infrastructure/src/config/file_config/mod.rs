//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types at the edge.

mod chat;
mod gemini;
mod logging;
mod web;

pub use chat::FileChatConfig;
pub use gemini::FileGeminiConfig;
pub use logging::FileLoggingConfig;
pub use web::FileWebConfig;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("gemini.model cannot be empty")]
    EmptyModelName,

    #[error("gemini.temperature must be non-negative, got {0}")]
    NegativeTemperature(f32),

    #[error("gemini.max_tool_rounds cannot be 0")]
    ZeroToolRounds,

    #[error("web.bind is not a socket address: {0:?}")]
    InvalidBindAddress(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Language model settings
    pub gemini: FileGeminiConfig,
    /// Session and elicitation settings
    pub chat: FileChatConfig,
    /// Web front end settings
    pub web: FileWebConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration.
    ///
    /// `require_api_key` is set when the Gemini gateway is actually going to be used.
    pub fn validate(&self, require_api_key: bool) -> Result<(), ConfigValidationError> {
        if require_api_key
            && self
                .gemini
                .api_key
                .as_deref()
                .is_none_or(|k| k.trim().is_empty())
        {
            return Err(ConfigValidationError::MissingApiKey);
        }
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.gemini.temperature < 0.0 {
            return Err(ConfigValidationError::NegativeTemperature(
                self.gemini.temperature,
            ));
        }
        if self.gemini.max_tool_rounds == 0 {
            return Err(ConfigValidationError::ZeroToolRounds);
        }
        self.bind_addr()?;
        Ok(())
    }

    /// Parsed `[web] bind` address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        self.web
            .bind
            .parse()
            .map_err(|_| ConfigValidationError::InvalidBindAddress(self.web.bind.clone()))
    }
}
