//! Configuration file loading for mcpbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables (`GEMINI_API_KEY`, `GEMINI_MODEL`, `INSTRUCTION_PATH`, `LOG_FOLDER_PATH`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./mcpbot.toml` or `./.mcpbot.toml`
//! 4. Global: `$XDG_CONFIG_HOME/mcpbot/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileChatConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileWebConfig,
};
pub use loader::ConfigLoader;
