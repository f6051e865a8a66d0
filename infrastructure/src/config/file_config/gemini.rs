//! Gemini configuration from TOML (`[gemini]` section)

use serde::{Deserialize, Serialize};

/// Raw Gemini configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Model identifier (env `GEMINI_MODEL`)
    pub model: String,
    /// API key (env `GEMINI_API_KEY`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum function-calling rounds per generation
    pub max_tool_rounds: usize,
    /// API base URL
    pub base_url: String,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_seconds: u64,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            temperature: 0.0,
            max_tool_rounds: 8,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_seconds: 120,
        }
    }
}
