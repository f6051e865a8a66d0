//! Web front end configuration from TOML (`[web]` section)

use serde::{Deserialize, Serialize};

/// Raw web configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileWebConfig {
    /// Socket address the HTTP server binds to
    pub bind: String,
}

impl Default for FileWebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}
