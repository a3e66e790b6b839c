//! Global configuration model.
//!
//! Loaded from `config.toml` by `opsforge-infra::config`; every field has a
//! serde default so a missing or partial file still yields a usable config.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on retained sessions; oldest evicted past this.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default)]
    pub bedrock: BedrockConfig,
}

/// Bedrock gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_sessions() -> usize {
    500
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout_secs() -> u64 {
    45
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f64 {
    0.2
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
            bedrock: BedrockConfig::default(),
        }
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            region: default_region(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}
