//! Configuration types for Parley.
//!
//! `ParleyConfig` is the top-level `config.toml` plus environment overrides.
//! Every field has a default so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite URL. Defaults to `{data_dir}/parley.db` when unset.
    #[serde(default)]
    pub database_url: Option<String>,
}

/// LLM provider settings shared by the primary and secondary tiers.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API credential. Absent means both network tiers are skipped.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Output-length cap sent with every completion request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_primary_timeout_secs")]
    pub primary_timeout_secs: u64,

    #[serde(default = "default_secondary_timeout_secs")]
    pub secondary_timeout_secs: u64,
}

// The API key never appears in Debug output.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("primary_timeout_secs", &self.primary_timeout_secs)
            .field("secondary_timeout_secs", &self.secondary_timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// The API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_primary_timeout_secs() -> u64 {
    60
}

fn default_secondary_timeout_secs() -> u64 {
    20
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            primary_timeout_secs: default_primary_timeout_secs(),
            secondary_timeout_secs: default_secondary_timeout_secs(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// The single cross-origin caller allowed by CORS.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
        }
    }
}
