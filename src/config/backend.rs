//! Backend configuration for text generation providers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the backend used when nothing else is configured
pub const DEFAULT_BACKEND: &str = "groq";

/// Configuration for a single text generation backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Command to execute (or HTTP base URL for API backends)
    pub command: String,

    /// Arguments to pass to the command, before the prompt
    #[serde(default)]
    pub args: Vec<String>,

    /// Whether this backend is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Timeout in seconds for requests
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Model name (for API backends)
    pub model: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Sampling temperature (for API backends)
    pub temperature: Option<f32>,

    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Additional environment variables for the command
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            enabled: true,
            timeout: default_timeout(),
            model: None,
            api_key_env: None,
            temperature: None,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            env: HashMap::new(),
        }
    }
}

impl BackendConfig {
    /// Built-in Groq backend (OpenAI-compatible endpoint)
    pub fn groq() -> Self {
        Self {
            command: "https://api.groq.com/openai/v1".into(),
            model: Some("llama-3.3-70b-versatile".into()),
            api_key_env: Some("GROQ_API_KEY".into()),
            temperature: Some(0.1),
            ..Default::default()
        }
    }

    /// Returns true if this is an HTTP API backend (URL starts with http)
    pub fn is_http(&self) -> bool {
        self.command.starts_with("http://") || self.command.starts_with("https://")
    }

    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}
