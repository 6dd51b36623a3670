//! Core types and traits for text generation

use crate::config::BackendConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Error types that can occur while generating text
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    /// Request timed out
    #[error("timeout after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Rate limited by the provider
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit { retry_after: Option<Duration> },

    /// Authentication failed
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Network error
    #[error("network error: {message}")]
    Network { message: String },

    /// Response could not be parsed
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Backend answered with no usable text
    #[error("empty response from {backend}")]
    EmptyResponse { backend: String },

    /// Command execution failed
    #[error("execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Backend unavailable
    #[error("backend unavailable: {message}")]
    Unavailable { message: String },

    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl GeneratorError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneratorError::Timeout { .. }
                | GeneratorError::RateLimit { .. }
                | GeneratorError::Network { .. }
        )
    }

    /// Get suggested retry delay for rate limit errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GeneratorError::RateLimit { retry_after } => *retry_after,
            _ => None,
        }
    }

    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }

    pub fn rate_limit(retry_after: Option<Duration>) -> Self {
        Self::RateLimit { retry_after }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn empty(backend: impl Into<String>) -> Self {
        Self::EmptyResponse {
            backend: backend.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Response from a generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,

    /// Backend that produced this response
    pub backend: String,

    /// Model used (if known)
    pub model: Option<String>,

    /// Time taken to generate
    pub duration: Duration,

    /// Token usage (if available)
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl GenerationResponse {
    pub fn new(text: String, backend: String, duration: Duration) -> Self {
        Self {
            text,
            backend,
            model: None,
            duration,
            usage: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A rendered prompt: system instruction plus the human trigger line
///
/// `variables` keeps the placeholder values the system text was rendered
/// from so callers and test doubles can inspect what went into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Name of the template this request was rendered from
    pub template: String,

    /// Placeholder values substituted into the template
    pub variables: BTreeMap<String, String>,

    /// System-role instruction text
    pub system: String,

    /// Human-role trigger text
    pub human: String,
}

impl GenerationRequest {
    pub fn new(
        template: impl Into<String>,
        system: impl Into<String>,
        human: impl Into<String>,
    ) -> Self {
        Self {
            template: template.into(),
            variables: BTreeMap::new(),
            system: system.into(),
            human: human.into(),
        }
    }

    /// Attach the variables the prompt was rendered from
    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    /// Look up a substituted variable
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// System and human text joined, for backends without message roles
    pub fn flattened(&self) -> String {
        format!("{}\n\n{}", self.system, self.human)
    }
}

/// Something that turns a structured prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a request
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeneratorError>;

    /// Get the generator name
    fn name(&self) -> &str;

    /// Check if this generator is reachable
    async fn is_available(&self) -> bool {
        true
    }
}

#[async_trait]
impl TextGenerator for Box<dyn TextGenerator> {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeneratorError> {
        (**self).generate(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }
}

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries
    pub max_retries: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,

    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Create a policy from backend config
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_delay_ms),
            ..Default::default()
        }
    }

    /// Calculate delay for a given attempt number
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            // Up to 25% jitter
            let jitter = rand::random::<f64>() * 0.25 * capped_delay;
            capped_delay + jitter
        } else {
            capped_delay
        };

        Duration::from_secs_f64(final_delay)
    }
}
