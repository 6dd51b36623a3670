//! HTTP API-based generator (OpenAI-compatible chat completions)

use super::types::{
    GenerationRequest, GenerationResponse, GeneratorError, TextGenerator, TokenUsage,
};
use crate::config::BackendConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Generator backed by an OpenAI-compatible chat completion API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Backend name
    name: String,

    /// Base URL for the API
    base_url: String,

    /// API key (if required)
    api_key: Option<String>,

    /// Model ID to use
    model: Option<String>,

    /// Sampling temperature
    temperature: Option<f32>,

    /// Default timeout
    timeout: Duration,

    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, GeneratorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GeneratorError::config(format!("failed to build HTTP client: {}", e)))
}

impl HttpBackend {
    /// Create a new HTTP backend from config
    pub fn from_config(name: impl Into<String>, config: &BackendConfig) -> Result<Self, GeneratorError> {
        let timeout = Duration::from_secs(config.timeout);
        Ok(Self {
            name: name.into(),
            base_url: config.command.clone(),
            api_key: config.api_key(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
            client: build_client(timeout)?,
        })
    }

    fn chat_completion_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    /// Map HTTP status to GeneratorError
    fn map_http_error(&self, status: reqwest::StatusCode, body: &str) -> GeneratorError {
        match status.as_u16() {
            401 | 403 => GeneratorError::auth(format!("HTTP {}: {}", status, body)),
            429 => GeneratorError::rate_limit(parse_retry_after(body)),
            408 | 504 => GeneratorError::timeout(self.timeout),
            400..=499 => GeneratorError::config(format!("HTTP {}: {}", status, body)),
            500..=599 => GeneratorError::network(format!("HTTP {}: {}", status, body)),
            _ => GeneratorError::network(format!("unexpected HTTP {}: {}", status, body)),
        }
    }
}

/// Try to parse retry-after seconds from an error body
fn parse_retry_after(body: &str) -> Option<Duration> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("retry_after")
        .and_then(|v| v.as_f64())
        .map(Duration::from_secs_f64)
}

#[async_trait]
impl TextGenerator for HttpBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeneratorError> {
        let start = Instant::now();

        let body = ChatCompletionRequest {
            model: self.model.as_deref().unwrap_or(DEFAULT_MODEL),
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.human,
                },
            ],
            temperature: self.temperature,
        };

        let mut http_request = self.client.post(self.chat_completion_url()).json(&body);
        if let Some(ref key) = self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        tracing::debug!(
            backend = %self.name,
            template = %request.template,
            "sending chat completion"
        );

        let result = tokio::time::timeout(self.timeout, http_request.send()).await;
        let elapsed = start.elapsed();

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return Err(GeneratorError::timeout(elapsed)),
            Ok(Err(e)) if e.is_connect() => {
                return Err(GeneratorError::network(format!("connection failed: {}", e)));
            }
            Ok(Err(e)) => return Err(GeneratorError::network(format!("request failed: {}", e))),
            Err(_) => return Err(GeneratorError::timeout(elapsed)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_http_error(status, &body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::parse(format!("failed to parse response: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GeneratorError::empty(self.name.clone()))?;

        let mut generated = GenerationResponse::new(text, self.name.clone(), start.elapsed());
        if let Some(model) = completion.model {
            generated = generated.with_model(model);
        }
        if let Some(usage) = completion.usage {
            generated = generated.with_usage(TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            });
        }

        Ok(generated)
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        match tokio::time::timeout(Duration::from_secs(5), request.send()).await {
            Ok(Ok(response)) => response.status().is_success(),
            _ => false,
        }
    }
}
