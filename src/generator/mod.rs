//! Text generation backends
//!
//! Provides generators for HTTP chat-completion APIs and local CLI model
//! runners, with retry logic for transient failures.
//!
//! # Example
//!
//! ```ignore
//! use trip_planner::generator::{create_generator, GenerationRequest};
//!
//! let generator = create_generator("groq", &BackendConfig::groq())?;
//! let request = GenerationRequest::new("local_tips", "Share tips for Lisbon.", "What are the best local tips?");
//! let response = generator.generate(&request).await?;
//! println!("{}", response.text);
//! ```

mod cli_backend;
mod http_backend;
mod retry;
#[cfg(test)]
pub mod testing;
mod types;

pub use types::{GenerationRequest, GeneratorError, TextGenerator};

use cli_backend::CliBackend;
use http_backend::HttpBackend;
use retry::with_retry;
use types::RetryPolicy;

use crate::config::BackendConfig;
use std::sync::Arc;

/// Create a generator for a backend config, wrapped with its retry policy
pub fn create_generator(
    name: &str,
    config: &BackendConfig,
) -> Result<Arc<dyn TextGenerator>, GeneratorError> {
    if !config.enabled {
        return Err(GeneratorError::config(format!("backend '{}' is disabled", name)));
    }

    let policy = RetryPolicy::from_config(config);
    let inner: Box<dyn TextGenerator> = if config.is_http() {
        Box::new(HttpBackend::from_config(name, config)?)
    } else {
        Box::new(CliBackend::from_config(name, config))
    };

    Ok(Arc::new(with_retry(inner, policy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cli_generator() {
        let config = BackendConfig {
            command: "ollama".into(),
            ..Default::default()
        };

        let generator = create_generator("local", &config).unwrap();
        assert_eq!(generator.name(), "local");
    }

    #[test]
    fn test_create_http_generator() {
        let generator = create_generator("groq", &BackendConfig::groq()).unwrap();
        assert_eq!(generator.name(), "groq");
    }

    #[test]
    fn test_disabled_backend_rejected() {
        let config = BackendConfig {
            command: "ollama".into(),
            enabled: false,
            ..Default::default()
        };

        let result = create_generator("local", &config);
        assert!(matches!(result, Err(GeneratorError::Config { .. })));
    }
}
