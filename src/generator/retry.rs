//! Retry wrapper with exponential backoff

use super::types::{GenerationRequest, GenerationResponse, GeneratorError, RetryPolicy, TextGenerator};
use async_trait::async_trait;

/// Wrapper that adds retry logic to any generator
pub struct RetryGenerator<T: TextGenerator> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: TextGenerator> RetryGenerator<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: TextGenerator + 'static> TextGenerator for RetryGenerator<T> {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeneratorError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() || attempt >= self.policy.max_retries => {
                    return Err(e);
                }
                Err(e) => {
                    // Server-specified retry-after wins over backoff
                    let delay = e
                        .retry_after()
                        .unwrap_or_else(|| self.policy.delay_for_attempt(attempt));

                    tracing::warn!(
                        backend = self.inner.name(),
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "generation failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }
}

/// Wrap a generator with a retry policy
pub fn with_retry<T: TextGenerator + 'static>(inner: T, policy: RetryPolicy) -> RetryGenerator<T> {
    RetryGenerator::new(inner, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Generator that fails a specified number of times before succeeding
    struct FlakyGenerator {
        calls: AtomicU32,
        fail_times: u32,
        error: GeneratorError,
    }

    impl FlakyGenerator {
        fn new(fail_times: u32, error: GeneratorError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_times,
                error,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResponse, GeneratorError> {
            let count = self.calls.fetch_add(1, Ordering::SeqCst);
            if count < self.fail_times {
                Err(self.error.clone())
            } else {
                Ok(GenerationResponse::new(
                    "success".into(),
                    "flaky".into(),
                    Duration::from_millis(1),
                ))
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
            jitter: false,
            ..Default::default()
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("test", "system", "human")
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let generator = with_retry(
            FlakyGenerator::new(2, GeneratorError::network("reset")),
            fast_policy(3),
        );

        let result = generator.generate(&request()).await;
        assert!(result.is_ok());
        assert_eq!(generator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let generator = with_retry(
            FlakyGenerator::new(10, GeneratorError::rate_limit(None)),
            fast_policy(2),
        );

        let result = generator.generate(&request()).await;
        assert!(matches!(result, Err(GeneratorError::RateLimit { .. })));
        assert_eq!(generator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_content_error() {
        let generator = with_retry(
            FlakyGenerator::new(10, GeneratorError::empty("flaky")),
            fast_policy(5),
        );

        let result = generator.generate(&request()).await;
        assert!(matches!(result, Err(GeneratorError::EmptyResponse { .. })));
        assert_eq!(generator.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let generator = with_retry(
            FlakyGenerator::new(0, GeneratorError::network("unused")),
            RetryPolicy::default(),
        );

        assert!(generator.generate(&request()).await.is_ok());
        assert_eq!(generator.name(), "flaky");
    }
}
