//! Chat-completion client with bounded retry on rate limits.
//!
//! This module provides the interface to an OpenAI-compatible
//! chat-completion API. It includes automatic retry with exponential
//! backoff and jitter, applied only to rate-limit failures.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`ChatModel`]: core trait defining async generation
//! - [`OpenAiChat`]: speaks the `/chat/completions` wire format
//! - [`RetryChat`]: decorator that adds retry logic to any `ChatModel`
//!
//! # Retry Strategy
//!
//! Only [`GenerationError::RateLimited`] is retried; every other failure
//! (bad request, auth, network unreachable) is structural and propagates
//! immediately. The attempt budget is exact: a client configured with
//! `retries = 3` issues at most 3 requests before failing with
//! [`GenerationError::Exhausted`]. Delay between attempts doubles from the
//! base, is capped at 30 seconds, and carries 0-250ms of random jitter.

use rand::{Rng, rng};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Failures surfaced by the generation service.
///
/// `RateLimited` is the one transient kind; [`RetryChat`] converts a run
/// of them into `Exhausted`, which is fatal for the current pipeline
/// attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("rate limited by the generation service")]
    RateLimited,
    #[error("generation service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("request to the generation service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned no content")]
    EmptyResponse,
    #[error("generation gave up after {attempts} rate-limited attempts")]
    Exhausted { attempts: usize },
}

/// Trait for async text generation.
///
/// Implementors send a single system-role prompt to a model and return the
/// generated text. The abstraction exists so the retry decorator and tests
/// can stand in for the real API.
pub trait ChatModel {
    async fn ask(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
///
/// Sends the prompt as a single system-role message and returns the first
/// choice's content. HTTP 429 is reported as
/// [`GenerationError::RateLimited`] so the retry layer can tell throttling
/// apart from structural failures.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

impl ChatModel for OpenAiChat {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        let t0 = Instant::now();
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "system", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, "API rate limited");
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %message, "API call failed");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = text.len(),
            "API call succeeded"
        );
        Ok(text)
    }
}

/// Wrapper that adds bounded rate-limit retry to any [`ChatModel`].
///
/// # Backoff
///
/// The delay before attempt `n + 1` follows:
/// ```text
/// delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryChat<T> {
    inner: T,
    /// Total attempt budget, including the first attempt. At least 1.
    retries: usize,
    /// Initial delay between attempts (doubles each time).
    base_delay: Duration,
    /// Delay cap.
    max_delay: Duration,
}

impl<T> RetryChat<T>
where
    T: ChatModel,
{
    pub fn new(inner: T, retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            retries: retries.max(1),
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> ChatModel for RetryChat<T>
where
    T: ChatModel,
{
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        let total_t0 = Instant::now();

        for attempt in 1..=self.retries {
            match self.inner.ask(prompt).await {
                Ok(text) => return Ok(text),
                Err(GenerationError::RateLimited) => {
                    if attempt == self.retries {
                        break;
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.retries,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        ?delay,
                        "rate limited; backing off"
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        attempt,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        error = %e,
                        "non-retryable generation failure"
                    );
                    return Err(e);
                }
            }
        }

        error!(
            attempts = self.retries,
            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
            "generation exhausted its retry budget"
        );
        Err(GenerationError::Exhausted {
            attempts: self.retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails every call with a scripted error kind, counting calls.
    struct ScriptedChat {
        calls: AtomicUsize,
        rate_limited_first: usize,
        then: fn() -> Result<String, GenerationError>,
    }

    impl ScriptedChat {
        fn rate_limited_forever() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rate_limited_first: usize::MAX,
                then: || Ok(String::new()),
            }
        }

        fn rate_limited_then_ok(n: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rate_limited_first: n,
                then: || Ok("generated text".to_string()),
            }
        }

        fn structural_failure() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rate_limited_first: 0,
                then: || {
                    Err(GenerationError::Api {
                        status: 401,
                        message: "bad key".to_string(),
                    })
                },
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatModel for &ScriptedChat {
        async fn ask(&self, _prompt: &str) -> Result<String, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.rate_limited_first {
                Err(GenerationError::RateLimited)
            } else {
                (self.then)()
            }
        }
    }

    #[tokio::test]
    async fn test_exhausts_after_exactly_three_attempts() {
        let inner = ScriptedChat::rate_limited_forever();
        let api = RetryChat::new(&inner, 3, Duration::ZERO);

        let err = api.ask("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Exhausted { attempts: 3 }));
        // A fourth call never happens.
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_recovers_within_budget() {
        let inner = ScriptedChat::rate_limited_then_ok(2);
        let api = RetryChat::new(&inner, 3, Duration::ZERO);

        let text = api.ask("prompt").await.unwrap();
        assert_eq!(text, "generated text");
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_structural_failure_is_not_retried() {
        let inner = ScriptedChat::structural_failure();
        let api = RetryChat::new(&inner, 5, Duration::ZERO);

        let err = api.ask("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 401, .. }));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_clamps_to_one_attempt() {
        let inner = ScriptedChat::rate_limited_forever();
        let api = RetryChat::new(&inner, 0, Duration::ZERO);

        let err = api.ask("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Exhausted { attempts: 1 }));
        assert_eq!(inner.calls(), 1);
    }
}
