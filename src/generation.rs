//! Backend-agnostic text generation with a bounded retry policy.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

/// Shown (and persisted) whenever a prompt could not be answered.
pub const FAILURE_SENTINEL: &str = "❌ Gemini API error.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication rejected (HTTP {0})")]
    Auth(u16),
    #[error("no API key configured")]
    MissingApiKey,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response contained no text")]
    Empty,
    #[error("could not decode response: {0}")]
    Decode(String),
}

pub trait Generate: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

pub struct GenerationClient<G> {
    backend: G,
    policy: RetryPolicy,
}

impl<G: Generate> GenerationClient<G> {
    pub fn new(backend: G, policy: RetryPolicy) -> Self {
        GenerationClient { backend, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &G {
        &self.backend
    }

    /// Tries the backend up to `attempts` times, sleeping `delay` between
    /// attempts. Every error kind is retried; the last one is returned.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(attempt, attempts, prompt_len = prompt.len(), "Sending prompt");

            match self.backend.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < attempts => {
                    warn!(attempt, attempts, "Generation failed, retrying in {:?}: {e}", self.policy.delay);
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => {
                    error!(attempt, attempts, "Generation failed: {e}");
                    return Err(e);
                }
            }
        }
    }

    pub async fn generate_or_sentinel(&self, prompt: &str) -> String {
        self.generate(prompt)
            .await
            .unwrap_or_else(|_| FAILURE_SENTINEL.to_string())
    }
}
