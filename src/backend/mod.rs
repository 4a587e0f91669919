//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over the completion provider, translating
//! a normalized [`LlmRequest`] into a provider-specific HTTP call and back
//! into an [`LlmResponse`] holding nothing but the reply text and metadata.
//!
//! ```text
//! ShoppingListGenerator ──► LlmRequest ──► with_backoff ──► Backend::complete() ──► LlmResponse
//!                                                               │
//!                                                    ┌──────────┴──────────┐
//!                                              OpenAiBackend           MockBackend
//!                                          /v1/chat/completions      canned replies
//! ```

pub mod backoff;
pub mod mock;
pub mod openai;

pub use backoff::{BackoffConfig, JitterStrategy};
pub use mock::MockBackend;
pub use openai::OpenAiBackend;

use crate::config::LlmConfig;
use crate::error::{Result, ShoppingListError};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Type alias for the callback invoked before each transport retry.
///
/// Arguments: `(attempt_number, delay_before_retry, reason_for_retry)`.
pub type RetryCallback<'a> = Option<&'a mut (dyn FnMut(u32, Duration, &str) + Send)>;

/// A normalized completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model identifier (e.g. `"gpt-3.5-turbo"`).
    pub model: String,

    /// Optional system instructions sent ahead of the user prompt.
    pub system_prompt: Option<String>,

    /// The user prompt text.
    pub prompt: String,

    /// Sampling parameters.
    pub config: LlmConfig,
}

/// A normalized completion response.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated text. Empty when the provider returned no content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token usage, model, request id).
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over completion providers.
///
/// Object-safe; held as `Arc<dyn Backend>` by [`ExecCtx`](crate::ExecCtx).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute one completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Check whether an error is worth another attempt under `config`.
///
/// Retryable: [`ShoppingListError::HttpError`] with a status in
/// `config.retryable_statuses`, and [`ShoppingListError::Request`]
/// (connection/transport errors).
pub fn is_retryable(error: &ShoppingListError, config: &BackoffConfig) -> bool {
    match error {
        ShoppingListError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        ShoppingListError::Request(_) => true,
        _ => false,
    }
}

fn check_cancel(cancel: Option<&AtomicBool>) -> Result<()> {
    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Err(ShoppingListError::Cancelled);
    }
    Ok(())
}

/// Execute a backend call with transport-level retry and exponential backoff.
///
/// Returns the first successful response, or the last error once retries
/// are exhausted or a non-retryable error occurs. A `Retry-After` hint from
/// the provider replaces the computed delay when
/// [`BackoffConfig::respect_retry_after`] is set.
pub async fn with_backoff(
    backend: &Arc<dyn Backend>,
    client: &Client,
    base_url: &str,
    request: &LlmRequest,
    config: &BackoffConfig,
    cancel: Option<&AtomicBool>,
    mut on_retry: RetryCallback<'_>,
) -> Result<LlmResponse> {
    let mut last_error: Option<ShoppingListError> = None;

    for attempt in 0..=config.max_retries {
        check_cancel(cancel)?;

        if attempt > 0 {
            let delay = match &last_error {
                Some(ShoppingListError::HttpError {
                    retry_after: Some(ra),
                    ..
                }) if config.respect_retry_after => *ra,
                _ => config.delay_for_attempt(attempt - 1),
            };

            let reason = last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();

            log::warn!(
                "{} call failed ({}), retry {}/{} in {:?}",
                backend.name(),
                reason,
                attempt,
                config.max_retries,
                delay
            );

            if let Some(ref mut cb) = on_retry {
                cb(attempt, delay, &reason);
            }

            tokio::time::sleep(delay).await;
            check_cancel(cancel)?;
        }

        match backend.complete(client, base_url, request).await {
            Ok(response) => return Ok(response),
            Err(e) => {
                if attempt < config.max_retries && is_retryable(&e, config) {
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ShoppingListError::Other("backoff loop exited unexpectedly".into())
    }))
}
