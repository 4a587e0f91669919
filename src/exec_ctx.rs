//! Execution context shared across generation calls.
//!
//! [`ExecCtx`] owns the HTTP client, completion backend, endpoint, retry
//! policy, cancellation handle and optional event handler. The caller builds
//! it once, keeps it for the life of the process and passes it by reference;
//! nothing in it changes after construction.

use crate::backend::{Backend, BackoffConfig, OpenAiBackend};
use crate::config::GeneratorConfig;
use crate::error::{Result, ShoppingListError};
use crate::events::EventHandler;
use reqwest::Client;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

/// Default endpoint for the OpenAI backend.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Shared execution context for generation calls.
///
/// # Example
///
/// ```
/// use shopping_list::{ExecCtx, MockBackend};
/// use std::sync::Arc;
///
/// let ctx = ExecCtx::builder("http://unused")
///     .backend(Arc::new(MockBackend::fixed("Dairy:\n- Milk")))
///     .build()
///     .unwrap();
/// assert_eq!(ctx.backend.name(), "mock");
/// ```
pub struct ExecCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL of the provider, without the `/v1/...` path.
    pub base_url: String,
    pub backend: Arc<dyn Backend>,
    /// Transport retry configuration. Default: [`BackoffConfig::none()`].
    pub backoff: BackoffConfig,
    /// Optional cancellation flag, checked before each attempt.
    pub cancellation: Option<Arc<AtomicBool>>,
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ExecCtx {
    pub fn builder(base_url: impl Into<String>) -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: base_url.into(),
            backend: None,
            backoff: None,
            cancellation: None,
            event_handler: None,
            timeout: None,
        }
    }

    /// Build a context talking to the configured OpenAI-compatible endpoint.
    ///
    /// Fails with [`ShoppingListError::MissingApiKey`] when no key is set.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        log::debug!(
            "Context for {} with up to {} retries ({:?} worst-case backoff)",
            config.base_url,
            config.backoff.max_retries,
            config.backoff.worst_case_wait()
        );
        Self::builder(config.base_url.clone())
            .backend(Arc::new(OpenAiBackend::new().with_api_key(api_key)))
            .backoff(config.backoff.clone())
            .timeout(config.timeout)
            .build()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Return an error if cancellation has been requested.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ShoppingListError::Cancelled);
        }
        Ok(())
    }

    pub fn cancel_flag(&self) -> Option<&AtomicBool> {
        self.cancellation.as_deref()
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("backoff", &self.backoff)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    backoff: Option<BackoffConfig>,
    cancellation: Option<Arc<AtomicBool>>,
    event_handler: Option<Arc<dyn EventHandler>>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, one is created with the configured timeout.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the backend. Default: [`OpenAiBackend`] without a key.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = Some(config);
        self
    }

    pub fn cancellation(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancellation = cancel;
        self
    }

    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set the request timeout. Default: 60 seconds.
    ///
    /// Ignored when a custom client is supplied via [`client`](Self::client).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    ///
    /// Fails with [`ShoppingListError::InvalidConfig`] if the base URL is
    /// empty, or with [`ShoppingListError::Request`] if the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<ExecCtx> {
        let base_url = normalize_base_url(&self.base_url);
        if base_url.is_empty() {
            return Err(ShoppingListError::InvalidConfig(
                "base URL must not be empty".to_string(),
            ));
        }

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(Duration::from_secs(60)))
                .build()?,
        };

        Ok(ExecCtx {
            client,
            base_url,
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(OpenAiBackend::new())),
            backoff: self.backoff.unwrap_or_else(BackoffConfig::none),
            cancellation: self.cancellation,
            event_handler: self.event_handler,
        })
    }
}

/// Strip known provider path suffixes so the backend can append its own.
/// e.g., "https://api.openai.com/v1" -> "https://api.openai.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    for suffix in ["/v1/chat/completions", "/v1/chat", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}
