//! Runtime configuration for the generation flow.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file in the working directory.

use std::env;
use std::time::Duration;

use crate::backend::BackoffConfig;
use crate::error::{Result, ShoppingListError};
use crate::exec_ctx::DEFAULT_BASE_URL;

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
/// Environment variable overriding the provider base URL.
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the model name.
pub const MODEL_ENV_VAR: &str = "SHOPPING_LIST_MODEL";
pub const TEMPERATURE_ENV_VAR: &str = "SHOPPING_LIST_TEMPERATURE";
pub const MAX_TOKENS_ENV_VAR: &str = "SHOPPING_LIST_MAX_TOKENS";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// 0.0 is deterministic; the chat endpoint accepts up to 2.0.
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl LlmConfig {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Parse an optional numeric override, keeping `default` when it is malformed.
fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {}={:?}: not a valid number", key, raw);
            default
        }),
        None => default,
    }
}

/// Everything needed to build an [`ExecCtx`](crate::ExecCtx) and a
/// [`ShoppingListGenerator`](crate::ShoppingListGenerator).
#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub llm: LlmConfig,
    pub timeout: Duration,
    pub backoff: BackoffConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            llm: LlmConfig::default(),
            timeout: Duration::from_secs(60),
            backoff: BackoffConfig::interactive(),
        }
    }
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("llm", &self.llm)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl GeneratorConfig {
    /// Load `.env` (if present) and read the environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let llm = LlmConfig {
            temperature: parse_or(
                TEMPERATURE_ENV_VAR,
                get(TEMPERATURE_ENV_VAR),
                defaults.llm.temperature,
            ),
            max_tokens: parse_or(
                MAX_TOKENS_ENV_VAR,
                get(MAX_TOKENS_ENV_VAR),
                defaults.llm.max_tokens,
            ),
        };
        Self {
            api_key: get(API_KEY_ENV_VAR),
            base_url: get(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
            model: get(MODEL_ENV_VAR).unwrap_or(defaults.model),
            llm,
            ..defaults
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// The API key, or [`ShoppingListError::MissingApiKey`].
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ShoppingListError::MissingApiKey(API_KEY_ENV_VAR.to_string()))
    }
}
