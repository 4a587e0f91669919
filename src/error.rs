use std::time::Duration;
use thiserror::Error;

use crate::types::RecipeId;

/// Errors produced while generating, storing or fetching shopping lists.
///
/// Parsing a reply never fails; every variant here comes from a
/// collaborator (configuration, the upstream model, identity, storage).
#[derive(Error, Debug)]
pub enum ShoppingListError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON handling failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations when
    /// the provider answers with a non-success status. `retry_after` is
    /// populated from the `Retry-After` response header when present.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// The model answered, but with no usable text. The parser is not run.
    #[error("Failed to generate shopping list: the model returned an empty response")]
    EmptyResponse,

    /// No API credential is configured for the upstream model.
    #[error("API key is not configured: set {0} in the environment or a .env file")]
    MissingApiKey(String),

    /// The caller has no identity.
    #[error("Unauthorized: please sign in")]
    Unauthorized,

    /// The recipe does not exist or belongs to someone else.
    #[error("Recipe {0} not found")]
    NotFound(RecipeId),

    /// A record failed validation at the storage boundary.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The operation was cancelled via the cancellation flag.
    #[error("Generation was cancelled")]
    Cancelled,

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ShoppingListError {
    fn from(err: anyhow::Error) -> Self {
        ShoppingListError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShoppingListError>;
