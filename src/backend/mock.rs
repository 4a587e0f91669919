//! Mock backend for testing without a live model.
//!
//! [`MockBackend`] returns pre-configured replies in order and can simulate
//! transient HTTP failures, so generation and retry paths can be tested
//! deterministically.
//!
//! # Example
//!
//! ```
//! use shopping_list::backend::MockBackend;
//!
//! let mock = MockBackend::fixed("Produce:\n- Tomatoes");
//! let flaky = MockBackend::fixed("Dairy:\n- Milk").with_failures(1, 503);
//! ```

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, LlmRequest, LlmResponse};
use crate::error::{Result, ShoppingListError};

/// A test backend that returns canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockBackend {
    responses: Vec<String>,
    index: AtomicUsize,
    /// Calls left to fail before replies are served.
    failures_left: AtomicU32,
    failure_status: u16,
    calls: AtomicU32,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockBackend {
    /// Create a mock backend with the given canned replies.
    pub fn new(responses: Vec<String>) -> Self {
        assert!(!responses.is_empty(), "MockBackend requires at least one response");
        Self {
            responses,
            index: AtomicUsize::new(0),
            failures_left: AtomicU32::new(0),
            failure_status: 503,
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Fail the first `count` calls with an HTTP error of the given status.
    pub fn with_failures(mut self, count: u32, status: u16) -> Self {
        self.failures_left = AtomicU32::new(count);
        self.failure_status = status;
        self
    }

    /// Number of `complete` calls received, failed ones included.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn next_response(&self) -> String {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        self.responses[idx].clone()
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }

        if self.take_failure() {
            return Err(ShoppingListError::HttpError {
                status: self.failure_status,
                body: "mock failure".to_string(),
                retry_after: None,
            });
        }

        Ok(LlmResponse {
            text: self.next_response(),
            status: 200,
            metadata: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LlmRequest {
        LlmRequest {
            model: "test".to_string(),
            system_prompt: None,
            prompt: "test".to_string(),
            config: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let mock = MockBackend::fixed("Hello!");
        let client = Client::new();
        let resp = mock.complete(&client, "http://unused", &request()).await.unwrap();
        assert_eq!(resp.text, "Hello!");
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let mock = MockBackend::new(vec!["first".into(), "second".into()]);
        let client = Client::new();
        let r1 = mock.complete(&client, "http://unused", &request()).await.unwrap();
        let r2 = mock.complete(&client, "http://unused", &request()).await.unwrap();
        let r3 = mock.complete(&client, "http://unused", &request()).await.unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
        assert_eq!(r3.text, "first");
    }

    #[tokio::test]
    async fn test_mock_failures_come_first() {
        let mock = MockBackend::fixed("ok").with_failures(1, 429);
        let client = Client::new();
        let first = mock.complete(&client, "http://unused", &request()).await;
        assert!(matches!(
            first,
            Err(ShoppingListError::HttpError { status: 429, .. })
        ));
        let second = mock.complete(&client, "http://unused", &request()).await.unwrap();
        assert_eq!(second.text, "ok");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_records_last_request() {
        let mock = MockBackend::fixed("ok");
        let client = Client::new();
        let mut req = request();
        req.prompt = "tacos".into();
        mock.complete(&client, "http://unused", &req).await.unwrap();
        assert_eq!(mock.last_request().unwrap().prompt, "tacos");
    }
}
