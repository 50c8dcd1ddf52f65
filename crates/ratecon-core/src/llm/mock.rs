//! Mock summarizer backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{SummarizeError, Summarizer};

/// A configurable mock response for [`MockSummarizer`].
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum MockResponse {
    /// Simulate a successful summary.
    Summary(String),
    /// Simulate a 429 from the service.
    RateLimited,
    /// Simulate a timeout.
    Timeout,
    /// Simulate a generic API error.
    Error(String),
}

/// A hand-rolled mock implementing [`Summarizer`] for tests.
///
/// Supports a fixed response or a per-call sequence (last response repeats
/// when exhausted), plus call counting and capture of the last input text.
pub struct MockSummarizer {
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    call_count: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl MockSummarizer {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            call_count: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Create a mock that returns responses in order, repeating the last.
    #[allow(dead_code)]
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        // Reverse so we can pop() from the front cheaply.
        responses.reverse();
        let fallback = responses.first().cloned().unwrap();
        Self {
            responses: Mutex::new(responses),
            fallback,
            call_count: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// How many times `summarize()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The text passed to the most recent call.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap();
        if let Some(resp) = seq.pop() {
            resp
        } else {
            self.fallback.clone()
        }
    }
}

impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        "Mock"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(text.to_string());
        let response = self.next_response();

        Box::pin(async move {
            match response {
                MockResponse::Summary(s) => Ok(s),
                MockResponse::RateLimited => Err(SummarizeError::RateLimited),
                MockResponse::Timeout => Err(SummarizeError::Timeout),
                MockResponse::Error(msg) => Err(SummarizeError::Api {
                    status: 500,
                    body: msg,
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_then_repeats_last() {
        let mock = MockSummarizer::with_sequence(vec![
            MockResponse::RateLimited,
            MockResponse::Summary("LOAD DETAILS: ...".into()),
        ]);
        let client = reqwest::Client::new();
        let timeout = Duration::from_secs(1);

        assert!(matches!(
            mock.summarize("doc", &client, timeout).await,
            Err(SummarizeError::RateLimited)
        ));
        assert!(mock.summarize("doc", &client, timeout).await.is_ok());
        assert!(mock.summarize("doc", &client, timeout).await.is_ok());
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.last_input().as_deref(), Some("doc"));
    }
}
