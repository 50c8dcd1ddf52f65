//! Summarizer collaborator: a remote text-to-text service that turns
//! extracted rate-confirmation text into a formatted load summary.
//!
//! The cascade does not know this module exists; callers wire the two
//! together. No retry logic lives here: a timeout or non-success response
//! is propagated and retry policy belongs to the caller.

pub mod mistral;
#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

pub use mistral::{DEFAULT_MAX_INPUT_CHARS, DEFAULT_MODEL, MistralSummarizer};

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("summarization request timed out")]
    Timeout,
    #[error("summarization service rate limited (429)")]
    RateLimited,
    #[error("summarization service error: HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("summarization response contained no content")]
    MissingContent,
}

/// A remote summarization backend.
///
/// `text` is the extracted document text; implementations own truncating
/// it to their input budget before building the request.
pub trait Summarizer: Send + Sync {
    /// Canonical name of this backend (e.g. "Mistral").
    fn name(&self) -> &str;

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>>;
}
