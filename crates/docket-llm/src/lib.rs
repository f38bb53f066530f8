//! Docket LLM Provider Layer
//!
//! Pluggable completion providers behind the `CompletionProvider` trait from
//! `docket-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//! - `OllamaProvider`: Local Ollama API integration
//!
//! Every provider makes exactly one HTTP attempt per call. Throttling is
//! reported as [`LlmError::RateLimited`] so the pipeline's retry policy can
//! back off; nothing in this crate sleeps or retries.
//!
//! # Examples
//!
//! ```
//! use docket_domain::{CompletionProvider, CompletionRequest};
//! use docket_llm::MockProvider;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = MockProvider::new(r#"{"risks": []}"#);
//! let completion = provider
//!     .complete(&CompletionRequest::json("test prompt"))
//!     .await
//!     .unwrap();
//! assert_eq!(completion.text, r#"{"risks": []}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod openai;

use docket_domain::ProviderError;
use std::time::Duration;
use thiserror::Error;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded; the service may suggest how long to wait
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Server-suggested delay before retrying
        retry_after: Option<Duration>,
    },

    /// Credentials missing or rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The service rejected the request as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl ProviderError for LlmError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            LlmError::Communication(e.to_string())
        }
    }
}

/// Parse a server-suggested retry delay
///
/// `retry-after-ms` (milliseconds) wins over `retry-after` (seconds). Values
/// that are missing, unparseable, not positive or too large for a `Duration`
/// are ignored. The HTTP-date form of `retry-after` is not supported.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    };

    read("retry-after-ms")
        .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
        .or_else(|| read("retry-after").and_then(|secs| Duration::try_from_secs_f64(secs).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn test_rate_limited_is_classified() {
        let err = LlmError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_other_errors_are_not_rate_limited() {
        assert!(!LlmError::Auth("bad key".into()).is_rate_limited());
        assert!(!LlmError::Communication("reset".into()).is_rate_limited());
        assert_eq!(LlmError::InvalidRequest("x".into()).retry_after(), None);
    }

    #[test]
    fn test_retry_after_ms_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after-ms", HeaderValue::from_static("1500"));
        headers.insert("retry-after", HeaderValue::from_static("9"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("3"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_retry_after_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(parse_retry_after(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("retry-after-ms", HeaderValue::from_static("0"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_retry_after_out_of_range_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("1e30"));
        assert_eq!(parse_retry_after(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("retry-after-ms", HeaderValue::from_static("1e30"));
        headers.insert("retry-after", HeaderValue::from_static("4"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(4)));
    }
}
