//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the outside
//! world. Implementations live in other crates.

use crate::completion::{Completion, CompletionRequest, TokenUsage};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classification hooks the retry policy needs from a provider error
pub trait ProviderError: std::error::Error + Send + Sync + 'static {
    /// True when the service asked the caller to slow down
    fn is_rate_limited(&self) -> bool;

    /// Server-suggested wait before the next attempt, if any
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Trait for a remote text-completion service
///
/// Implemented by the infrastructure layer (docket-llm). One call is one
/// network attempt; retries are the caller's responsibility.
pub trait CompletionProvider: Send + Sync {
    /// Error type for provider operations
    type Error: ProviderError;

    /// Run a single completion
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send;

    /// Model identifier, for logs
    fn model_name(&self) -> &str {
        "llm"
    }
}

/// One billable usage event
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEvent {
    /// Event name, e.g. "analyze"
    pub event_name: String,

    /// Tokens consumed, when the provider reported them
    pub token_counts: Option<TokenUsage>,

    /// Cost in the billing currency, when known
    pub cost: Option<f64>,
}

/// Trait for recording usage against a user's quota
///
/// The quota check itself happens before the pipeline is invoked; this is
/// only the bookkeeping after a successful run.
pub trait UsageRecorder: Send + Sync {
    /// Error type for recording failures
    type Error: Display;

    /// Record one usage event
    fn record_usage(&self, user_id: &str, event: &UsageEvent) -> Result<(), Self::Error>;
}
