//! Bounded retry with linear backoff for rate-limited remote calls

use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use docket_domain::ProviderError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

/// What to do with a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Retry, honouring the server's suggested delay when it is longer than the backoff
    Retry {
        /// Server-suggested delay
        retry_after: Option<Duration>,
    },
    /// Give up immediately
    Fail,
}

/// Classify a provider error: only throttling is retried
pub fn classify_provider_error<E: ProviderError>(error: &E) -> Disposition {
    if error.is_rate_limited() {
        Disposition::Retry {
            retry_after: error.retry_after(),
        }
    } else {
        Disposition::Fail
    }
}

/// Retry policy shared by chunk analysis and merge calls
///
/// Attempt `n` (1-based) that fails retryably waits
/// `max(n * base_delay, retry_after)`. A call that exceeds `call_timeout` is
/// retryable. With `max_retries = 3` an operation runs at most 4 times.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    call_timeout: Duration,
    deadline: Option<Instant>,
}

impl RetryPolicy {
    /// Create a policy without an overall deadline
    pub fn new(max_retries: u32, base_delay: Duration, call_timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            call_timeout,
            deadline: None,
        }
    }

    /// Policy from pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_retries, config.base_delay(), config.call_timeout())
    }

    /// Refuse to wait or call past `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.base_delay.saturating_mul(attempt);
        backoff.max(retry_after.unwrap_or(Duration::ZERO))
    }

    /// Run a provider call, retrying only when the provider reports throttling
    pub async fn call_with_retry<T, E, F, Fut>(&self, label: &str, operation: F) -> Result<T, ExtractorError>
    where
        E: ProviderError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(label, operation, classify_provider_error::<E>).await
    }

    /// Run `operation` with the given classification of its errors
    pub async fn run<T, E, F, Fut, C>(&self, label: &str, mut operation: F, classify: C) -> Result<T, ExtractorError>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> Disposition,
    {
        let mut attempt: u32 = 0;

        loop {
            let call_timeout = self.remaining_call_budget()?;

            let (reason, retry_after) = match timeout(call_timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => match classify(&e) {
                    Disposition::Fail => {
                        return Err(ExtractorError::UpstreamUnavailable(format!("{}: {}", label, e)));
                    }
                    Disposition::Retry { retry_after } => (e.to_string(), retry_after),
                },
                Err(_) => (format!("timed out after {:?}", call_timeout), None),
            };

            attempt += 1;
            if attempt > self.max_retries {
                return Err(ExtractorError::UpstreamUnavailable(format!(
                    "{}: {} (gave up after {} attempts)",
                    label, reason, attempt
                )));
            }

            let delay = self.backoff_delay(attempt, retry_after);
            if let Some(deadline) = self.deadline {
                if deadline.saturating_duration_since(Instant::now()) <= delay {
                    return Err(ExtractorError::UpstreamUnavailable(format!(
                        "{}: {} (retry in {:?} would pass the run deadline)",
                        label, reason, delay
                    )));
                }
            }

            warn!(
                "{}: {}; retry {}/{} in {:?}",
                label, reason, attempt, self.max_retries, delay
            );
            sleep(delay).await;
        }
    }

    /// Per-call timeout, shortened to whatever is left before the deadline
    fn remaining_call_budget(&self) -> Result<Duration, ExtractorError> {
        let Some(deadline) = self.deadline else {
            return Ok(self.call_timeout);
        };
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(ExtractorError::UpstreamUnavailable(
                "run deadline reached before the call was issued".to_string(),
            ));
        }
        debug!("Call budget: {:?} (deadline in {:?})", self.call_timeout.min(left), left);
        Ok(self.call_timeout.min(left))
    }
}
