//! Mock provider for deterministic testing

use crate::LlmError;
use docket_domain::{Completion, CompletionProvider, CompletionRequest, TokenUsage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Responses are chosen in this order:
///
/// 1. Scripted results queued with [`MockProvider::push_result`], first in first out
/// 2. The first registered response whose key occurs in the prompt
/// 3. The default response
///
/// # Examples
///
/// ```
/// use docket_domain::{CompletionProvider, CompletionRequest};
/// use docket_llm::{LlmError, MockProvider};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("Section 2", r#"{"risks": ["late fee"]}"#);
/// provider.push_result(Err(LlmError::RateLimited { retry_after: None }));
///
/// // Scripted results come first
/// assert!(provider.complete(&CompletionRequest::json("Section 2")).await.is_err());
/// // Then keyed responses
/// let hit = provider.complete(&CompletionRequest::json("Section 2 of 3")).await.unwrap();
/// assert!(hit.text.contains("late fee"));
/// assert_eq!(provider.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    scripted: Arc<Mutex<VecDeque<Result<Completion, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    usage: Option<TokenUsage>,
    latency: Option<Duration>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts one running call; released even when the call future is dropped
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            usage: None,
            latency: None,
        }
    }

    /// Report the given token usage with every successful completion
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Delay every call, so that concurrent calls overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Respond with `response` to any prompt containing `key`
    ///
    /// Keys are checked in registration order; the first match wins.
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((key.into(), MockReply::Text(response.into())));
    }

    /// Fail any prompt containing `key` with a non-retryable error
    pub fn add_error(&mut self, key: impl Into<String>) {
        lock(&self.responses).push((key.into(), MockReply::Error));
    }

    /// Queue a result to be returned by the next call, ahead of keyed responses
    pub fn push_result(&self, result: Result<Completion, LlmError>) {
        lock(&self.scripted).push_back(result);
    }

    /// Queue `times` rate-limit failures
    pub fn push_rate_limits(&self, times: usize, retry_after: Option<Duration>) {
        let mut scripted = lock(&self.scripted);
        for _ in 0..times {
            scripted.push_back(Err(LlmError::RateLimited { retry_after }));
        }
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count and the prompt log
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        lock(&self.prompts).clear();
    }

    /// Every prompt received so far, in arrival order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Highest number of calls that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn reply_for(&self, prompt: &str) -> Result<Completion, LlmError> {
        if let Some(result) = lock(&self.scripted).pop_front() {
            return result;
        }

        let responses = lock(&self.responses);
        let reply = responses
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Error) => Err(LlmError::Other("Mock error".to_string())),
            Some(MockReply::Text(text)) => Ok(self.completion(text)),
            None => Ok(self.completion(self.default_response.clone())),
        }
    }

    fn completion(&self, text: String) -> Completion {
        let completion = Completion::new(text);
        match self.usage {
            Some(usage) => completion.with_usage(usage),
            None => completion,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push(request.prompt.clone());

        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.reply_for(&request.prompt)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
