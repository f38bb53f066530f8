//! Usage recorders

use docket_domain::{UsageEvent, UsageRecorder};
use std::convert::Infallible;
use std::sync::{Mutex, PoisonError};

/// Event name recorded once per successful run
pub const ANALYZE_EVENT: &str = "analyze";

/// Recorder that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl UsageRecorder for NoopRecorder {
    type Error = Infallible;

    fn record_usage(&self, _user_id: &str, _event: &UsageEvent) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Recorder that keeps events in memory
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    events: Mutex<Vec<(String, UsageEvent)>>,
}

impl InMemoryRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded `(user_id, event)` pair, oldest first
    pub fn events(&self) -> Vec<(String, UsageEvent)> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl UsageRecorder for InMemoryRecorder {
    type Error = Infallible;

    fn record_usage(&self, user_id: &str, event: &UsageEvent) -> Result<(), Self::Error> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((user_id.to_string(), event.clone()));
        Ok(())
    }
}
