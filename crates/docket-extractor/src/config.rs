//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for either timeout: one week
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunk window size (characters)
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,

    /// Records merged per call in each reduction round
    pub reduce_batch_size: usize,

    /// Retries after the first attempt for a throttled or timed-out call
    pub max_retries: u32,

    /// Backoff unit; attempt `n` waits `n * base_delay_ms`
    pub base_delay_ms: u64,

    /// Maximum remote calls in flight at once
    pub max_concurrency: usize,

    /// Timeout for a single remote call (seconds)
    pub call_timeout_secs: u64,

    /// Wall-clock budget for a whole pipeline run (seconds)
    pub overall_timeout_secs: u64,

    /// Optional cap on analyzed chunks; `None` analyzes everything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chunks: Option<usize>,
}

impl PipelineConfig {
    /// Backoff unit as a Duration
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Single-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Whole-run budget as a Duration
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size <= self.chunk_overlap {
            return Err(format!(
                "chunk_size ({}) must be greater than chunk_overlap ({})",
                self.chunk_size, self.chunk_overlap
            ));
        }
        if self.reduce_batch_size < 2 {
            return Err("reduce_batch_size must be at least 2".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        if self.overall_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(format!(
                "overall_timeout_secs ({}) cannot exceed {}",
                self.overall_timeout_secs, MAX_TIMEOUT_SECS
            ));
        }
        if self.overall_timeout_secs < self.call_timeout_secs {
            return Err("overall_timeout_secs cannot be shorter than call_timeout_secs".to_string());
        }
        if self.max_chunks == Some(0) {
            return Err("max_chunks must be greater than 0 when set".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            chunk_size: 30_000,
            chunk_overlap: 1_000,
            reduce_batch_size: 8,
            max_retries: 3,
            base_delay_ms: 2_000,
            max_concurrency: 4,
            call_timeout_secs: 120,
            overall_timeout_secs: 900,
            max_chunks: None,
        }
    }
}

impl PipelineConfig {
    /// Aggressive preset: smaller chunks, more parallelism, shorter timeouts
    pub fn aggressive() -> Self {
        Self {
            chunk_size: 12_000,
            chunk_overlap: 500,
            reduce_batch_size: 6,
            max_retries: 2,
            base_delay_ms: 1_000,
            max_concurrency: 8,
            call_timeout_secs: 60,
            overall_timeout_secs: 300,
            max_chunks: None,
        }
    }

    /// Conservative preset: one call in flight and longer backoff, for tight rate limits
    pub fn conservative() -> Self {
        Self {
            chunk_size: 30_000,
            chunk_overlap: 1_000,
            reduce_batch_size: 8,
            max_retries: 5,
            base_delay_ms: 5_000,
            max_concurrency: 1,
            call_timeout_secs: 180,
            overall_timeout_secs: 1_800,
            max_chunks: None,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
