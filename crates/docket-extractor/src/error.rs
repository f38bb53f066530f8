//! Error types for the Extractor

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during extraction
///
/// An unparseable model response is deliberately absent: the parser degrades
/// to an empty record instead of failing.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Invalid configuration, e.g. chunk size not larger than overlap
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote call failed for good: fatal error, retries exhausted, or timeout past budget
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Analysis of one chunk failed
    #[error("Chunk {ordinal} of {total} failed: {source}")]
    ChunkFailed {
        /// 1-based ordinal of the chunk
        ordinal: usize,
        /// Total chunk count
        total: usize,
        /// Underlying failure
        #[source]
        source: Box<ExtractorError>,
    },

    /// A merge call failed
    #[error("Merge round {round}, group {group} failed: {source}")]
    MergeFailed {
        /// 1-based reduction round
        round: usize,
        /// 1-based group index within the round
        group: usize,
        /// Underlying failure
        #[source]
        source: Box<ExtractorError>,
    },

    /// The overall wall-clock budget ran out
    #[error("Pipeline deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The caller's quota check did not allow this run
    #[error("Usage not permitted for this request")]
    UsageDenied,

    /// Serialization error while building a prompt
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A worker task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(String),
}

impl ExtractorError {
    /// Innermost error, skipping chunk/merge tags
    pub fn root_cause(&self) -> &ExtractorError {
        match self {
            ExtractorError::ChunkFailed { source, .. } | ExtractorError::MergeFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ExtractorError {
    fn from(e: tokio::task::JoinError) -> Self {
        ExtractorError::Join(e.to_string())
    }
}
