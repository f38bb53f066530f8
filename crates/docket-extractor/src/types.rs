//! Request and response types for a pipeline run

use docket_domain::{AnalysisRecord, TokenUsage};
use serde::{Deserialize, Serialize};

/// User id recorded when the caller does not supply one
pub const ANONYMOUS_USER: &str = "anonymous";

/// Request to analyze one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Already-extracted plain text of the document
    pub document_text: String,

    /// Outcome of the caller's quota check; `false` means no remote call is made
    pub usage_allowed: bool,

    /// Who the run is billed to
    pub user_id: String,
}

impl PipelineRequest {
    /// Create a request for an anonymous caller
    pub fn new(document_text: impl Into<String>, usage_allowed: bool) -> Self {
        Self {
            document_text: document_text.into(),
            usage_allowed,
            user_id: ANONYMOUS_USER.to_string(),
        }
    }

    /// Bill the run to `user_id`
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }
}

/// Result of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Human-readable bulleted report
    pub report_text: String,

    /// Final merged record
    pub analysis: AnalysisRecord,

    /// Chunks actually sent for analysis
    pub analyzed_chunk_count: usize,

    /// Chunks the document was split into
    pub total_chunk_count: usize,

    /// True when a chunk cap left part of the document unanalyzed
    pub truncated: bool,

    /// Tokens spent across analysis and merge calls
    pub usage: TokenUsage,
}

impl PipelineOutput {
    /// True when every chunk was analyzed
    pub fn is_complete(&self) -> bool {
        !self.truncated && self.analyzed_chunk_count == self.total_chunk_count
    }
}
