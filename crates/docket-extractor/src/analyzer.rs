//! Per-chunk structured extraction

use crate::deadlines::fill_missing_events;
use crate::error::ExtractorError;
use crate::parser::parse_analysis;
use crate::prompt::ChunkPrompt;
use crate::retry::RetryPolicy;
use docket_domain::{AnalysisRecord, Chunk, CompletionProvider, CompletionRequest, TokenUsage};
use std::sync::Arc;
use tracing::debug;

/// Analyzes one chunk per call through the retry policy and parser
pub struct ChunkAnalyzer<P> {
    provider: Arc<P>,
    policy: RetryPolicy,
}

impl<P> Clone for ChunkAnalyzer<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            policy: self.policy.clone(),
        }
    }
}

impl<P: CompletionProvider> ChunkAnalyzer<P> {
    /// Create an analyzer sharing `provider`
    pub fn new(provider: Arc<P>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Analyze `chunk` into a partial record plus the tokens it cost
    ///
    /// # Errors
    ///
    /// [`ExtractorError::ChunkFailed`] carrying the chunk ordinal when the
    /// call fails for good. An unusable response is not an error.
    pub async fn analyze(&self, chunk: &Chunk) -> Result<(AnalysisRecord, TokenUsage), ExtractorError> {
        let label = format!("chunk {}/{}", chunk.ordinal, chunk.total);
        let prompt = ChunkPrompt::new(chunk).build();
        debug!(
            "{}: {} chars from offset {}{}",
            label,
            chunk.char_len(),
            chunk.start,
            if chunk.is_last() { " (last section)" } else { "" }
        );

        request_record(self.provider.as_ref(), &self.policy, &label, prompt)
            .await
            .map_err(|e| ExtractorError::ChunkFailed {
                ordinal: chunk.ordinal,
                total: chunk.total,
                source: Box::new(e),
            })
    }
}

/// One JSON completion, parsed and with deadline events filled in
pub(crate) async fn request_record<P: CompletionProvider>(
    provider: &P,
    policy: &RetryPolicy,
    label: &str,
    prompt: String,
) -> Result<(AnalysisRecord, TokenUsage), ExtractorError> {
    debug!("{}: prompt length {} chars ({})", label, prompt.len(), provider.model_name());

    let request = CompletionRequest::json(prompt);
    let request = &request;
    let completion = policy
        .call_with_retry(label, move || provider.complete(request))
        .await?;

    let record = fill_missing_events(parse_analysis(&completion.text));
    debug!(
        "{}: response length {} chars, {} items extracted",
        label,
        completion.text.len(),
        record.item_count()
    );
    Ok((record, completion.usage.unwrap_or_default()))
}
