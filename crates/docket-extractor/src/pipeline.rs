//! Pipeline entry point: chunk, analyze, reduce, normalize, render

use crate::analyzer::ChunkAnalyzer;
use crate::chunking::TextChunker;
use crate::config::PipelineConfig;
use crate::deadlines::fill_missing_events;
use crate::error::ExtractorError;
use crate::pool::run_bounded;
use crate::reducer::HierarchicalReducer;
use crate::render::render_report;
use crate::retry::RetryPolicy;
use crate::types::{PipelineOutput, PipelineRequest};
use crate::usage::{NoopRecorder, ANALYZE_EVENT};
use docket_domain::{AnalysisRecord, CompletionProvider, TokenUsage, UsageEvent, UsageRecorder};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

/// The document analysis pipeline
///
/// Built once and reused: configuration is validated in [`Pipeline::new`],
/// and the concurrency limit is shared by every run on this instance.
pub struct Pipeline<P, R = NoopRecorder> {
    provider: Arc<P>,
    recorder: R,
    config: PipelineConfig,
    chunker: TextChunker,
    limiter: Arc<Semaphore>,
}

impl<P: CompletionProvider + 'static> Pipeline<P, NoopRecorder> {
    /// Create a pipeline
    ///
    /// # Errors
    ///
    /// [`ExtractorError::Config`] when the configuration is invalid.
    pub fn new(provider: P, config: PipelineConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;

        info!(
            "Pipeline ready: model {}, chunk size {}, overlap {}, batch {}, concurrency {}",
            provider.model_name(),
            config.chunk_size,
            config.chunk_overlap,
            config.reduce_batch_size,
            config.max_concurrency
        );

        Ok(Self {
            provider: Arc::new(provider),
            recorder: NoopRecorder,
            limiter: Arc::new(Semaphore::new(config.max_concurrency)),
            chunker,
            config,
        })
    }
}

impl<P, R> Pipeline<P, R>
where
    P: CompletionProvider + 'static,
    R: UsageRecorder,
{
    /// Record usage with `recorder` after every successful run
    pub fn with_recorder<R2: UsageRecorder>(self, recorder: R2) -> Pipeline<P, R2> {
        Pipeline {
            provider: self.provider,
            recorder,
            config: self.config,
            chunker: self.chunker,
            limiter: self.limiter,
        }
    }

    /// The validated configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The usage recorder
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Analyze one document
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::UsageDenied`] when `usage_allowed` is false; nothing is called
    /// - [`ExtractorError::ChunkFailed`] / [`ExtractorError::MergeFailed`] when a remote call fails for good
    /// - [`ExtractorError::DeadlineExceeded`] when the run outlives `overall_timeout_secs`
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineOutput, ExtractorError> {
        if !request.usage_allowed {
            warn!("Usage not allowed for user '{}', skipping analysis", request.user_id);
            return Err(ExtractorError::UsageDenied);
        }

        let budget = self.config.overall_timeout();
        let deadline = Instant::now()
            .checked_add(budget)
            .ok_or_else(|| ExtractorError::Config(format!("overall timeout {:?} is out of range", budget)))?;
        let output = timeout_at(deadline, self.execute(&request.document_text, deadline))
            .await
            .map_err(|_| ExtractorError::DeadlineExceeded(budget))??;

        let event = UsageEvent {
            event_name: ANALYZE_EVENT.to_string(),
            token_counts: (output.usage.total() > 0).then_some(output.usage),
            cost: None,
        };
        if let Err(e) = self.recorder.record_usage(&request.user_id, &event) {
            warn!("Failed to record usage for '{}': {}", request.user_id, e);
        }

        Ok(output)
    }

    async fn execute(&self, text: &str, deadline: Instant) -> Result<PipelineOutput, ExtractorError> {
        let mut chunks = self.chunker.chunk(text);
        let total_chunk_count = chunks.len();
        let truncated = match self.config.max_chunks {
            Some(cap) if total_chunk_count > cap => {
                warn!("Document has {} chunks, analyzing only the first {}", total_chunk_count, cap);
                chunks.truncate(cap);
                true
            }
            _ => false,
        };
        let analyzed_chunk_count = chunks.len();
        info!(
            "Analyzing {} of {} chunks ({} chars)",
            analyzed_chunk_count,
            total_chunk_count,
            text.chars().count()
        );

        let policy = RetryPolicy::from_config(&self.config).with_deadline(deadline);
        let analyzer = ChunkAnalyzer::new(Arc::clone(&self.provider), policy.clone());
        let jobs: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let analyzer = analyzer.clone();
                async move { analyzer.analyze(&chunk).await }
            })
            .collect();

        let mut usage = TokenUsage::default();
        let mut partials = Vec::with_capacity(analyzed_chunk_count);
        for (record, spent) in run_bounded(jobs, &self.limiter).await? {
            usage += spent;
            partials.push(record);
        }

        let reducer = HierarchicalReducer::new(
            Arc::clone(&self.provider),
            policy,
            self.config.reduce_batch_size,
            Arc::clone(&self.limiter),
        )?;
        let reduction = reducer.reduce(partials).await?;
        usage += reduction.usage;

        let mut analysis = fill_missing_events(reduction.record);
        if truncated {
            note_truncation(&mut analysis, analyzed_chunk_count, total_chunk_count);
        }
        let report_text = render_report(&analysis);

        info!(
            "Analysis complete: {} rounds, {} obligations, {} risks, {} deadline events, {} tokens",
            reduction.rounds,
            analysis.obligations.len(),
            analysis.risks.len(),
            analysis.deadline_events.len(),
            usage.total()
        );

        Ok(PipelineOutput {
            report_text,
            analysis,
            analyzed_chunk_count,
            total_chunk_count,
            truncated,
            usage,
        })
    }
}

fn note_truncation(record: &mut AnalysisRecord, analyzed: usize, total: usize) {
    let sentence = format!(
        "Only the first {} of {} sections were analyzed; {} later sections were omitted.",
        analyzed,
        total,
        total - analyzed
    );
    if record.uncertainty_note.trim().is_empty() {
        record.uncertainty_note = sentence;
    } else {
        record.uncertainty_note = format!("{} {}", record.uncertainty_note.trim(), sentence);
    }
}
