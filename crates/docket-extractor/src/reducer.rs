//! Tournament-style reduction of partial records into one

use crate::analyzer::request_record;
use crate::error::ExtractorError;
use crate::merge::merge_locally;
use crate::pool::run_bounded;
use crate::prompt::MergePrompt;
use crate::retry::RetryPolicy;
use docket_domain::{AnalysisRecord, CompletionProvider, TokenUsage};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Result of a full reduction
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// The single remaining record
    pub record: AnalysisRecord,
    /// Tokens spent on merge calls
    pub usage: TokenUsage,
    /// Number of rounds run; zero when the input was already one record
    pub rounds: usize,
}

/// Merges records in fixed-size groups, round after round, until one is left
///
/// Groups are formed in input order. A group of one passes through without
/// a call. A merge call whose response yields the empty record is replaced
/// by [`merge_locally`] over the same group. Merges within a round share
/// the pipeline's concurrency limit; rounds run one after another.
pub struct HierarchicalReducer<P> {
    provider: Arc<P>,
    policy: RetryPolicy,
    batch_size: usize,
    limiter: Arc<Semaphore>,
}

impl<P> Clone for HierarchicalReducer<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            policy: self.policy.clone(),
            batch_size: self.batch_size,
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<P: CompletionProvider + 'static> HierarchicalReducer<P> {
    /// Create a reducer
    ///
    /// # Errors
    ///
    /// [`ExtractorError::Config`] when `batch_size < 2`, which would never
    /// shrink the record count.
    pub fn new(
        provider: Arc<P>,
        policy: RetryPolicy,
        batch_size: usize,
        limiter: Arc<Semaphore>,
    ) -> Result<Self, ExtractorError> {
        if batch_size < 2 {
            return Err(ExtractorError::Config(format!(
                "Reduce batch size must be at least 2, got {}",
                batch_size
            )));
        }
        Ok(Self {
            provider,
            policy,
            batch_size,
            limiter,
        })
    }

    /// Reduce `records` to exactly one record
    ///
    /// No records reduce to the empty record.
    pub async fn reduce(&self, records: Vec<AnalysisRecord>) -> Result<Reduction, ExtractorError> {
        let mut current = if records.is_empty() {
            vec![AnalysisRecord::empty()]
        } else {
            records
        };
        let mut usage = TokenUsage::default();
        let mut round = 0;

        while current.len() > 1 {
            round += 1;
            let groups: Vec<Vec<AnalysisRecord>> = current.chunks(self.batch_size).map(<[_]>::to_vec).collect();
            info!(
                "Reduction round {}: {} records in {} groups",
                round,
                current.len(),
                groups.len()
            );

            let jobs: Vec<_> = groups
                .into_iter()
                .enumerate()
                .map(|(idx, group)| {
                    let reducer = self.clone();
                    async move { reducer.merge_group(round, idx + 1, group).await }
                })
                .collect();

            current = Vec::with_capacity(jobs.len());
            for (record, spent) in run_bounded(jobs, &self.limiter).await? {
                usage += spent;
                current.push(record);
            }
        }

        Ok(Reduction {
            record: current.pop().unwrap_or_default(),
            usage,
            rounds: round,
        })
    }

    async fn merge_group(
        &self,
        round: usize,
        group_idx: usize,
        mut group: Vec<AnalysisRecord>,
    ) -> Result<(AnalysisRecord, TokenUsage), ExtractorError> {
        if group.len() == 1 {
            return Ok((group.pop().unwrap_or_default(), TokenUsage::default()));
        }

        let label = format!("merge {}.{}", round, group_idx);
        let failed = |e: ExtractorError| ExtractorError::MergeFailed {
            round,
            group: group_idx,
            source: Box::new(e),
        };

        let prompt = MergePrompt::new(&group).build().map_err(failed)?;
        let (merged, usage) = request_record(self.provider.as_ref(), &self.policy, &label, prompt)
            .await
            .map_err(failed)?;

        if merged.is_empty() {
            warn!("{}: merge response had no usable content, merging {} records locally", label, group.len());
            return Ok((merge_locally(&group), usage));
        }
        Ok((merged, usage))
    }
}
