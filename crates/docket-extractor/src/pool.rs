//! Bounded-concurrency execution of independent remote-call jobs

use crate::error::ExtractorError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Run `jobs` with at most `limiter`'s permits in flight, returning results in job order
///
/// Fails on the first job error: no further job is started, and those still
/// running are aborted when the `JoinSet` is dropped, as are all of them if
/// this future is dropped.
pub async fn run_bounded<T, Fut>(jobs: Vec<Fut>, limiter: &Arc<Semaphore>) -> Result<Vec<T>, ExtractorError>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, ExtractorError>> + Send + 'static,
{
    let count = jobs.len();
    let mut set = JoinSet::new();
    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();

    for (idx, job) in jobs.into_iter().enumerate() {
        // Collect finished jobs while waiting for a permit so a failure stops further spawns
        let permit = loop {
            tokio::select! {
                biased;
                Some(joined) = set.join_next() => {
                    let (done, value) = joined??;
                    debug!("Job {}/{} finished", done + 1, count);
                    slots[done] = Some(value);
                }
                acquired = Arc::clone(limiter).acquire_owned() => {
                    break acquired.map_err(|e| ExtractorError::Join(format!("worker pool closed: {}", e)))?;
                }
            }
        };
        set.spawn(async move {
            let _permit = permit;
            job.await.map(|value| (idx, value))
        });
    }

    while let Some(joined) = set.join_next().await {
        let (idx, value) = joined??;
        debug!("Job {}/{} finished", idx + 1, count);
        slots[idx] = Some(value);
    }

    Ok(slots.into_iter().flatten().collect())
}
