//! Concurrency-limited stream merge.

use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::StrategyKind;
use crate::core::fetcher::guarded_fetch;
use crate::core::{Fetcher, SchedulerError, SharedQueue};

use super::{validate_concurrency, RunReport, Scheduler};

/// Pull-based stream of claims flattened with `buffer_unordered(concurrency)`.
///
/// An item is claimed (and marked `InFlight`) only when the merge operator has
/// a free slot and pulls from the upstream, so the limit passed to
/// `buffer_unordered` is the cap. All fetch futures are polled on the caller's
/// task.
#[derive(Debug, Clone)]
pub struct StreamMergeScheduler {
    concurrency: usize,
}

impl StreamMergeScheduler {
    /// Create a stream-merge scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if `concurrency` is 0.
    pub fn new(concurrency: usize) -> Result<Self, SchedulerError> {
        validate_concurrency(concurrency)?;
        Ok(Self { concurrency })
    }
}

#[async_trait]
impl Scheduler for StreamMergeScheduler {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StreamMerge
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    async fn run<F: Fetcher>(
        &self,
        queue: &SharedQueue,
        fetcher: F,
    ) -> Result<RunReport, SchedulerError> {
        let started = Instant::now();
        // Each claim yields exactly one outcome.
        let mut dispatched: u64 = 0;
        info!(concurrency = self.concurrency, "stream merge scheduler started");

        let claims = {
            let queue = queue.clone();
            stream::iter(std::iter::from_fn(move || {
                let item = queue.claim_next()?;
                debug!(item = %item.id, cost = item.cost, "claimed from stream");
                Some(item)
            }))
        };

        let mut merged = claims
            .map(|item| {
                let fetcher = fetcher.clone();
                async move { guarded_fetch(&fetcher, item).await }
            })
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = merged.next().await {
            dispatched += 1;
            if let Err(failure) = &outcome {
                warn!(item = %failure.item.id, reason = %failure.reason, "fetch failed");
            }
            queue.reconcile(&outcome)?;
        }

        let report = RunReport::collect(
            self.kind(),
            self.concurrency,
            dispatched,
            queue,
            started.elapsed(),
        );
        info!(
            dispatched = report.dispatched,
            completed = report.counts.completed,
            failed = report.counts.failed,
            elapsed_ms = report.elapsed.as_millis(),
            "stream merge scheduler finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SeedEntry, SimulatedFetcher, WorkQueue};

    #[tokio::test]
    async fn test_stream_merge_isolates_failure() {
        let entries = ["a", "b", "c"].map(|id| SeedEntry::new(id, 1));
        let queue = SharedQueue::new(WorkQueue::new(entries).unwrap());
        let scheduler = StreamMergeScheduler::new(2).unwrap();
        let report = scheduler
            .run(&queue, SimulatedFetcher::new().failing_on(["b"]))
            .await
            .unwrap();

        assert_eq!(report.counts.completed, 2);
        assert_eq!(report.counts.failed, 1);
        assert_eq!(report.dispatched, 3);
        assert!(report.peak_in_flight <= 2);
    }
}
