//! Racing futures with eager replenishment.
//!
//! The loop owns the in-flight set outright. Fetches run as spawned tokio tasks;
//! their join handles are raced through a single `FuturesUnordered`, so each
//! completion costs O(1) instead of rebuilding a select over every handle.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::StrategyKind;
use crate::core::fetcher::guarded_fetch;
use crate::core::{
    FetchFailure, FetchOutcome, Fetcher, ItemStatus, SchedulerError, SharedQueue, WorkItem,
};

use super::{validate_concurrency, RunReport, Scheduler};

/// Keeps exactly `concurrency` fetches in flight (fewer while draining).
#[derive(Debug, Clone)]
pub struct RacingScheduler {
    concurrency: usize,
}

impl RacingScheduler {
    /// Create a racing scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if `concurrency` is 0.
    pub fn new(concurrency: usize) -> Result<Self, SchedulerError> {
        validate_concurrency(concurrency)?;
        Ok(Self { concurrency })
    }

    /// Mark `item` in flight, then spawn its fetch.
    ///
    /// Marking happens before the task exists so an observer never sees a
    /// running item as pending.
    fn dispatch<F: Fetcher>(
        queue: &SharedQueue,
        fetcher: &F,
        item: WorkItem,
    ) -> Result<impl Future<Output = FetchOutcome> + Send + 'static, SchedulerError> {
        queue
            .lock()
            .set_status(&item.id, ItemStatus::InFlight)?;
        debug!(item = %item.id, cost = item.cost, "dispatching fetch");

        let fetcher = fetcher.clone();
        let task_item = item.clone();
        let handle = tokio::spawn(async move { guarded_fetch(&fetcher, task_item).await });

        Ok(FetchTask { item, handle }.join())
    }
}

/// A spawned fetch owned by the in-flight set.
///
/// Dropping it before completion aborts the task, so a run that stops early
/// does not leave fetches running behind it.
struct FetchTask {
    item: WorkItem,
    handle: JoinHandle<FetchOutcome>,
}

impl FetchTask {
    async fn join(mut self) -> FetchOutcome {
        match (&mut self.handle).await {
            Ok(outcome) => outcome,
            // Cancelled or aborted; the item still needs a terminal status.
            Err(e) => Err(FetchFailure::new(
                self.item.clone(),
                format!("fetch task aborted: {e}"),
            )),
        }
    }
}

impl Drop for FetchTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[async_trait]
impl Scheduler for RacingScheduler {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Racing
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
        let mut outstanding = FuturesUnordered::new();
        let mut dispatched: u64 = 0;

        let seed = queue.lock().top_pending(self.concurrency);
        info!(
            concurrency = self.concurrency,
            seed = seed.len(),
            "racing scheduler started"
        );
        for item in seed {
            outstanding.push(Self::dispatch(queue, &fetcher, item)?);
            dispatched += 1;
        }

        while !outstanding.is_empty() || queue.pending_count() > 0 {
            if let Some(outcome) = outstanding.next().await {
                match &outcome {
                    Ok(item) => debug!(item = %item.id, "fetch completed"),
                    Err(failure) => {
                        warn!(item = %failure.item.id, reason = %failure.reason, "fetch failed");
                    }
                }
                queue.reconcile(&outcome)?;
            }

            while outstanding.len() < self.concurrency {
                let Some(next) = queue.lock().next_pending() else {
                    break;
                };
                outstanding.push(Self::dispatch(queue, &fetcher, next)?);
                dispatched += 1;
            }
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
            "racing scheduler finished"
        );
        Ok(report)
    }
}
