//! Semaphore-gated worker pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::StrategyKind;
use crate::core::fetcher::guarded_fetch;
use crate::core::{Fetcher, SchedulerError, SharedQueue};

use super::{validate_concurrency, RunReport, Scheduler};

/// Long-lived tokio workers that take a semaphore permit per item.
///
/// The semaphore holds `concurrency` permits and is the only cap. The worker
/// count is a sizing knob and must be at least `concurrency`, otherwise the
/// worker count would silently become the real limit.
#[derive(Debug, Clone)]
pub struct WorkerPoolScheduler {
    concurrency: usize,
    worker_count: usize,
}

impl WorkerPoolScheduler {
    /// Create a pool with one worker per permit.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if `concurrency` is 0.
    pub fn new(concurrency: usize) -> Result<Self, SchedulerError> {
        validate_concurrency(concurrency)?;
        Ok(Self {
            concurrency,
            worker_count: concurrency,
        })
    }

    /// Use `worker_count` workers competing for the permits.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if `worker_count < concurrency`.
    pub fn with_worker_count(mut self, worker_count: usize) -> Result<Self, SchedulerError> {
        if worker_count < self.concurrency {
            return Err(SchedulerError::InvalidConfig(format!(
                "worker_count ({worker_count}) must be at least concurrency ({})",
                self.concurrency
            )));
        }
        self.worker_count = worker_count;
        Ok(self)
    }

    /// Number of workers spawned per run.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }
}

#[async_trait]
impl Scheduler for WorkerPoolScheduler {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WorkerPool
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
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let dispatched = Arc::new(AtomicU64::new(0));
        // A worker beyond the pending count would exit without claiming anything.
        let spawned = self.worker_count.min(queue.pending_count());

        info!(
            concurrency = self.concurrency,
            worker_count = self.worker_count,
            spawned = spawned,
            "worker pool scheduler started"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..spawned {
            workers.spawn(worker_loop(
                worker_id,
                queue.clone(),
                fetcher.clone(),
                Arc::clone(&permits),
                Arc::clone(&dispatched),
            ));
        }

        let mut first_error = None;
        while let Some(joined) = workers.join_next().await {
            let result = joined.map_err(|e| SchedulerError::Worker(e.to_string())).and_then(|r| r);
            if let Err(e) = result {
                warn!(error = %e, "worker stopped with error");
                // Stop the remaining workers from claiming more items.
                permits.close();
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let report = RunReport::collect(
            self.kind(),
            self.concurrency,
            dispatched.load(Ordering::Relaxed),
            queue,
            started.elapsed(),
        );
        info!(
            dispatched = report.dispatched,
            completed = report.counts.completed,
            failed = report.counts.failed,
            elapsed_ms = report.elapsed.as_millis(),
            "worker pool scheduler finished"
        );
        Ok(report)
    }
}

/// One worker: permit, claim, fetch, reconcile, release; until nothing is pending.
async fn worker_loop<F: Fetcher>(
    worker_id: usize,
    queue: SharedQueue,
    fetcher: F,
    permits: Arc<Semaphore>,
    dispatched: Arc<AtomicU64>,
) -> Result<(), SchedulerError> {
    debug!(worker_id = worker_id, "worker started");
    loop {
        // The permit is taken before claiming so a claimed item is never
        // waiting on a permit while marked in flight.
        let Ok(permit) = permits.acquire().await else {
            debug!(worker_id = worker_id, "permits closed, exiting");
            break;
        };
        let Some(item) = queue.claim_next() else {
            break;
        };
        dispatched.fetch_add(1, Ordering::Relaxed);
        debug!(worker_id = worker_id, item = %item.id, cost = item.cost, "worker fetching");

        let outcome = guarded_fetch(&fetcher, item).await;
        if let Err(failure) = &outcome {
            warn!(worker_id = worker_id, item = %failure.item.id, reason = %failure.reason, "fetch failed");
        }
        queue.reconcile(&outcome)?;
        drop(permit);
    }
    debug!(worker_id = worker_id, "worker exiting");
    Ok(())
}
