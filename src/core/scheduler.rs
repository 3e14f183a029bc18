//! Bounded-concurrency schedulers.
//!
//! A scheduler drains a [`SharedQueue`] by dispatching pending items to a
//! [`Fetcher`] with at most `concurrency` fetches outstanding, and reconciles
//! every outcome back into the queue. Four strategies implement the same
//! contract with different primitives:
//!
//! - [`RacingScheduler`]: an in-flight set of spawned fetches raced through a
//!   `FuturesUnordered` fan-in, replenished after every completion
//! - [`PipelineScheduler`]: a producer thread feeding consumer threads over a
//!   bounded crossbeam channel, throttled by slot tokens
//! - [`StreamMergeScheduler`]: a lazy stream of claims merged with
//!   `buffer_unordered`
//! - [`WorkerPoolScheduler`]: tokio workers gated by a semaphore
//!
//! Each strategy has exactly one mechanism that enforces the cap. A failed
//! fetch only marks its own item `Failed`; a queue-consistency violation aborts
//! the run.

mod pipeline;
mod racing;
mod stream_merge;
mod worker_pool;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{StrategyKind, MAX_CONCURRENCY};

use super::{Fetcher, SchedulerError, SharedQueue, StatusCounts};

pub use pipeline::PipelineScheduler;
pub use racing::RacingScheduler;
pub use stream_merge::StreamMergeScheduler;
pub use worker_pool::WorkerPoolScheduler;

/// Summary of one scheduler run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Strategy that executed the run.
    pub strategy: StrategyKind,
    /// Concurrency cap the run was configured with.
    pub concurrency: usize,
    /// Number of fetches dispatched.
    pub dispatched: u64,
    /// Final per-status counts.
    pub counts: StatusCounts,
    /// Highest number of simultaneously in-flight items.
    pub peak_in_flight: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunReport {
    pub(crate) fn collect(
        strategy: StrategyKind,
        concurrency: usize,
        dispatched: u64,
        queue: &SharedQueue,
        elapsed: Duration,
    ) -> Self {
        let guard = queue.lock();
        Self {
            run_id: Uuid::new_v4(),
            strategy,
            concurrency,
            dispatched,
            counts: guard.counts(),
            peak_in_flight: guard.peak_in_flight(),
            elapsed,
        }
    }

    /// Whether every item finished successfully.
    #[must_use]
    pub const fn all_completed(&self) -> bool {
        self.counts.failed == 0 && self.counts.pending == 0 && self.counts.in_flight == 0
    }
}

/// Drains a queue under a concurrency cap.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Strategy implemented by this scheduler.
    fn kind(&self) -> StrategyKind;

    /// Maximum number of simultaneously in-flight fetches.
    fn concurrency(&self) -> usize;

    /// Run until the queue has no pending and no in-flight items.
    ///
    /// Individual fetch failures do not fail the run; they are visible in the
    /// report's counts.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::UnknownItem` / `InvalidTransition` on a queue-consistency violation
    /// - `SchedulerError::Worker` if worker infrastructure fails
    async fn run<F: Fetcher>(
        &self,
        queue: &SharedQueue,
        fetcher: F,
    ) -> Result<RunReport, SchedulerError>;
}

pub(crate) fn validate_concurrency(concurrency: usize) -> Result<(), SchedulerError> {
    if concurrency == 0 {
        return Err(SchedulerError::InvalidConfig(
            "concurrency must be greater than 0".into(),
        ));
    }
    if concurrency > MAX_CONCURRENCY {
        return Err(SchedulerError::InvalidConfig(format!(
            "concurrency ({concurrency}) must not exceed {MAX_CONCURRENCY}"
        )));
    }
    Ok(())
}
