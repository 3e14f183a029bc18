//! Build a scheduler from configuration.

use async_trait::async_trait;

use crate::config::{SchedulerConfig, StrategyKind};
use crate::core::{
    Fetcher, PipelineScheduler, RacingScheduler, RunReport, Scheduler, SchedulerError,
    SharedQueue, StreamMergeScheduler, WorkerPoolScheduler,
};

/// Any of the four strategies, selected at runtime.
#[derive(Debug, Clone)]
pub enum AnyScheduler {
    /// Racing futures with eager replenishment.
    Racing(RacingScheduler),
    /// Bounded channel pipeline.
    Pipeline(PipelineScheduler),
    /// Concurrency-limited stream merge.
    StreamMerge(StreamMergeScheduler),
    /// Semaphore-gated worker pool.
    WorkerPool(WorkerPoolScheduler),
}

/// Build the scheduler described by `cfg`.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidConfig` if the configuration fails validation.
pub fn build_scheduler(cfg: &SchedulerConfig) -> Result<AnyScheduler, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let scheduler = match cfg.strategy {
        StrategyKind::Racing => AnyScheduler::Racing(RacingScheduler::new(cfg.concurrency)?),
        StrategyKind::Pipeline => AnyScheduler::Pipeline(PipelineScheduler::new(cfg.concurrency)?),
        StrategyKind::StreamMerge => {
            AnyScheduler::StreamMerge(StreamMergeScheduler::new(cfg.concurrency)?)
        }
        StrategyKind::WorkerPool => {
            let pool = WorkerPoolScheduler::new(cfg.concurrency)?;
            let pool = match cfg.worker_count {
                Some(workers) => pool.with_worker_count(workers)?,
                None => pool,
            };
            AnyScheduler::WorkerPool(pool)
        }
    };
    Ok(scheduler)
}

#[async_trait]
impl Scheduler for AnyScheduler {
    fn kind(&self) -> StrategyKind {
        match self {
            Self::Racing(s) => s.kind(),
            Self::Pipeline(s) => s.kind(),
            Self::StreamMerge(s) => s.kind(),
            Self::WorkerPool(s) => s.kind(),
        }
    }

    fn concurrency(&self) -> usize {
        match self {
            Self::Racing(s) => s.concurrency(),
            Self::Pipeline(s) => s.concurrency(),
            Self::StreamMerge(s) => s.concurrency(),
            Self::WorkerPool(s) => s.concurrency(),
        }
    }

    async fn run<F: Fetcher>(
        &self,
        queue: &SharedQueue,
        fetcher: F,
    ) -> Result<RunReport, SchedulerError> {
        match self {
            Self::Racing(s) => s.run(queue, fetcher).await,
            Self::Pipeline(s) => s.run(queue, fetcher).await,
            Self::StreamMerge(s) => s.run(queue, fetcher).await,
            Self::WorkerPool(s) => s.run(queue, fetcher).await,
        }
    }
}
