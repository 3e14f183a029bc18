//! Run driver: seed a queue, run one scheduler to completion, report.

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::builders::build_scheduler;
use crate::config::SchedulerConfig;
use crate::core::{AppResult, Fetcher, RunReport, Scheduler, SharedQueue, TransitionSink, WorkQueue};
use crate::infra::SeedSource;

/// Orchestrates one full run.
///
/// # Example
///
/// ```rust,ignore
/// use fetchlot::config::SchedulerConfig;
/// use fetchlot::core::SimulatedFetcher;
/// use fetchlot::infra::StaticSeed;
/// use fetchlot::runtime::Driver;
///
/// let report = Driver::new(SchedulerConfig::default(), SimulatedFetcher::new())
///     .run(&StaticSeed::demo(50))
///     .await?;
/// println!("{} completed in {:?}", report.counts.completed, report.elapsed);
/// ```
pub struct Driver<F: Fetcher> {
    config: SchedulerConfig,
    fetcher: F,
    sink: Option<Box<dyn TransitionSink>>,
    progress_interval: Option<Duration>,
}

impl<F: Fetcher> Driver<F> {
    /// Create a driver for the given configuration and fetcher.
    pub fn new(config: SchedulerConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            sink: None,
            progress_interval: None,
        }
    }

    /// Record every status transition of the run into `sink`.
    #[must_use]
    pub fn with_transition_sink(mut self, sink: impl TransitionSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Log queue progress every `interval` while the run is active.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Configuration the driver runs with.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Load `seed`, build the configured scheduler, and run until drained.
    ///
    /// Item failures are reported in the returned counts, not as an error.
    ///
    /// # Errors
    ///
    /// Invalid configuration, seed load failure, or a fatal scheduler error.
    pub async fn run<S: SeedSource + ?Sized>(self, seed: &S) -> AppResult<RunReport> {
        let entries = seed.load().context("failed to load seed")?;
        let mut queue = WorkQueue::new(entries).context("failed to build work queue")?;
        if let Some(sink) = self.sink {
            queue = queue.with_transition_sink(sink);
        }
        let queue = SharedQueue::new(queue);
        Self::run_queue(&self.config, self.fetcher, &queue, self.progress_interval).await
    }

    async fn run_queue(
        config: &SchedulerConfig,
        fetcher: F,
        queue: &SharedQueue,
        progress_interval: Option<Duration>,
    ) -> AppResult<RunReport> {
        let scheduler = build_scheduler(config).context("invalid scheduler configuration")?;
        info!(
            strategy = %scheduler.kind(),
            concurrency = scheduler.concurrency(),
            items = queue.size(),
            "run started"
        );

        let reporter = progress_interval.map(|interval| {
            let observed = queue.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let counts = observed.counts();
                    info!(
                        pending = counts.pending,
                        in_flight = counts.in_flight,
                        completed = counts.completed,
                        failed = counts.failed,
                        "progress"
                    );
                }
            })
        });

        let result = scheduler.run(queue, fetcher).await;
        if let Some(reporter) = reporter {
            reporter.abort();
        }
        let report = result.context("scheduler run failed")?;

        info!(
            run_id = %report.run_id,
            strategy = %report.strategy,
            completed = report.counts.completed,
            failed = report.counts.failed,
            peak_in_flight = report.peak_in_flight,
            elapsed_ms = report.elapsed.as_millis(),
            "run finished"
        );
        Ok(report)
    }
}
