//! Producer/consumer pipeline over bounded crossbeam channels.
//!
//! The producer runs on a blocking thread and the consumers are dedicated OS
//! threads, each with its own single-threaded tokio runtime for driving the
//! fetcher.
//!
//! # Design
//!
//! - **Lanes**: `concurrency` clamped to the pending item count. One consumer
//!   thread per lane.
//! - **Slot tokens**: a bounded channel pre-filled with one unit token per
//!   lane. The producer takes one before each claim; a consumer hands it back
//!   after reconciling. This is the only cap.
//! - **Work channel**: bounded to the lane count, so a send never waits once a
//!   token is held.
//! - **Clean shutdown**: dropping the work sender unblocks idle consumers.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use async_trait::async_trait;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::StrategyKind;
use crate::core::fetcher::guarded_fetch;
use crate::core::{Fetcher, SchedulerError, SharedQueue, WorkItem};

use super::{validate_concurrency, RunReport, Scheduler};

/// First fatal error raised by any pipeline thread.
type FailureSlot = Arc<Mutex<Option<SchedulerError>>>;

/// One producer feeding `concurrency` consumer threads.
#[derive(Debug, Clone)]
pub struct PipelineScheduler {
    concurrency: usize,
}

impl PipelineScheduler {
    /// Create a pipeline scheduler.
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
impl Scheduler for PipelineScheduler {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pipeline
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
        info!(concurrency = self.concurrency, "pipeline scheduler started");

        let concurrency = self.concurrency;
        let producer_queue = queue.clone();
        let dispatched = tokio::task::spawn_blocking(move || {
            run_pipeline(concurrency, &producer_queue, &fetcher)
        })
        .await
        .map_err(|e| SchedulerError::Worker(format!("producer thread failed: {e}")))??;

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
            "pipeline scheduler finished"
        );
        Ok(report)
    }
}

/// Producer side. Blocks the calling thread until every consumer has exited.
fn run_pipeline<F: Fetcher>(
    concurrency: usize,
    queue: &SharedQueue,
    fetcher: &F,
) -> Result<u64, SchedulerError> {
    // No more than `pending` slots can ever be occupied.
    let lanes = concurrency.min(queue.pending_count());
    if lanes == 0 {
        return Ok(0);
    }
    debug!(concurrency = concurrency, lanes = lanes, "sizing pipeline");

    let (work_tx, work_rx) = bounded::<WorkItem>(lanes);
    let (slot_tx, slot_rx) = bounded::<()>(lanes);
    for _ in 0..lanes {
        slot_tx
            .send(())
            .map_err(|_| SchedulerError::Worker("slot channel closed".into()))?;
    }

    let failure: FailureSlot = Arc::new(Mutex::new(None));
    let mut consumers = Vec::with_capacity(lanes);
    for worker_id in 0..lanes {
        consumers.push(spawn_consumer(
            worker_id,
            work_rx.clone(),
            slot_tx.clone(),
            queue.clone(),
            fetcher.clone(),
            Arc::clone(&failure),
        )?);
    }
    // Only consumers hold these from here on, so disconnects track consumer exit.
    drop(work_rx);
    drop(slot_tx);

    let mut dispatched: u64 = 0;
    while slot_rx.recv().is_ok() {
        if failure.lock().is_some() {
            break;
        }
        let Some(item) = queue.claim_next() else {
            break;
        };
        dispatched += 1;
        debug!(item = %item.id, cost = item.cost, "producer queued item");
        if work_tx.send(item).is_err() {
            warn!("all consumers exited before the queue drained");
            break;
        }
    }
    drop(work_tx);

    for (worker_id, handle) in consumers.into_iter().enumerate() {
        if handle.join().is_err() {
            warn!(worker_id = worker_id, "consumer thread panicked");
            failure
                .lock()
                .get_or_insert_with(|| SchedulerError::Worker(format!("consumer {worker_id} panicked")));
        }
    }

    let fatal = failure.lock().take();
    fatal.map_or(Ok(dispatched), Err)
}

/// Spawn a consumer thread.
fn spawn_consumer<F: Fetcher>(
    worker_id: usize,
    work_rx: Receiver<WorkItem>,
    slot_tx: Sender<()>,
    queue: SharedQueue,
    fetcher: F,
    failure: FailureSlot,
) -> Result<JoinHandle<()>, SchedulerError> {
    thread::Builder::new()
        .name(format!("fetchlot-consumer-{worker_id}"))
        .spawn(move || {
            debug!(worker_id = worker_id, "consumer thread started");

            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(worker_id = worker_id, error = %e, "failed to create consumer runtime");
                    failure.lock().get_or_insert_with(|| {
                        SchedulerError::Worker(format!("consumer {worker_id} runtime: {e}"))
                    });
                    return;
                }
            };

            // Blocking recv; returns Err once the producer drops the sender.
            while let Ok(item) = work_rx.recv() {
                let outcome = rt.block_on(guarded_fetch(&fetcher, item));
                if let Err(fetch_failure) = &outcome {
                    warn!(
                        worker_id = worker_id,
                        item = %fetch_failure.item.id,
                        reason = %fetch_failure.reason,
                        "fetch failed"
                    );
                }
                let reconciled = queue.reconcile(&outcome);
                // The producer may already be gone.
                let _ = slot_tx.send(());
                if let Err(e) = reconciled {
                    error!(worker_id = worker_id, error = %e, "queue consistency violation");
                    failure.lock().get_or_insert(e);
                    break;
                }
            }

            debug!(worker_id = worker_id, "consumer thread exiting");
        })
        .map_err(|e| SchedulerError::Worker(format!("failed to spawn consumer thread: {e}")))
}
