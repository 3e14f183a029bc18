//! Core scheduling abstractions: items, the work queue, fetchers, and schedulers.

pub mod audit;
pub mod error;
pub mod fetcher;
pub mod scheduler;
pub mod work_item;
pub mod work_queue;

pub use audit::{
    build_transition_event, InMemoryTransitionSink, TracingTransitionSink, TransitionEvent,
    TransitionSink,
};
pub use error::{AppResult, SchedulerError};
pub use fetcher::{outcome_item, FetchFailure, FetchOutcome, Fetcher, SimulatedFetcher};
pub use scheduler::{
    PipelineScheduler, RacingScheduler, RunReport, Scheduler, StreamMergeScheduler,
    WorkerPoolScheduler,
};
pub use work_item::{ItemId, ItemStatus, SeedEntry, StatusCounts, WorkItem};
pub use work_queue::{SharedQueue, WorkQueue};
