//! Configuration models for schedulers and the run driver.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, StrategyKind, DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
