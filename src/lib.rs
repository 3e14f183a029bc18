//! # fetchlot
//!
//! A bounded-concurrency scheduler over a mutable work queue, with per-item
//! status tracking and failure isolation.
//!
//! A run drains a [`WorkQueue`](core::WorkQueue) of fetch tasks, each with a
//! simulated cost, keeping at most `C` fetches in flight. Every item moves
//! through `Pending -> InFlight -> {Completed, Failed}` exactly once; a failing
//! fetch marks its own item `Failed` and never cancels or delays the rest of the
//! batch.
//!
//! ## Strategies
//!
//! Four schedulers implement the same contract with different primitives:
//!
//! - **Racing** (reference): spawned fetches raced through a `FuturesUnordered`
//!   fan-in, with one replenishment per completion
//! - **Pipeline**: a producer feeding OS consumer threads over a bounded
//!   crossbeam channel, throttled by slot tokens
//! - **Stream merge**: a lazy claim stream flattened with `buffer_unordered`
//! - **Worker pool**: tokio workers gated by a semaphore
//!
//! For the same input and fetcher behavior they converge to the same final
//! status distribution.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fetchlot::config::{SchedulerConfig, StrategyKind};
//! use fetchlot::core::SimulatedFetcher;
//! use fetchlot::infra::StaticSeed;
//! use fetchlot::runtime::Driver;
//!
//! let config = SchedulerConfig::new(10, StrategyKind::Racing);
//! let report = Driver::new(config, SimulatedFetcher::new().failing_on(["https://example.com/file7.json"]))
//!     .run(&StaticSeed::demo(50))
//!     .await?;
//! assert_eq!(report.counts.failed, 1);
//! ```
//!
//! For complete examples, see:
//! - `tests/scheduler_test.rs` - Cross-strategy integration tests
//! - `src/bin/fetchlot.rs` - Demo run configured from the environment

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: items, queue, fetchers, schedulers.
pub mod core;
/// Configuration models for schedulers.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for seeding the queue.
pub mod infra;
/// Run driver and runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
