//! Error types for scheduler operations.

use thiserror::Error;

use super::{ItemId, ItemStatus};

/// Errors produced by queue and scheduler components.
///
/// Item-level fetch failures are not errors at this level: they end up as
/// [`ItemStatus::Failed`] on the item and never abort a run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A status change referenced an item the queue does not own.
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    /// A status change violated the item lifecycle.
    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        /// Item identifier.
        id: ItemId,
        /// Status before the attempted change.
        from: ItemStatus,
        /// Requested status.
        to: ItemStatus,
    },
    /// The seed contained the same identifier twice.
    #[error("duplicate item: {0}")]
    DuplicateItem(ItemId),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Worker infrastructure failed (thread panic, runtime construction, closed semaphore).
    #[error("worker error: {0}")]
    Worker(String),
    /// Seed file could not be read.
    #[error("seed io error: {0}")]
    Io(#[from] std::io::Error),
    /// Seed or config document could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Whether this error signals a broken invariant between scheduler and queue.
    #[must_use]
    pub const fn is_consistency_violation(&self) -> bool {
        matches!(self, Self::UnknownItem(_) | Self::InvalidTransition { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
