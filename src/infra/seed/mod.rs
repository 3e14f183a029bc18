//! Seed sources: where the initial `(id, cost)` list comes from.

pub mod file;
pub mod memory;

pub use file::JsonFileSeed;
pub use memory::StaticSeed;

use crate::core::{SchedulerError, SeedEntry};

/// Abstraction for seed backends.
pub trait SeedSource: Send + Sync {
    /// Load the ordered seed entries.
    ///
    /// # Errors
    ///
    /// Backend-specific load or parse failures.
    fn load(&self) -> Result<Vec<SeedEntry>, SchedulerError>;
}
