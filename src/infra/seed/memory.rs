//! In-memory seed list.

use crate::core::{SchedulerError, SeedEntry};

use super::SeedSource;

/// Seed backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticSeed {
    entries: Vec<SeedEntry>,
}

impl StaticSeed {
    /// Create a seed from explicit entries.
    #[must_use]
    pub const fn new(entries: Vec<SeedEntry>) -> Self {
        Self { entries }
    }

    /// `count` entries `https://example.com/file{i}.json` with costs cycling
    /// through `100..=1000` in steps of 100.
    #[must_use]
    pub fn demo(count: usize) -> Self {
        let entries = (1..=count)
            .map(|i| {
                let cost = ((i - 1) % 10 + 1) as u64 * 100;
                SeedEntry::new(format!("https://example.com/file{i}.json"), cost)
            })
            .collect();
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the seed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SeedSource for StaticSeed {
    fn load(&self) -> Result<Vec<SeedEntry>, SchedulerError> {
        Ok(self.entries.clone())
    }
}
