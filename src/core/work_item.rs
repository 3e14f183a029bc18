//! Work item data model: identity, cost, and lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a work item (typically the URL to fetch).
pub type ItemId = String;

/// Lifecycle status of a work item.
///
/// Legal transitions are `Pending -> InFlight -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Waiting to be dispatched.
    Pending,
    /// A fetch has been dispatched and has not settled yet.
    InFlight,
    /// The fetch succeeded.
    Completed,
    /// The fetch failed.
    Failed,
}

impl ItemStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::InFlight, Self::Completed, Self::Failed];

    /// Whether no further transition is allowed out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InFlight)
                | (Self::InFlight, Self::Completed | Self::Failed)
        )
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Pending => 0,
            Self::InFlight => 1,
            Self::Completed => 2,
            Self::Failed => 3,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One `(id, cost)` pair used to populate a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    /// Item identifier.
    pub id: ItemId,
    /// Simulated cost in cost units.
    pub cost: u64,
}

impl SeedEntry {
    /// Create a seed entry.
    pub fn new(id: impl Into<ItemId>, cost: u64) -> Self {
        Self { id: id.into(), cost }
    }
}

/// A single schedulable task.
///
/// The queue owns the authoritative copy; schedulers and fetchers work with
/// clones and report back by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stable unique identity.
    pub id: ItemId,
    /// Simulated duration in cost units.
    pub cost: u64,
    /// Current lifecycle status.
    pub status: ItemStatus,
}

impl WorkItem {
    /// Create a pending item.
    pub fn new(id: impl Into<ItemId>, cost: u64) -> Self {
        Self {
            id: id.into(),
            cost,
            status: ItemStatus::Pending,
        }
    }
}

impl From<SeedEntry> for WorkItem {
    fn from(entry: SeedEntry) -> Self {
        Self::new(entry.id, entry.cost)
    }
}

/// Per-status item counts at one observation point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Items still waiting.
    pub pending: usize,
    /// Items with an outstanding fetch.
    pub in_flight: usize,
    /// Items whose fetch succeeded.
    pub completed: usize,
    /// Items whose fetch failed.
    pub failed: usize,
}

impl StatusCounts {
    /// Sum over all statuses.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.in_flight + self.completed + self.failed
    }

    /// Count for a single status.
    #[must_use]
    pub const fn get(&self, status: ItemStatus) -> usize {
        match status {
            ItemStatus::Pending => self.pending,
            ItemStatus::InFlight => self.in_flight,
            ItemStatus::Completed => self.completed,
            ItemStatus::Failed => self.failed,
        }
    }

    pub(crate) const fn from_slots(slots: [usize; 4]) -> Self {
        Self {
            pending: slots[0],
            in_flight: slots[1],
            completed: slots[2],
            failed: slots[3],
        }
    }
}
