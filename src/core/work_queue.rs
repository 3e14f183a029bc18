//! Work queue: single owner of all mutable item state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{
    build_transition_event, outcome_item, FetchOutcome, ItemId, ItemStatus, SchedulerError,
    SeedEntry, StatusCounts, TransitionSink, WorkItem,
};

/// Ordered collection of work items with status-filtered queries.
///
/// Items keep their insertion order for the lifetime of the queue and are
/// never removed; finished items are marked terminal instead.
pub struct WorkQueue {
    items: Vec<WorkItem>,
    index: HashMap<ItemId, usize>,
    /// Per-status counts, indexed by `ItemStatus::slot`.
    counts: [usize; 4],
    /// No item before this position is pending. Items never return to
    /// `Pending`, so the cursor only moves forward.
    pending_cursor: usize,
    peak_in_flight: usize,
    seq: u64,
    sink: Option<Box<dyn TransitionSink>>,
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("size", &self.items.len())
            .field("counts", &self.counts())
            .field("peak_in_flight", &self.peak_in_flight)
            .finish_non_exhaustive()
    }
}

impl WorkQueue {
    /// Create a queue of pending items from `(id, cost)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::DuplicateItem` if two entries share an id.
    pub fn new<I>(entries: I) -> Result<Self, SchedulerError>
    where
        I: IntoIterator<Item = SeedEntry>,
    {
        let mut items = Vec::new();
        let mut index = HashMap::new();
        for entry in entries {
            if index.contains_key(&entry.id) {
                return Err(SchedulerError::DuplicateItem(entry.id));
            }
            index.insert(entry.id.clone(), items.len());
            items.push(WorkItem::from(entry));
        }
        let pending = items.len();
        Ok(Self {
            items,
            index,
            counts: [pending, 0, 0, 0],
            pending_cursor: 0,
            peak_in_flight: 0,
            seq: 0,
            sink: None,
        })
    }

    /// Attach a sink that records every applied transition.
    #[must_use]
    pub fn with_transition_sink(mut self, sink: impl TransitionSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Up to `n` pending items in insertion order. Does not change any status.
    #[must_use]
    pub fn top_pending(&self, n: usize) -> Vec<WorkItem> {
        self.items[self.pending_cursor..]
            .iter()
            .filter(|item| item.status == ItemStatus::Pending)
            .take(n)
            .cloned()
            .collect()
    }

    /// First pending item in insertion order. Does not change any status.
    #[must_use]
    pub fn next_pending(&self) -> Option<WorkItem> {
        self.first_pending_position().map(|pos| self.items[pos].clone())
    }

    /// Select the first pending item and mark it `InFlight` in one step.
    pub fn claim_next(&mut self) -> Option<WorkItem> {
        let pos = self.first_pending_position()?;
        self.apply(pos, ItemStatus::InFlight);
        Some(self.items[pos].clone())
    }

    /// Transition the named item to `status`.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::UnknownItem` if the queue does not own `id`
    /// - `SchedulerError::InvalidTransition` if the lifecycle forbids the step
    pub fn set_status(&mut self, id: &str, status: ItemStatus) -> Result<(), SchedulerError> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| SchedulerError::UnknownItem(id.to_owned()))?;
        let from = self.items[pos].status;
        if !from.can_transition_to(status) {
            return Err(SchedulerError::InvalidTransition {
                id: id.to_owned(),
                from,
                to: status,
            });
        }
        self.apply(pos, status);
        Ok(())
    }

    /// Reconcile a fetch outcome: `Completed` on success, `Failed` on failure.
    ///
    /// # Errors
    ///
    /// Same as [`set_status`](Self::set_status).
    pub fn set_outcome(&mut self, outcome: &FetchOutcome) -> Result<(), SchedulerError> {
        let status = if outcome.is_ok() {
            ItemStatus::Completed
        } else {
            ItemStatus::Failed
        };
        self.set_status(&outcome_item(outcome).id, status)
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WorkItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    /// All items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    /// Number of pending items.
    #[must_use]
    pub const fn pending_count(&self) -> usize {
        self.counts[0]
    }

    /// Number of in-flight items.
    #[must_use]
    pub const fn in_flight_count(&self) -> usize {
        self.counts[1]
    }

    /// Number of completed items.
    #[must_use]
    pub const fn completed_count(&self) -> usize {
        self.counts[2]
    }

    /// Number of failed items.
    #[must_use]
    pub const fn failed_count(&self) -> usize {
        self.counts[3]
    }

    /// Snapshot of all per-status counts.
    #[must_use]
    pub const fn counts(&self) -> StatusCounts {
        StatusCounts::from_slots(self.counts)
    }

    /// Total number of items.
    #[must_use]
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// No pending items and no in-flight items remain.
    #[must_use]
    pub const fn is_drained(&self) -> bool {
        self.pending_count() == 0 && self.in_flight_count() == 0
    }

    /// Highest number of simultaneously in-flight items observed so far.
    #[must_use]
    pub const fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }

    fn first_pending_position(&self) -> Option<usize> {
        if self.pending_count() == 0 {
            return None;
        }
        self.items[self.pending_cursor..]
            .iter()
            .position(|item| item.status == ItemStatus::Pending)
            .map(|offset| self.pending_cursor + offset)
    }

    /// Apply an already validated transition and update bookkeeping.
    fn apply(&mut self, pos: usize, to: ItemStatus) {
        let item = &mut self.items[pos];
        let from = item.status;
        item.status = to;

        self.counts[from.slot()] -= 1;
        self.counts[to.slot()] += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.in_flight_count());

        if from == ItemStatus::Pending {
            while self.pending_cursor < self.items.len()
                && self.items[self.pending_cursor].status != ItemStatus::Pending
            {
                self.pending_cursor += 1;
            }
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.record(build_transition_event(self.seq, self.items[pos].id.clone(), from, to));
        }
        self.seq += 1;
    }
}

/// Cloneable handle to a queue shared between a scheduler and its observers.
///
/// Every read and write goes through one mutex, so a claim (select + mark) or a
/// reconcile is never interleaved with another execution context. Guards are
/// short-lived and must not be held across an `.await`.
#[derive(Clone, Debug)]
pub struct SharedQueue {
    inner: Arc<Mutex<WorkQueue>>,
}

impl SharedQueue {
    /// Wrap a queue for shared access.
    #[must_use]
    pub fn new(queue: WorkQueue) -> Self {
        Self {
            inner: Arc::new(Mutex::new(queue)),
        }
    }

    /// Lock the queue for a short critical section.
    pub fn lock(&self) -> MutexGuard<'_, WorkQueue> {
        self.inner.lock()
    }

    /// Claim the next pending item (see [`WorkQueue::claim_next`]).
    #[must_use]
    pub fn claim_next(&self) -> Option<WorkItem> {
        self.inner.lock().claim_next()
    }

    /// Reconcile a fetch outcome (see [`WorkQueue::set_outcome`]).
    ///
    /// # Errors
    ///
    /// Propagates queue-consistency violations.
    pub fn reconcile(&self, outcome: &FetchOutcome) -> Result<(), SchedulerError> {
        self.inner.lock().set_outcome(outcome)
    }

    /// Progress snapshot.
    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        self.inner.lock().counts()
    }

    /// Number of pending items.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending_count()
    }

    /// Total number of items.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    /// Highest in-flight count observed.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.inner.lock().peak_in_flight()
    }
}

impl From<WorkQueue> for SharedQueue {
    fn from(queue: WorkQueue) -> Self {
        Self::new(queue)
    }
}
