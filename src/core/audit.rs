//! Transition audit trail.
//!
//! A [`TransitionSink`] attached to a [`WorkQueue`](super::WorkQueue) sees every
//! status change the queue applies, in the order it applies them.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{ItemId, ItemStatus};
use crate::util::clock::now_ms;

/// One applied status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Monotonic sequence number within the queue.
    pub seq: u64,
    /// Item identifier.
    pub item: ItemId,
    /// Status before the change.
    pub from: ItemStatus,
    /// Status after the change.
    pub to: ItemStatus,
    /// Timestamp milliseconds.
    pub at_ms: u128,
}

/// Transition sink abstraction.
pub trait TransitionSink: Send {
    /// Record a transition.
    fn record(&mut self, event: TransitionEvent);
}

impl<T: TransitionSink + ?Sized> TransitionSink for Box<T> {
    fn record(&mut self, event: TransitionEvent) {
        (**self).record(event);
    }
}

/// In-memory sink with a bounded buffer.
///
/// Clones share the same buffer, so a test can keep one handle while the queue
/// owns another.
#[derive(Clone)]
pub struct InMemoryTransitionSink {
    events: Arc<Mutex<VecDeque<TransitionEvent>>>,
    max_events: usize,
}

impl InMemoryTransitionSink {
    /// Create a new in-memory sink holding at most `max_events` events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(4096)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Events recorded for one item, oldest first.
    #[must_use]
    pub fn history(&self, item: &str) -> Vec<TransitionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.item == item)
            .cloned()
            .collect()
    }
}

impl TransitionSink for InMemoryTransitionSink {
    fn record(&mut self, event: TransitionEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that emits each transition as a `tracing` debug event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTransitionSink;

impl TransitionSink for TracingTransitionSink {
    fn record(&mut self, event: TransitionEvent) {
        tracing::debug!(
            seq = event.seq,
            item = %event.item,
            from = %event.from,
            to = %event.to,
            "status transition"
        );
    }
}

/// Helper to build a transition event stamped with the current time.
pub fn build_transition_event(
    seq: u64,
    item: impl Into<ItemId>,
    from: ItemStatus,
    to: ItemStatus,
) -> TransitionEvent {
    TransitionEvent {
        seq,
        item: item.into(),
        from,
        to,
        at_ms: now_ms(),
    }
}
