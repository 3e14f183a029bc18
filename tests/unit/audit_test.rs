//! Tests for the transition audit trail

use fetchlot::core::{InMemoryTransitionSink, ItemStatus, SeedEntry, WorkQueue};

#[test]
fn test_queue_records_transitions_in_order() {
    let sink = InMemoryTransitionSink::new(16);
    let mut q = WorkQueue::new(vec![SeedEntry::new("a", 1), SeedEntry::new("b", 1)])
        .unwrap()
        .with_transition_sink(sink.clone());

    let a = q.claim_next().unwrap();
    q.claim_next().unwrap();
    q.set_outcome(&Ok(a)).unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
    assert_eq!(events[2].item, "a");
    assert_eq!(events[2].from, ItemStatus::InFlight);
    assert_eq!(events[2].to, ItemStatus::Completed);
}

#[test]
fn test_rejected_transition_is_not_recorded() {
    let sink = InMemoryTransitionSink::new(16);
    let mut q = WorkQueue::new(vec![SeedEntry::new("a", 1)])
        .unwrap()
        .with_transition_sink(sink.clone());

    assert!(q.set_status("a", ItemStatus::Failed).is_err());
    assert!(sink.events().is_empty());
}
