//! Tests for the work queue

use fetchlot::core::{
    FetchFailure, ItemStatus, SchedulerError, SeedEntry, SharedQueue, StatusCounts, WorkItem,
    WorkQueue,
};

fn queue(ids: &[&str]) -> WorkQueue {
    WorkQueue::new(ids.iter().map(|id| SeedEntry::new(*id, 1))).unwrap()
}

#[test]
fn test_top_pending_in_seed_order() {
    let q = queue(&["a", "b", "c", "d"]);
    let ids: Vec<_> = q.top_pending(3).into_iter().map(|item| item.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(q.top_pending(10).len(), 4);
    assert!(q.top_pending(0).is_empty());
}

#[test]
fn test_next_pending_skips_claimed() {
    let mut q = queue(&["a", "b", "c"]);
    q.set_status("a", ItemStatus::InFlight).unwrap();
    assert_eq!(q.next_pending().unwrap().id, "b");
    q.set_status("b", ItemStatus::InFlight).unwrap();
    q.set_status("c", ItemStatus::InFlight).unwrap();
    assert!(q.next_pending().is_none());
}

#[test]
fn test_claim_next_marks_in_flight() {
    let mut q = queue(&["a", "b"]);
    let item = q.claim_next().unwrap();
    assert_eq!(item.id, "a");
    assert_eq!(item.status, ItemStatus::InFlight);
    assert_eq!(q.get("a").unwrap().status, ItemStatus::InFlight);
    assert_eq!(q.in_flight_count(), 1);
    assert_eq!(q.pending_count(), 1);
}

#[test]
fn test_lifecycle_violations_rejected() {
    let mut q = queue(&["a"]);
    let err = q.set_status("a", ItemStatus::Completed).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidTransition { .. }));

    q.set_status("a", ItemStatus::InFlight).unwrap();
    q.set_status("a", ItemStatus::Failed).unwrap();
    let err = q.set_status("a", ItemStatus::Completed).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidTransition { .. }));

    let err = q.set_status("zzz", ItemStatus::InFlight).unwrap_err();
    assert!(matches!(err, SchedulerError::UnknownItem(_)));
}

#[test]
fn test_duplicate_seed_rejected() {
    let err = WorkQueue::new(vec![SeedEntry::new("a", 1), SeedEntry::new("a", 2)]).unwrap_err();
    assert!(matches!(err, SchedulerError::DuplicateItem(id) if id == "a"));
}

#[test]
fn test_set_outcome_and_counts() {
    let mut q = queue(&["a", "b", "c"]);
    let a = q.claim_next().unwrap();
    let b = q.claim_next().unwrap();
    q.set_outcome(&Ok(a)).unwrap();
    q.set_outcome(&Err(FetchFailure::new(b, "boom"))).unwrap();

    assert_eq!(
        q.counts(),
        StatusCounts {
            pending: 1,
            in_flight: 0,
            completed: 1,
            failed: 1
        }
    );
    assert_eq!(q.size(), 3);
    assert!(!q.is_drained());
}

#[test]
fn test_peak_in_flight_tracks_maximum() {
    let mut q = queue(&["a", "b", "c"]);
    let a = q.claim_next().unwrap();
    q.claim_next().unwrap();
    q.set_outcome(&Ok(a)).unwrap();
    q.claim_next().unwrap();
    assert_eq!(q.peak_in_flight(), 2);
}

#[test]
fn test_shared_queue_reconcile() {
    let shared = SharedQueue::new(queue(&["a"]));
    let a = shared.claim_next().unwrap();
    assert!(shared.claim_next().is_none());
    shared.reconcile(&Ok(a)).unwrap();
    assert!(shared.lock().is_drained());
    assert_eq!(shared.counts().completed, 1);

    let ghost = shared.reconcile(&Ok(WorkItem::new("ghost", 0))).unwrap_err();
    assert!(ghost.is_consistency_violation());
}

#[test]
fn test_empty_queue() {
    let q = WorkQueue::new(Vec::new()).unwrap();
    assert!(q.is_empty());
    assert!(q.is_drained());
    assert!(q.top_pending(5).is_empty());
}
