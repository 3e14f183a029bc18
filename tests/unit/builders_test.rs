//! Tests for scheduler builders

use fetchlot::builders::{build_scheduler, AnyScheduler};
use fetchlot::config::{SchedulerConfig, StrategyKind};
use fetchlot::core::{Scheduler, SchedulerError};

#[test]
fn test_build_each_strategy() {
    for kind in StrategyKind::ALL {
        let scheduler = build_scheduler(&SchedulerConfig::new(5, kind)).unwrap();
        assert_eq!(scheduler.kind(), kind);
        assert_eq!(scheduler.concurrency(), 5);
    }
}

#[test]
fn test_build_worker_pool_with_workers() {
    let cfg = SchedulerConfig::new(2, StrategyKind::WorkerPool).with_worker_count(6);
    match build_scheduler(&cfg).unwrap() {
        AnyScheduler::WorkerPool(pool) => assert_eq!(pool.worker_count(), 6),
        other => panic!("unexpected scheduler: {other:?}"),
    }
}

#[test]
fn test_build_rejects_invalid_config() {
    let err = build_scheduler(&SchedulerConfig::new(0, StrategyKind::Racing)).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}
