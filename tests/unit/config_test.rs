//! Tests for configuration validation

use fetchlot::config::{SchedulerConfig, StrategyKind, DEFAULT_CONCURRENCY};

#[test]
fn test_default_config() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.concurrency, DEFAULT_CONCURRENCY);
    assert_eq!(cfg.strategy, StrategyKind::Racing);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_zero_concurrency_rejected() {
    let cfg = SchedulerConfig::new(0, StrategyKind::Pipeline);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_worker_count_rules() {
    let ok = SchedulerConfig::new(4, StrategyKind::WorkerPool).with_worker_count(4);
    assert!(ok.validate().is_ok());

    let too_few = SchedulerConfig::new(4, StrategyKind::WorkerPool).with_worker_count(3);
    assert!(too_few.validate().is_err());

    let wrong_strategy = SchedulerConfig::new(4, StrategyKind::Racing).with_worker_count(8);
    let err = wrong_strategy.validate().unwrap_err();
    assert!(err.contains("worker_pool"));
}

#[test]
fn test_zero_runtime_threads_rejected() {
    let cfg = SchedulerConfig::default().with_runtime_threads(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "concurrency": 3,
        "strategy": "stream_merge",
        "worker_count": null,
        "runtime_threads": 2
    }"#;
    let cfg = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.concurrency, 3);
    assert_eq!(cfg.strategy, StrategyKind::StreamMerge);
    assert_eq!(cfg.runtime_threads, Some(2));
}

#[test]
fn test_config_from_json_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"concurrency": 0, "strategy": "racing"}"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup_bad_strategy() {
    let err = SchedulerConfig::from_lookup(|k| {
        (k == "FETCHLOT_STRATEGY").then(|| "select".to_string())
    })
    .unwrap_err();
    assert!(err.contains("select"));
}
