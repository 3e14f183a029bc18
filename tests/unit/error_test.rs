//! Tests for error types

use fetchlot::core::{ItemStatus, SchedulerError};

#[test]
fn test_unknown_item_error() {
    let err = SchedulerError::UnknownItem("a".to_string());
    assert_eq!(format!("{}", err), "unknown item: a");
    assert!(err.is_consistency_violation());
}

#[test]
fn test_invalid_transition_error() {
    let err = SchedulerError::InvalidTransition {
        id: "a".to_string(),
        from: ItemStatus::Completed,
        to: ItemStatus::InFlight,
    };
    assert_eq!(format!("{}", err), "invalid transition for a: completed -> in_flight");
    assert!(err.is_consistency_violation());
}

#[test]
fn test_config_error_is_not_a_violation() {
    let err = SchedulerError::InvalidConfig("concurrency must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: concurrency must be greater than 0"
    );
    assert!(!err.is_consistency_violation());
}

#[test]
fn test_duplicate_item_error() {
    let err = SchedulerError::DuplicateItem("x".to_string());
    assert_eq!(format!("{}", err), "duplicate item: x");
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: SchedulerError = io.into();
    assert!(matches!(err, SchedulerError::Io(_)));
    assert_eq!(format!("{}", err), "seed io error: gone");
}
