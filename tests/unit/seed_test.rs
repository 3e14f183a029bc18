//! Tests for seed sources

use std::io::Write;

use fetchlot::core::{SchedulerError, SeedEntry};
use fetchlot::infra::{JsonFileSeed, SeedSource, StaticSeed};

#[test]
fn test_static_seed() {
    let seed = StaticSeed::new(vec![SeedEntry::new("x", 3)]);
    assert_eq!(seed.len(), 1);
    assert!(!seed.is_empty());
    assert_eq!(seed.load().unwrap(), vec![SeedEntry::new("x", 3)]);
    assert!(StaticSeed::default().is_empty());
}

#[test]
fn test_demo_seed_ids_are_unique() {
    let entries = StaticSeed::demo(50).load().unwrap();
    let mut ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[test]
fn test_json_file_seed_duplicates_surface_at_queue_build() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"id": "a", "cost": 1}}, {{"id": "a", "cost": 2}}]"#).unwrap();

    let seed = JsonFileSeed::new(file.path());
    assert_eq!(seed.path(), file.path());
    let entries = seed.load().unwrap();
    let err = fetchlot::core::WorkQueue::new(entries).unwrap_err();
    assert!(matches!(err, SchedulerError::DuplicateItem(_)));
}
