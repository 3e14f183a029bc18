//! Tests for runtime adapters and the run driver

use std::sync::Arc;
use std::time::Duration;

use fetchlot::config::{SchedulerConfig, StrategyKind};
use fetchlot::core::SimulatedFetcher;
use fetchlot::infra::{SeedSource, StaticSeed};
use fetchlot::runtime::{build_runtime, Driver};

#[test]
fn test_build_runtime_and_drive() {
    let rt = build_runtime(Some(2)).unwrap();
    let seed = StaticSeed::demo(10);
    let fetcher = SimulatedFetcher::new()
        .with_unit(Duration::from_micros(5))
        .failing_on(["https://example.com/file3.json"]);

    let report = rt
        .block_on(Driver::new(SchedulerConfig::new(3, StrategyKind::WorkerPool), fetcher).run(&seed))
        .unwrap();

    assert_eq!(report.counts.completed, 9);
    assert_eq!(report.counts.failed, 1);
    assert_eq!(report.strategy, StrategyKind::WorkerPool);
}

#[test]
fn test_driver_with_trait_object_seed() {
    let rt = build_runtime(None).unwrap();
    let seed: Box<dyn SeedSource> = Box::new(StaticSeed::demo(4));
    let fetcher = SimulatedFetcher::new().with_unit(Duration::ZERO);

    let report = rt
        .block_on(Driver::new(SchedulerConfig::new(2, StrategyKind::Pipeline), fetcher).run(seed.as_ref()))
        .unwrap();
    assert!(report.all_completed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_driver_run_can_be_spawned() {
    let seed: Arc<dyn SeedSource> = Arc::new(StaticSeed::demo(6));
    let fetcher = SimulatedFetcher::new().with_unit(Duration::ZERO);
    let driver = Driver::new(SchedulerConfig::new(3, StrategyKind::StreamMerge), fetcher);

    let handle = tokio::spawn(async move { driver.run(seed.as_ref()).await });
    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.counts.completed, 6);
}
