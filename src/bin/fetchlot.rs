//! Demo run: drains a seeded queue with the simulated fetcher.
//!
//! Configuration comes from the environment (see `SchedulerConfig::from_env`),
//! plus `FETCHLOT_SEED_FILE` (JSON seed path) or `FETCHLOT_ITEMS` (demo seed
//! size, default 50) and `FETCHLOT_FAIL` (comma-separated ids to fail).

use std::time::Duration;

use anyhow::Context;
use fetchlot::config::SchedulerConfig;
use fetchlot::core::{AppResult, SimulatedFetcher, TracingTransitionSink};
use fetchlot::infra::{JsonFileSeed, SeedSource, StaticSeed};
use fetchlot::runtime::{build_runtime, Driver};
use fetchlot::util::init_tracing;

const DEFAULT_ITEMS: usize = 50;

fn main() -> AppResult<()> {
    init_tracing();

    let config = SchedulerConfig::from_env().map_err(anyhow::Error::msg)?;
    let seed: Box<dyn SeedSource> = match std::env::var("FETCHLOT_SEED_FILE") {
        Ok(path) => Box::new(JsonFileSeed::new(path)),
        Err(_) => {
            let items = match std::env::var("FETCHLOT_ITEMS") {
                Ok(raw) => raw.trim().parse().context("FETCHLOT_ITEMS must be a count")?,
                Err(_) => DEFAULT_ITEMS,
            };
            Box::new(StaticSeed::demo(items))
        }
    };
    let failing: Vec<String> = std::env::var("FETCHLOT_FAIL")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let runtime = build_runtime(config.runtime_threads).context("failed to build runtime")?;
    let driver = Driver::new(config, SimulatedFetcher::new().failing_on(failing))
        .with_transition_sink(TracingTransitionSink)
        .with_progress_interval(Duration::from_secs(1));
    let report = runtime.block_on(driver.run(seed.as_ref()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
