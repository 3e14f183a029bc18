//! Scheduler configuration structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Concurrency cap used when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Largest accepted concurrency cap: the permit limit of a tokio semaphore.
pub const MAX_CONCURRENCY: usize = tokio::sync::Semaphore::MAX_PERMITS;

const ENV_CONCURRENCY: &str = "FETCHLOT_CONCURRENCY";
const ENV_STRATEGY: &str = "FETCHLOT_STRATEGY";
const ENV_WORKERS: &str = "FETCHLOT_WORKERS";
const ENV_RUNTIME_THREADS: &str = "FETCHLOT_RUNTIME_THREADS";

/// Scheduling strategy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Racing futures with eager replenishment.
    #[default]
    Racing,
    /// Producer thread and consumer threads over a bounded channel.
    Pipeline,
    /// Lazy claim stream merged with a concurrency limit.
    StreamMerge,
    /// Semaphore-gated worker tasks.
    WorkerPool,
}

impl StrategyKind {
    /// All strategies.
    pub const ALL: [Self; 4] = [Self::Racing, Self::Pipeline, Self::StreamMerge, Self::WorkerPool];

    /// Configuration name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Racing => "racing",
            Self::Pipeline => "pipeline",
            Self::StreamMerge => "stream_merge",
            Self::WorkerPool => "worker_pool",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strategy `{s}`"))
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of simultaneously in-flight fetches.
    pub concurrency: usize,
    /// Strategy used to enforce the cap.
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Worker tasks for the worker-pool strategy (defaults to `concurrency`).
    #[serde(default)]
    pub worker_count: Option<usize>,
    /// Tokio runtime worker threads (defaults to the CPU count).
    #[serde(default)]
    pub runtime_threads: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            strategy: StrategyKind::default(),
            worker_count: None,
            runtime_threads: None,
        }
    }
}

impl SchedulerConfig {
    /// Config with the given cap and strategy.
    #[must_use]
    pub fn new(concurrency: usize, strategy: StrategyKind) -> Self {
        Self {
            concurrency,
            strategy,
            ..Self::default()
        }
    }

    /// Set the worker count for the worker-pool strategy.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = Some(worker_count);
        self
    }

    /// Set the runtime thread count.
    #[must_use]
    pub const fn with_runtime_threads(mut self, threads: usize) -> Self {
        self.runtime_threads = Some(threads);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".into());
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(format!(
                "concurrency ({}) must not exceed {MAX_CONCURRENCY}",
                self.concurrency
            ));
        }
        if let Some(workers) = self.worker_count {
            if self.strategy != StrategyKind::WorkerPool {
                return Err(format!(
                    "worker_count only applies to the worker_pool strategy, not `{}`",
                    self.strategy
                ));
            }
            if workers < self.concurrency {
                return Err(format!(
                    "worker_count ({workers}) must be at least concurrency ({})",
                    self.concurrency
                ));
            }
        }
        if self.runtime_threads == Some(0) {
            return Err("runtime_threads must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading `.env` first
    /// if present. Unset variables fall back to defaults.
    ///
    /// Recognized variables: `FETCHLOT_CONCURRENCY`, `FETCHLOT_STRATEGY`,
    /// `FETCHLOT_WORKERS`, `FETCHLOT_RUNTIME_THREADS`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparsable or invalid value.
    pub fn from_env() -> Result<Self, String> {
        if let Some(e) = unexpected_dotenv_error(dotenvy::dotenv()) {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparsable or invalid value.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, String>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            cfg.concurrency = parse_count(ENV_CONCURRENCY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STRATEGY) {
            cfg.strategy = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_WORKERS) {
            cfg.worker_count = Some(parse_count(ENV_WORKERS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_RUNTIME_THREADS) {
            cfg.runtime_threads = Some(parse_count(ENV_RUNTIME_THREADS, &raw)?);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// A missing `.env` is normal; anything else is worth reporting.
fn unexpected_dotenv_error<T>(result: Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse()
        .map_err(|e| format!("{key}: invalid value `{raw}`: {e}"))
}
