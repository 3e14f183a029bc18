//! Fetch collaborator: the trait schedulers dispatch to, and a simulated implementation.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use thiserror::Error;

use super::{ItemId, WorkItem};

/// A failed fetch. Always carries the item it was dispatched for.
#[derive(Debug, Clone, Error)]
#[error("fetch of {} failed: {reason}", item.id)]
pub struct FetchFailure {
    /// The item whose fetch failed.
    pub item: WorkItem,
    /// Human-readable cause.
    pub reason: String,
}

impl FetchFailure {
    /// Create a failure for `item`.
    pub fn new(item: WorkItem, reason: impl Into<String>) -> Self {
        Self {
            item,
            reason: reason.into(),
        }
    }
}

/// Outcome of one fetch: the item on success, the item plus cause on failure.
pub type FetchOutcome = Result<WorkItem, FetchFailure>;

/// Identity of the item an outcome refers to, on either path.
#[must_use]
pub fn outcome_item(outcome: &FetchOutcome) -> &WorkItem {
    match outcome {
        Ok(item) => item,
        Err(failure) => &failure.item,
    }
}

/// Performs the work for one item.
///
/// Implementations must not touch the work queue; the scheduler reconciles
/// the returned outcome.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use fetchlot::core::{FetchFailure, FetchOutcome, Fetcher, WorkItem};
///
/// #[derive(Clone)]
/// struct HttpFetcher { client: reqwest::Client }
///
/// #[async_trait]
/// impl Fetcher for HttpFetcher {
///     async fn fetch(&self, item: WorkItem) -> FetchOutcome {
///         match self.client.get(&item.id).send().await {
///             Ok(_) => Ok(item),
///             Err(e) => Err(FetchFailure::new(item, e.to_string())),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync + Clone + 'static {
    /// Fetch one item. May suspend for an arbitrary duration.
    async fn fetch(&self, item: WorkItem) -> FetchOutcome;
}

/// Fetcher that sleeps for `cost * unit` and fails for a configured set of ids.
#[derive(Debug, Clone)]
pub struct SimulatedFetcher {
    unit: Duration,
    failing: Arc<HashSet<ItemId>>,
}

impl Default for SimulatedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedFetcher {
    /// One cost unit is one millisecond; every fetch succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unit: Duration::from_millis(1),
            failing: Arc::new(HashSet::new()),
        }
    }

    /// Set the wall-clock duration of one cost unit.
    #[must_use]
    pub const fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Make fetches of the given ids fail.
    #[must_use]
    pub fn failing_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        self.failing = Arc::new(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Delay applied to an item of the given cost.
    #[must_use]
    pub fn delay_for(&self, cost: u64) -> Duration {
        self.unit
            .saturating_mul(u32::try_from(cost).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl Fetcher for SimulatedFetcher {
    async fn fetch(&self, item: WorkItem) -> FetchOutcome {
        let wait = self.delay_for(item.cost);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        if self.failing.contains(&item.id) {
            return Err(FetchFailure::new(item, "simulated failure"));
        }
        Ok(item)
    }
}

/// Run a fetch, turning a panic inside the fetcher into a failure for that item.
pub(crate) async fn guarded_fetch<F: Fetcher>(fetcher: &F, item: WorkItem) -> FetchOutcome {
    match AssertUnwindSafe(fetcher.fetch(item.clone())).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => Err(FetchFailure::new(
            item,
            format!("fetcher panicked: {}", panic_message(panic.as_ref())),
        )),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, item: WorkItem) -> FetchOutcome {
            if item.cost > 0 {
                panic!("boom");
            }
            Ok(item)
        }
    }

    #[tokio::test]
    async fn test_simulated_fetch_succeeds() {
        let fetcher = SimulatedFetcher::new().with_unit(Duration::ZERO);
        let item = WorkItem::new("a", 5);
        let outcome = fetcher.fetch(item.clone()).await;
        assert_eq!(outcome.unwrap(), item);
    }

    #[tokio::test]
    async fn test_simulated_failure_carries_item() {
        let fetcher = SimulatedFetcher::new()
            .with_unit(Duration::ZERO)
            .failing_on(["b"]);
        let outcome = fetcher.fetch(WorkItem::new("b", 1)).await;
        let failure = outcome.unwrap_err();
        assert_eq!(failure.item.id, "b");
        assert_eq!(failure.to_string(), "fetch of b failed: simulated failure");
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_delay_scales_with_cost() {
        let fetcher = SimulatedFetcher::new().with_unit(Duration::from_millis(10));
        assert_eq!(fetcher.delay_for(3), Duration::from_millis(30));

        let start = tokio::time::Instant::now();
        fetcher.fetch(WorkItem::new("c", 3)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_guarded_fetch_converts_panic() {
        let outcome = guarded_fetch(&PanickingFetcher, WorkItem::new("p", 1)).await;
        let failure = outcome.unwrap_err();
        assert_eq!(failure.item.id, "p");
        assert!(failure.reason.contains("boom"));

        let ok = guarded_fetch(&PanickingFetcher, WorkItem::new("q", 0)).await;
        assert!(ok.is_ok());
    }
}
