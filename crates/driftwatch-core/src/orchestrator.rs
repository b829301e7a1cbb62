//! Fetch orchestration: run both sides concurrently, then reconcile.
//!
//! The orchestrator owns no HTTP detail. Each side is a [`DeviceSource`]
//! that knows how to fetch its complete inventory (picking its own paging
//! strategy) and how to read a device name out of one of its records.

use crate::error::{FetchError, FetchResult};
use crate::reconcile::{reconcile, ComparisonResult, ReconcileOptions};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A complete inventory source for one upstream service.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Raw record type for this service.
    type Record: Send + 'static;

    /// Human-readable service label ("Syncro", "Huntress").
    fn label(&self) -> &str;

    /// Fetch the full inventory, using whatever paging strategy suits the
    /// upstream. Any page failure fails the whole fetch.
    async fn fetch_all(&self) -> FetchResult<Vec<Self::Record>>;

    /// Read the comparable name field from a record, if present.
    fn device_name<'a>(&self, record: &'a Self::Record) -> Option<&'a str>;
}

/// Runs the two sides' fetch pipelines concurrently and hands the record
/// lists to the reconciliation engine.
///
/// Cancellation is cooperative: the token is checked before the fetch phase
/// starts and again between fetch and reconcile. A dispatched fetch batch
/// runs to its terminal state regardless.
pub struct FetchOrchestrator<L, R> {
    left: L,
    right: R,
    options: ReconcileOptions,
    cancel: CancellationToken,
}

impl<L, R> FetchOrchestrator<L, R>
where
    L: DeviceSource,
    R: DeviceSource,
{
    /// Create an orchestrator with default options and a fresh cancellation
    /// token.
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            options: ReconcileOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Override reconciliation options.
    #[must_use]
    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle for requesting cancellation from another task.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the full comparison: fetch both sides concurrently, wait for
    /// both to reach a terminal state, then reconcile.
    ///
    /// If either side fails there is no partial result; the left side's
    /// error takes precedence when both fail, so the surfaced error is
    /// deterministic.
    pub async fn run(&self) -> FetchResult<ComparisonResult> {
        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        debug!(
            left = self.left.label(),
            right = self.right.label(),
            "fetching both inventories"
        );

        // join! (not try_join!) so both fetches always complete; an early
        // return on the first error would leave the other side's batch
        // unobserved.
        let (left_records, right_records) =
            tokio::join!(self.left.fetch_all(), self.right.fetch_all());
        let left_records = left_records?;
        let right_records = right_records?;

        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let result = reconcile(
            &left_records,
            &right_records,
            |r| self.left.device_name(r),
            |r| self.right.device_name(r),
            &self.options,
        );

        info!(
            left = self.left.label(),
            right = self.right.label(),
            left_records = left_records.len(),
            right_records = right_records.len(),
            left_devices = result.left_count,
            right_devices = result.right_count,
            rows = result.rows.len(),
            "comparison complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::MatchStatus;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};

    struct StaticSource {
        label: &'static str,
        names: Vec<&'static str>,
        delay: Duration,
        fail: bool,
        fetch_calls: AtomicU32,
    }

    impl StaticSource {
        fn new(label: &'static str, names: Vec<&'static str>) -> Self {
            Self {
                label,
                names,
                delay: Duration::ZERO,
                fail: false,
                fetch_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl DeviceSource for StaticSource {
        type Record = String;

        fn label(&self) -> &str {
            self.label
        }

        async fn fetch_all(&self) -> FetchResult<Vec<String>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(FetchError::transport(format!("{} is down", self.label)));
            }
            Ok(self.names.iter().map(|n| n.to_string()).collect())
        }

        fn device_name<'a>(&self, record: &'a String) -> Option<&'a str> {
            Some(record.as_str())
        }
    }

    #[tokio::test]
    async fn test_happy_path_produces_comparison() {
        let left = StaticSource::new("Syncro", vec!["BOTH-PC", "LEFT-ONLY"]);
        let right = StaticSource::new("Huntress", vec!["both-pc"]);

        let result = FetchOrchestrator::new(left, right).run().await.unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.left_count, 2);
        assert_eq!(result.right_count, 1);
        assert_eq!(result.rows[0].status, MatchStatus::MissingOnRight);
        assert_eq!(result.rows[1].status, MatchStatus::Matched);
    }

    #[tokio::test]
    async fn test_sides_fetch_concurrently() {
        let mut left = StaticSource::new("left", vec![]);
        let mut right = StaticSource::new("right", vec![]);
        left.delay = Duration::from_millis(50);
        right.delay = Duration::from_millis(50);

        let start = Instant::now();
        FetchOrchestrator::new(left, right).run().await.unwrap();

        assert!(
            start.elapsed() < Duration::from_millis(90),
            "sequential fetch would take >= 100ms, took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_failing_side_fails_the_run() {
        let left = StaticSource::new("left", vec!["A"]);
        let mut right = StaticSource::new("right", vec![]);
        right.fail = true;

        let err = FetchOrchestrator::new(left, right).run().await.unwrap_err();
        assert!(err.to_string().contains("right is down"));
    }

    #[tokio::test]
    async fn test_left_error_takes_precedence_when_both_fail() {
        let mut left = StaticSource::new("left", vec![]);
        let mut right = StaticSource::new("right", vec![]);
        left.fail = true;
        right.fail = true;

        let err = FetchOrchestrator::new(left, right).run().await.unwrap_err();
        assert!(err.to_string().contains("left is down"));
    }

    #[tokio::test]
    async fn test_other_side_still_completes_when_one_fails() {
        let mut left = StaticSource::new("left", vec![]);
        left.fail = true;
        let right = StaticSource::new("right", vec!["B"]);

        let orchestrator = FetchOrchestrator::new(left, right);
        let _ = orchestrator.run().await.unwrap_err();

        assert_eq!(orchestrator.right.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let left = StaticSource::new("left", vec!["A"]);
        let right = StaticSource::new("right", vec!["B"]);

        let orchestrator = FetchOrchestrator::new(left, right);
        orchestrator.cancellation_token().cancel();

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
        assert_eq!(orchestrator.left.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.right.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_mid_run_skips_reconcile() {
        let mut left = StaticSource::new("left", vec!["A"]);
        left.delay = Duration::from_millis(30);
        let right = StaticSource::new("right", vec!["B"]);

        let orchestrator = FetchOrchestrator::new(left, right);
        let token = orchestrator.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
        // The fetch phase was already dispatched and ran to completion.
        assert_eq!(orchestrator.left.fetch_calls.load(Ordering::SeqCst), 1);
    }
}
