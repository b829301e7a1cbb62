//! # driftwatch core
//!
//! Rate-limited concurrent fetch layer and reconciliation engine for
//! comparing device inventory across two asset-tracking services.
//!
//! The crate knows nothing about concrete upstreams. Each service is
//! plugged in behind two seams:
//!
//! - [`PageSource`] / [`PageCountSource`] - fetch one page of raw records
//!   (with or without a total-page-count probe);
//! - [`DeviceSource`] - fetch a complete inventory and expose the
//!   comparable name field of a record.
//!
//! ## Example
//!
//! ```ignore
//! use driftwatch_core::prelude::*;
//!
//! let orchestrator = FetchOrchestrator::new(syncro, huntress)
//!     .with_options(ReconcileOptions::default());
//! let result = orchestrator.run().await?;
//!
//! for row in &result.rows {
//!     println!("{} | {} | {:?}", row.left, row.right, row.status);
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`rate_limit`] - per-service token-bucket rate limiter
//! - [`retry`] - exponential backoff for transient transport failures
//! - [`fetch`] - parallel and sequential paged fetch strategies
//! - [`normalize`] - raw name to canonical comparison key
//! - [`reconcile`] - side maps, match classification, deterministic ordering
//! - [`orchestrator`] - two-sided concurrent fetch + reconcile
//! - [`error`] - error types with transient/permanent classification

pub mod error;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod rate_limit;
pub mod reconcile;
pub mod retry;

pub use error::{FetchError, FetchResult};
pub use fetch::{PageCountSource, PageSource};
pub use orchestrator::{DeviceSource, FetchOrchestrator};

/// Prelude module for convenient imports.
///
/// ```
/// use driftwatch_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{FetchError, FetchResult};
    pub use crate::fetch::{
        fetch_all_parallel, fetch_until_empty, PageCountSource, PageSource,
        MAX_PARALLEL_PAGE_FETCHES,
    };
    pub use crate::normalize::{normalize, normalize_with, MAX_NAME_WIDTH};
    pub use crate::orchestrator::{DeviceSource, FetchOrchestrator};
    pub use crate::rate_limit::RateLimiter;
    pub use crate::reconcile::{
        ComparisonResult, ComparisonRow, MatchStatus, ReconcileOptions, SortOrder,
    };
    pub use crate::retry::RetryPolicy;
}

// Re-export async_trait for source implementors
pub use async_trait::async_trait;
