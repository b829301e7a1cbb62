//! Paged fetch strategies for upstream inventory listings.
//!
//! Two strategies are supported:
//!
//! - [`fetch_all_parallel`] for services that report a total page count up
//!   front (fan out one task per page onto a bounded pool);
//! - [`fetch_until_empty`] for services that don't (walk pages sequentially
//!   until one comes back empty).
//!
//! Rate limiting is the page source's concern: its `fetch_page`
//! implementation acquires a token from the service's
//! [`RateLimiter`](crate::rate_limit::RateLimiter) before the network call,
//! so both strategies throttle identically.

use crate::error::{FetchError, FetchResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Maximum number of in-flight page fetches per parallel batch.
pub const MAX_PARALLEL_PAGE_FETCHES: usize = 10;

/// One page of an upstream paginated collection. Pages are numbered from 1.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Raw record type returned by this upstream.
    type Record: Send + 'static;

    /// Fetch a single page of records.
    ///
    /// An empty vec means the page exists but holds no records (the
    /// sequential strategy treats it as end-of-collection).
    async fn fetch_page(&self, page: u32) -> FetchResult<Vec<Self::Record>>;
}

/// A page source whose upstream reports the total page count.
#[async_trait]
pub trait PageCountSource: PageSource {
    /// Probe the upstream for the total number of pages.
    ///
    /// A probe failure is a hard error for the whole fetch; there is no
    /// silent fallback to a single page.
    async fn total_pages(&self) -> FetchResult<u32>;
}

/// Metadata-driven parallel strategy.
///
/// Probes the total page count once, clamps it to `max_pages`, then fetches
/// every page concurrently on a pool of at most
/// [`MAX_PARALLEL_PAGE_FETCHES`] in-flight requests. Records are
/// concatenated in arrival order; callers that need a deterministic order
/// must impose it themselves (the reconciliation engine does).
///
/// The first page failure aborts the batch and is surfaced as the batch
/// error. Tasks not yet started are cancelled; in-flight HTTP requests are
/// not forcibly interrupted.
pub async fn fetch_all_parallel<S>(source: &Arc<S>, max_pages: u32) -> FetchResult<Vec<S::Record>>
where
    S: PageCountSource + 'static,
{
    let total = source.total_pages().await?;
    let clamped = total.min(max_pages);

    debug!(total_pages = total, clamped, "starting parallel page fetch");

    if clamped <= 1 {
        return source.fetch_page(1).await;
    }

    let permits = (clamped as usize).min(MAX_PARALLEL_PAGE_FETCHES);
    let semaphore = Arc::new(Semaphore::new(permits));
    let mut tasks: JoinSet<FetchResult<Vec<S::Record>>> = JoinSet::new();

    for page in 1..=clamped {
        let source = Arc::clone(source);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| FetchError::TaskFailed {
                    message: "fetch pool closed".to_string(),
                })?;
            source.fetch_page(page).await
        });
    }

    let mut records = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(page_records)) => records.extend(page_records),
            // Dropping the JoinSet on this return path cancels the
            // tasks that have not completed yet.
            Ok(Err(err)) => return Err(err),
            Err(join_err) => {
                return Err(FetchError::TaskFailed {
                    message: join_err.to_string(),
                })
            }
        }
    }

    debug!(records = records.len(), pages = clamped, "parallel page fetch complete");
    Ok(records)
}

/// Sequential probe strategy, for upstreams with no total-count metadata.
///
/// Fetches pages 1, 2, 3, … in order, stopping at the first empty page or
/// at `max_pages`. Any page failure aborts immediately with no partial
/// result.
pub async fn fetch_until_empty<S>(source: &S, max_pages: u32) -> FetchResult<Vec<S::Record>>
where
    S: PageSource,
{
    let mut records = Vec::new();

    for page in 1..=max_pages {
        let page_records = source.fetch_page(page).await?;
        if page_records.is_empty() {
            debug!(page, "empty page, stopping sequential fetch");
            break;
        }
        records.extend(page_records);
    }

    debug!(records = records.len(), "sequential page fetch complete");
    Ok(records)
}
