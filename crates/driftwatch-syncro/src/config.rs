//! Syncro MSP client configuration.

use driftwatch_core::retry::RetryPolicy;
use std::time::Duration;

/// Syncro's documented API rate limit, requests per second.
pub const SYNCRO_RATE_LIMIT: f64 = 3.0;

/// Syncro's burst allowance (180 requests per minute window).
pub const SYNCRO_BURST: f64 = 180.0;

/// Hard ceiling on asset pages fetched per run.
pub const DEFAULT_MAX_PAGES: u32 = 50;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`SyncroClient`](crate::SyncroClient).
#[derive(Debug, Clone)]
pub struct SyncroConfig {
    /// Syncro API key, sent as the `api_key` query parameter.
    pub api_key: String,

    /// Account subdomain (`{subdomain}.syncromsp.com`).
    pub subdomain: String,

    /// Base URL override. When unset, derived from the subdomain. Used by
    /// tests to point at a mock server.
    pub base_url: Option<String>,

    /// Token refill rate for the rate limiter.
    pub requests_per_second: f64,

    /// Burst capacity for the rate limiter.
    pub burst: f64,

    /// Hard ceiling on pages fetched per run.
    pub max_pages: u32,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retry policy for transient transport failures.
    pub retry: RetryPolicy,
}

impl SyncroConfig {
    /// Create a config with Syncro's documented limits.
    pub fn new(api_key: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            subdomain: subdomain.into(),
            base_url: None,
            requests_per_second: SYNCRO_RATE_LIMIT,
            burst: SYNCRO_BURST,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at an explicit base URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the page ceiling.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Override the rate limiter parameters.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: f64, burst: f64) -> Self {
        self.requests_per_second = requests_per_second;
        self.burst = burst;
        self
    }

    /// The effective base URL, without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.syncromsp.com/api/v1", self.subdomain),
        }
    }
}
