//! Huntress client configuration.

use driftwatch_core::retry::RetryPolicy;
use std::time::Duration;

/// Huntress's documented API rate limit, requests per second.
pub const HUNTRESS_RATE_LIMIT: f64 = 60.0;

/// Agents returned per page (Huntress maximum).
pub const DEFAULT_PAGE_LIMIT: u32 = 500;

/// Hard ceiling on agent pages fetched per run.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Production API endpoint for the agents listing.
pub const HUNTRESS_API_URL: &str = "https://api.huntress.io/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`HuntressClient`](crate::HuntressClient).
#[derive(Debug, Clone)]
pub struct HuntressConfig {
    /// Huntress API key (basic-auth username).
    pub api_key: String,

    /// Huntress secret key (basic-auth password).
    pub secret_key: String,

    /// Base URL override; used by tests to point at a mock server.
    pub base_url: Option<String>,

    /// Token refill rate for the rate limiter. The bucket capacity equals
    /// the rate (one second of burst).
    pub requests_per_second: f64,

    /// Agents requested per page.
    pub page_limit: u32,

    /// Hard ceiling on pages fetched per run.
    pub max_pages: u32,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retry policy for transient transport failures.
    pub retry: RetryPolicy,
}

impl HuntressConfig {
    /// Create a config with Huntress's documented limits.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            base_url: None,
            requests_per_second: HUNTRESS_RATE_LIMIT,
            page_limit: DEFAULT_PAGE_LIMIT,
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

    /// Override the per-page agent limit.
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// The effective base URL, without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(HUNTRESS_API_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_limits() {
        let config = HuntressConfig::new("key", "secret");
        assert_eq!(config.requests_per_second, HUNTRESS_RATE_LIMIT);
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.resolved_base_url(), "https://api.huntress.io/v1");
    }

    #[test]
    fn test_base_url_override() {
        let config = HuntressConfig::new("key", "secret").with_base_url("http://localhost:8080/");
        assert_eq!(config.resolved_base_url(), "http://localhost:8080");
    }
}
