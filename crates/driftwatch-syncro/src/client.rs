//! Syncro MSP HTTP client (reqwest-based).

use crate::config::SyncroConfig;
use driftwatch_core::error::{FetchError, FetchResult};
use driftwatch_core::fetch::{self, PageCountSource, PageSource};
use driftwatch_core::orchestrator::DeviceSource;
use driftwatch_core::rate_limit::RateLimiter;
use driftwatch_core::retry::RetryPolicy;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// One Syncro customer asset. Only the fields the comparison needs.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncroAsset {
    pub id: Option<u64>,
    /// Display name; the comparable field.
    pub name: Option<String>,
}

/// `GET customer_assets` payload.
#[derive(Debug, Deserialize)]
struct AssetsPage {
    #[serde(default)]
    assets: Vec<SyncroAsset>,
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    total_pages: u32,
}

/// Client for the Syncro MSP API.
///
/// Owns its rate limiter and retry policy; cloning shares both, so page
/// tasks spawned from a clone still throttle against the same bucket.
#[derive(Debug, Clone)]
pub struct SyncroClient {
    config: Arc<SyncroConfig>,
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl SyncroClient {
    /// Create a new client.
    ///
    /// Fails with `InvalidConfiguration` when the API key or subdomain is
    /// empty, or when the HTTP client cannot be built.
    pub fn new(config: SyncroConfig) -> FetchResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(FetchError::invalid_configuration("Syncro API key is empty"));
        }
        if config.subdomain.trim().is_empty() && config.base_url.is_none() {
            return Err(FetchError::invalid_configuration(
                "Syncro subdomain is empty",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("driftwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                FetchError::invalid_configuration(format!("failed to build HTTP client: {e}"))
            })?;

        let limiter = Arc::new(RateLimiter::with_burst(
            config.requests_per_second,
            config.burst,
            "Syncro API",
        ));
        let retry = config.retry.clone();

        Ok(Self {
            config: Arc::new(config),
            http,
            limiter,
            retry,
        })
    }

    /// Fetch one page of `customer_assets`, with rate limiting and retry.
    async fn assets_page(&self, page: u32) -> FetchResult<AssetsPage> {
        let url = format!("{}/customer_assets", self.config.resolved_base_url());

        self.retry
            .execute("syncro customer_assets", || {
                let url = url.clone();
                async move {
                    self.limiter.acquire().await;

                    let response = self
                        .http
                        .get(&url)
                        .query(&[("page", page.to_string())])
                        .query(&[("api_key", self.config.api_key.as_str())])
                        .header(reqwest::header::ACCEPT, "application/json")
                        .send()
                        .await?;

                    let status = response.status();
                    if !status.is_success() {
                        return Err(FetchError::from_status(
                            status,
                            format!("syncro customer_assets page {page}"),
                        ));
                    }

                    let body: AssetsPage = response.json().await.map_err(|e| {
                        FetchError::parse(format!("syncro assets page {page}: {e}"))
                    })?;

                    debug!(page, assets = body.assets.len(), "fetched syncro assets page");
                    Ok(body)
                }
            })
            .await
    }
}

#[async_trait]
impl PageSource for SyncroClient {
    type Record = SyncroAsset;

    async fn fetch_page(&self, page: u32) -> FetchResult<Vec<SyncroAsset>> {
        Ok(self.assets_page(page).await?.assets)
    }
}

#[async_trait]
impl PageCountSource for SyncroClient {
    /// Probe `meta.total_pages` from the first assets page.
    ///
    /// A response without the metadata is a parse error, never a silent
    /// one-page fallback: an incomplete comparison is worse than a failed
    /// one.
    async fn total_pages(&self) -> FetchResult<u32> {
        let page = self.assets_page(1).await?;
        match page.meta {
            Some(meta) => Ok(meta.total_pages),
            None => Err(FetchError::parse(
                "syncro assets response is missing 'meta.total_pages'",
            )),
        }
    }
}

#[async_trait]
impl DeviceSource for SyncroClient {
    type Record = SyncroAsset;

    fn label(&self) -> &str {
        "Syncro"
    }

    async fn fetch_all(&self) -> FetchResult<Vec<SyncroAsset>> {
        let source = Arc::new(self.clone());
        fetch::fetch_all_parallel(&source, self.config.max_pages).await
    }

    fn device_name<'a>(&self, record: &'a SyncroAsset) -> Option<&'a str> {
        record.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let err = SyncroClient::new(SyncroConfig::new("", "acme")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_subdomain_rejected_without_override() {
        let err = SyncroClient::new(SyncroConfig::new("key", "")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_subdomain_allowed_with_base_url_override() {
        let config = SyncroConfig::new("key", "").with_base_url("http://127.0.0.1:1");
        assert!(SyncroClient::new(config).is_ok());
    }

    #[test]
    fn test_assets_payload_tolerates_missing_assets_key() {
        let page: AssetsPage =
            serde_json::from_str(r#"{"meta": {"total_pages": 3}}"#).expect("should deserialize");
        assert!(page.assets.is_empty());
        assert_eq!(page.meta.unwrap().total_pages, 3);
    }
}
