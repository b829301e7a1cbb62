//! Huntress HTTP client (reqwest-based).

use crate::config::HuntressConfig;
use driftwatch_core::error::{FetchError, FetchResult};
use driftwatch_core::fetch::{self, PageSource};
use driftwatch_core::orchestrator::DeviceSource;
use driftwatch_core::rate_limit::RateLimiter;
use driftwatch_core::retry::RetryPolicy;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// One Huntress agent. Only the fields the comparison needs.
#[derive(Debug, Clone, Deserialize)]
pub struct HuntressAgent {
    pub id: Option<u64>,
    /// Machine hostname; the comparable field.
    pub hostname: Option<String>,
}

/// `GET /v1/agents` payload. The `agents` key is required; a body without
/// it fails deserialization and surfaces as a parse error.
#[derive(Debug, Deserialize)]
struct AgentsPage {
    agents: Vec<HuntressAgent>,
}

/// Client for the Huntress API.
#[derive(Debug, Clone)]
pub struct HuntressClient {
    config: Arc<HuntressConfig>,
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl HuntressClient {
    /// Create a new client.
    ///
    /// Fails with `InvalidConfiguration` when either credential is empty,
    /// or when the HTTP client cannot be built.
    pub fn new(config: HuntressConfig) -> FetchResult<Self> {
        if config.api_key.trim().is_empty() || config.secret_key.trim().is_empty() {
            return Err(FetchError::invalid_configuration(
                "Huntress API key and secret key are required",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("driftwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                FetchError::invalid_configuration(format!("failed to build HTTP client: {e}"))
            })?;

        let limiter = Arc::new(RateLimiter::new(config.requests_per_second, "Huntress API"));
        let retry = config.retry.clone();

        Ok(Self {
            config: Arc::new(config),
            http,
            limiter,
            retry,
        })
    }

    /// Fetch one page of agents, with rate limiting and retry.
    async fn agents_page(&self, page: u32) -> FetchResult<Vec<HuntressAgent>> {
        let url = format!("{}/agents", self.config.resolved_base_url());

        self.retry
            .execute("huntress agents", || {
                let url = url.clone();
                async move {
                    self.limiter.acquire().await;

                    let response = self
                        .http
                        .get(&url)
                        .basic_auth(&self.config.api_key, Some(&self.config.secret_key))
                        .query(&[
                            ("page", page.to_string()),
                            ("limit", self.config.page_limit.to_string()),
                        ])
                        .send()
                        .await?;

                    let status = response.status();
                    if !status.is_success() {
                        return Err(FetchError::from_status(
                            status,
                            format!("huntress agents page {page}"),
                        ));
                    }

                    let body: AgentsPage = response.json().await.map_err(|e| {
                        FetchError::parse(format!("huntress agents page {page}: {e}"))
                    })?;

                    debug!(page, agents = body.agents.len(), "fetched huntress agents page");
                    Ok(body.agents)
                }
            })
            .await
    }
}

#[async_trait]
impl PageSource for HuntressClient {
    type Record = HuntressAgent;

    async fn fetch_page(&self, page: u32) -> FetchResult<Vec<HuntressAgent>> {
        self.agents_page(page).await
    }
}

#[async_trait]
impl DeviceSource for HuntressClient {
    type Record = HuntressAgent;

    fn label(&self) -> &str {
        "Huntress"
    }

    /// Huntress reports no total page count, so walk pages sequentially
    /// until one comes back empty.
    async fn fetch_all(&self) -> FetchResult<Vec<HuntressAgent>> {
        fetch::fetch_until_empty(self, self.config.max_pages).await
    }

    fn device_name<'a>(&self, record: &'a HuntressAgent) -> Option<&'a str> {
        record.hostname.as_deref()
    }
}
