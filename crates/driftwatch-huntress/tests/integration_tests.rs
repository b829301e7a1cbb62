//! Integration tests for the Huntress client using wiremock.
//!
//! Cover the sequential until-empty walk, basic-auth and query wiring,
//! the required `agents` response key, and retry classification.

use driftwatch_core::error::FetchError;
use driftwatch_core::orchestrator::DeviceSource;
use driftwatch_core::retry::RetryPolicy;
use driftwatch_huntress::{HuntressClient, HuntressConfig};
use serde_json::json;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> HuntressConfig {
    HuntressConfig::new("test-key", "test-secret")
        .with_base_url(base_url)
        .with_retry(RetryPolicy::disabled())
}

fn agents_body(hostnames: &[&str]) -> serde_json::Value {
    let agents: Vec<_> = hostnames
        .iter()
        .enumerate()
        .map(|(i, hostname)| json!({"id": i + 1, "hostname": hostname}))
        .collect();
    json!({"agents": agents})
}

async fn mount_page(server: &MockServer, page: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/agents"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_all_walks_until_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, agents_body(&["SRV-01", "SRV-02"])).await;
    mount_page(&server, 2, agents_body(&["SRV-03"])).await;
    mount_page(&server, 3, agents_body(&[])).await;

    let client = HuntressClient::new(test_config(&server.uri())).unwrap();
    let hostnames: Vec<String> = client
        .fetch_all()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|a| a.hostname)
        .collect();

    // Sequential walk preserves page order.
    assert_eq!(hostnames, ["SRV-01", "SRV-02", "SRV-03"]);
}

#[tokio::test]
async fn test_fetch_all_stops_at_max_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 1, agents_body(&["SRV-01"])).await;
    mount_page(&server, 2, agents_body(&["SRV-02"])).await;

    Mock::given(method("GET"))
        .and(path("/agents"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(agents_body(&["SRV-03"])))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server.uri()).with_max_pages(2);
    let client = HuntressClient::new(config).unwrap();
    let agents = client.fetch_all().await.unwrap();

    assert_eq!(agents.len(), 2);
}

#[tokio::test]
async fn test_sends_basic_auth_and_page_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents"))
        .and(basic_auth("test-key", "test-secret"))
        .and(query_param("limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(agents_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HuntressClient::new(test_config(&server.uri())).unwrap();
    let agents = client.fetch_all().await.unwrap();

    assert!(agents.is_empty());
}

#[tokio::test]
async fn test_missing_agents_key_is_parse_error() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"data": []})).await;

    let client = HuntressClient::new(test_config(&server.uri())).unwrap();
    let err = client.fetch_all().await.unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }), "got {err}");
}

#[tokio::test]
async fn test_server_errors_are_retried_then_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2) // initial call + 1 retry
        .mount(&server)
        .await;

    let config = test_config(&server.uri()).with_retry(RetryPolicy::new(1, 1));
    let client = HuntressClient::new(config).unwrap();
    let err = client.fetch_all().await.unwrap_err();

    assert!(matches!(err, FetchError::MaxRetriesExceeded { .. }), "got {err}");
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri()).with_retry(RetryPolicy::new(5, 1));
    let client = HuntressClient::new(config).unwrap();
    let err = client.fetch_all().await.unwrap_err();

    match err {
        FetchError::Http { status, .. } => assert_eq!(status, 401),
        other => panic!("expected Http error, got {other}"),
    }
}
