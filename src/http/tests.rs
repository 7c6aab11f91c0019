//! Tests for the HTTP client module

use super::*;
use crate::auth::AuthConfig;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_auth(config, AuthConfig::bearer("up:yeah:test").unwrap()).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("upbank/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.up.com.au/api/v1")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(
        config.base_url,
        Some("https://api.up.com.au/api/v1".to_string())
    );
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page[size]", "100")
        .query_opt("filter[status]", Some("SETTLED"))
        .query_opt("filter[tag]", None::<String>)
        .timeout(Duration::from_secs(5))
        .retries(0);

    assert_eq!(
        config.query,
        vec![
            ("page[size]".to_string(), "100".to_string()),
            ("filter[status]".to_string(), "SETTLED".to_string()),
        ]
    );
    assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    assert_eq!(config.max_retries, Some(0));
}

#[tokio::test]
async fn test_get_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/util/ping"))
        .and(header("Authorization", "Bearer up:yeah:test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meta": {"id": "abc", "statusEmoji": "⚡️"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get("/util/ping", RequestConfig::new()).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_get_sends_query_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(query_param("page[size]", "2"))
        .and(query_param("filter[accountType]", "SAVER"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = RequestConfig::new()
        .query("page[size]", "2")
        .query("filter[accountType]", "SAVER");
    let response = client.get("/accounts", request).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_client_error_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get("/accounts/missing", RequestConfig::new()).await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_on_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get("/transactions", RequestConfig::new()).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("Rate limited"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get("/transactions", RequestConfig::new()).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limit_without_retry_after_uses_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let started = std::time::Instant::now();
    let response = client
        .get("/transactions", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_retry_after_is_capped_by_max_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3600"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    // max_backoff is one second
    let client = client_for(&mock_server);
    let started = std::time::Instant::now();
    let response = client
        .get("/transactions", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_rate_limited_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get("/transactions", RequestConfig::new().retries(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Unavailable"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get("/transactions", RequestConfig::new().retries(2))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_absolute_url_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc-1/transactions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("https://api.up.com.au/api/v1")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::None).unwrap();

    let response = client
        .get(
            &format!("{}/accounts/acc-1/transactions", mock_server.uri()),
            RequestConfig::new(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[test_case("/accounts", "https://api.up.com.au/api/v1/accounts" ; "leading slash")]
#[test_case("accounts", "https://api.up.com.au/api/v1/accounts" ; "no leading slash")]
#[test_case("https://other.example/x", "https://other.example/x" ; "absolute")]
fn test_build_url(input: &str, expected: &str) {
    let config = HttpClientConfig::builder()
        .base_url("https://api.up.com.au/api/v1/")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::None).unwrap();
    assert_eq!(client.build_url(input), expected);
}

#[test_case(BackoffType::Constant, 0, 100 ; "constant first")]
#[test_case(BackoffType::Constant, 5, 100 ; "constant later")]
#[test_case(BackoffType::Linear, 2, 300 ; "linear")]
#[test_case(BackoffType::Exponential, 3, 800 ; "exponential")]
#[test_case(BackoffType::Exponential, 10, 5000 ; "exponential capped")]
fn test_calculate_backoff(backoff: BackoffType, attempt: u32, expected_ms: u64) {
    let config = HttpClientConfig::builder()
        .backoff(
            backoff,
            Duration::from_millis(100),
            Duration::from_secs(5),
        )
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::None).unwrap();

    assert_eq!(
        client.calculate_backoff(attempt),
        Duration::from_millis(expected_ms)
    );
}

#[test]
fn test_http_client_debug_hides_token() {
    let client = HttpClient::with_auth(
        HttpClientConfig::default(),
        AuthConfig::bearer("up:yeah:secret").unwrap(),
    )
    .unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(!debug_str.contains("secret"));
    assert!(debug_str.contains("has_rate_limiter: true"));
}
