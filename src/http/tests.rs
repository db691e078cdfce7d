//! Tests for the HTTP client module

use super::*;
use crate::auth::AuthConfig;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert!(config.timeout.is_none());
    assert!(config.base_url.is_none());
    assert!(config.user_agent.starts_with("kindsync/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[tokio::test]
async fn test_http_client_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "datasets": [{"id": "p:d"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let json: serde_json::Value = client.get_json("/projects/p/datasets").await.unwrap();
    assert_eq!(json["datasets"][0]["id"], "p:d");
}

#[tokio::test]
async fn test_http_client_post_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tables"))
        .and(body_json(serde_json::json!({"name": "Person"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "t1"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let json: serde_json::Value = client
        .post_json("tables", &serde_json::json!({"name": "Person"}))
        .await
        .unwrap();
    assert_eq!(json["id"], "t1");
}

#[tokio::test]
async fn test_http_client_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("X-Custom", "custom-value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .header("X-Custom", "custom-value")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert!(client.get("/ping").await.is_ok());
}

#[tokio::test]
async fn test_http_client_absolute_url_ignores_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("http://127.0.0.1:1")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let url = format!("{}/elsewhere", mock_server.uri());
    assert!(client.get(&url).await.is_ok());
}

#[tokio::test]
async fn test_http_client_status_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/insert"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .post("/insert", &serde_json::json!({}))
        .await
        .unwrap_err();

    match &err {
        crate::Error::HttpStatus { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "backend unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_http_client_with_bearer_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder().base_url(mock_server.uri()).build();
    let client = HttpClient::with_auth(
        config,
        AuthConfig::Bearer {
            token: "secret-token".to_string(),
        },
    )
    .unwrap();

    assert!(client.get("/secure").await.is_ok());
}

#[tokio::test]
async fn test_http_client_connection_error() {
    let config = HttpClientConfig::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client.get("/nothing").await.unwrap_err();
    assert!(matches!(err, crate::Error::Http(_)));
}

// ============================================================================
// Providers
// ============================================================================

#[test]
fn test_lazy_provider_builds_once() {
    let provider = LazyClientProvider::new(HttpClientConfig::default(), AuthConfig::None);
    assert!(!provider.is_initialized());

    let first = provider.client().unwrap();
    assert!(provider.is_initialized());

    let second = provider.client().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_static_provider_returns_wrapped_client() {
    let client = Arc::new(HttpClient::with_config(HttpClientConfig::default()).unwrap());
    let provider = StaticClientProvider::from(Arc::clone(&client));

    assert!(Arc::ptr_eq(&provider.client().unwrap(), &client));
}

#[test]
fn test_providers_are_object_safe() {
    let providers: Vec<Box<dyn ClientProvider>> = vec![
        Box::new(LazyClientProvider::new(
            HttpClientConfig::default(),
            AuthConfig::None,
        )),
        Box::new(StaticClientProvider::new(
            HttpClient::with_config(HttpClientConfig::default()).unwrap(),
        )),
    ];

    for provider in &providers {
        assert!(provider.client().is_ok());
    }
}
