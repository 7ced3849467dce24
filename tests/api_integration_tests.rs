//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bytecache::{api::create_router, AppState, ConcurrentCache};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(max_bytes: usize) -> Router {
    create_router(AppState::new(ConcurrentCache::new(max_bytes)))
}

fn set_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app(1024);

    let response = app
        .oneshot(set_request(r#"{"key":"test_key","value":"test_value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["key"], "test_key");
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app(1024);

    let response = app
        .oneshot(set_request(r#"{"key":"","value":"value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_set_endpoint_malformed_json() {
    let app = create_test_app(1024);

    let response = app.oneshot(set_request(r#"{"key":"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_endpoint_entry_too_large() {
    let app = create_test_app(16);

    let response = app
        .oneshot(set_request(
            r#"{"key":"big","value":"this value does not fit the budget"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("big"));
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app(1024);

    let set_response = app
        .clone()
        .oneshot(set_request(r#"{"key":"get_key","value":"get_value"}"#))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get_request("/get/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"].as_str().unwrap(), "get_key");
    assert_eq!(json["value"].as_str().unwrap(), "get_value");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app(1024);

    let response = app
        .oneshot(get_request("/get/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("nonexistent_key"));
}

#[tokio::test]
async fn test_get_endpoint_after_eviction() {
    // Room for exactly two of the entries below
    let budget = "k1".len() + "v1".len() + "k2".len() + "v2".len();
    let app = create_test_app(budget);

    for body in [
        r#"{"key":"k1","value":"v1"}"#,
        r#"{"key":"k2","value":"v2"}"#,
        r#"{"key":"k3","value":"v3"}"#,
    ] {
        let response = app.clone().oneshot(set_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let evicted = app.clone().oneshot(get_request("/get/k1")).await.unwrap();
    assert_eq!(evicted.status(), StatusCode::NOT_FOUND);

    for uri in ["/get/k2", "/get/k3"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let budget = 8;
    let app = create_test_app(budget);

    for body in [
        r#"{"key":"k1","value":"v1"}"#,
        r#"{"key":"k2","value":"v2"}"#,
        r#"{"key":"k3","value":"v3"}"#,
    ] {
        app.clone().oneshot(set_request(body)).await.unwrap();
    }
    app.clone().oneshot(get_request("/get/k3")).await.unwrap();
    app.clone().oneshot(get_request("/get/k1")).await.unwrap();

    let response = app.oneshot(get_request("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["evictions"], 1);
    assert_eq!(json["total_entries"], 2);
    assert_eq!(json["used_bytes"], 8);
    assert_eq!(json["max_bytes"], 8);
    assert_eq!(json["hit_rate"], 0.5);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(0);

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
