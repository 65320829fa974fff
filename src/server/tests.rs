//! HTTP service tests
//!
//! Drives the request handlers directly, without a network listener.

use axum::http::{header, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::service::{authorize, handle, parse_body, AppState};
use crate::config::Config;
use crate::pool::WorkerPool;
use crate::protocol::{Method, SessionRequest};
use crate::Error;

fn test_state(max_workers: usize) -> AppState {
    let config = Config {
        api_key: "test-key".to_string(),
        max_workers,
        ..Default::default()
    };
    AppState::new(Arc::new(WorkerPool::mock(max_workers)), Arc::new(config))
}

fn keyed_query() -> HashMap<String, String> {
    HashMap::from([("key".to_string(), "test-key".to_string())])
}

async fn call(state: &AppState, method: &str, body: Value) -> Result<Response, Error> {
    handle(state, method, &keyed_query(), body.to_string().as_bytes()).await
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_authorize() {
    let config = Config {
        api_key: "secret".to_string(),
        ..Default::default()
    };

    let ok = HashMap::from([("key".to_string(), "secret".to_string())]);
    assert!(authorize(&config, &ok).is_ok());

    let wrong = HashMap::from([("key".to_string(), "guess".to_string())]);
    assert!(matches!(
        authorize(&config, &wrong),
        Err(Error::Unauthorized(_))
    ));

    assert!(matches!(
        authorize(&config, &HashMap::new()),
        Err(Error::Unauthorized(_))
    ));
}

#[test]
fn test_parse_body_empty_is_empty_mapping() {
    let request: SessionRequest = parse_body(Method::Session, b"").unwrap();
    assert!(request.session.is_none());
    assert!(request.keep_alive.is_none());
}

#[test]
fn test_parse_body_rejects_invalid_json() {
    let result: Result<SessionRequest, _> = parse_body(Method::Session, b"not json");
    assert!(matches!(result, Err(Error::InvalidOption(_))));
}

#[tokio::test]
async fn test_session_create_and_stop() {
    let state = test_state(2);

    let response = call(&state, "session", json!({ "keep_alive": 5 }))
        .await
        .unwrap();
    let envelope = json_body(response).await;
    let id = envelope["session"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(state.pool.occupancy(), 1);

    let response = call(&state, "session", json!({ "session": id, "stop": true }))
        .await
        .unwrap();
    let envelope = json_body(response).await;
    assert_eq!(envelope["session"].as_str().unwrap(), id);
    assert_eq!(state.pool.occupancy(), 0);

    // Stopping again is idempotent
    let response = call(&state, "session", json!({ "session": id, "stop": true })).await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_session_ping_requires_live_session() {
    let state = test_state(1);

    let result = call(&state, "session", json!({ "session": "gone" })).await;
    assert!(matches!(result, Err(Error::SessionNotFound(_))));
}

#[tokio::test]
async fn test_unknown_method_rejected() {
    let state = test_state(1);
    let result = call(&state, "launch", json!({})).await;
    assert!(matches!(result, Err(Error::UnknownMethod(_))));
}

#[tokio::test]
async fn test_wrong_key_rejected_before_dispatch() {
    let state = test_state(1);
    let query = HashMap::from([("key".to_string(), "wrong".to_string())]);
    let result = handle(&state, "session", &query, b"{}").await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
    assert_eq!(state.pool.occupancy(), 0);
}

#[tokio::test]
async fn test_string_encoded_boolean_is_a_caller_error() {
    let state = test_state(1);

    let result = call(
        &state,
        "session",
        json!({ "keep_alive": 5, "block_resources": "false" }),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::InvalidOption(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    // The rejected call consumed no slot
    assert_eq!(state.pool.occupancy(), 0);
}

#[tokio::test]
async fn test_navigate_without_session_opens_one() {
    let state = test_state(1);

    let response = call(
        &state,
        "navigate",
        json!({ "url": "https://example.com/", "content": true }),
    )
    .await
    .unwrap();

    let envelope = json_body(response).await;
    let id = envelope["session"].as_str().unwrap();
    assert!(!id.is_empty());
    assert!(envelope["content"].as_str().unwrap().contains("<body>"));
    assert_eq!(state.pool.occupancy(), 1);
}

#[tokio::test]
async fn test_saturated_pool_rejects_session_and_navigate() {
    let state = test_state(1);

    call(&state, "session", json!({})).await.unwrap();

    let result = call(&state, "session", json!({})).await;
    assert!(matches!(result, Err(Error::ConcurrencyLimitExceeded(_))));

    // Implicit opens obey the same admission control
    let result = call(&state, "navigate", json!({ "url": "https://example.com/" })).await;
    assert!(matches!(result, Err(Error::ConcurrencyLimitExceeded(_))));
}

#[tokio::test]
async fn test_interact_requires_session_field() {
    let state = test_state(1);
    let result = call(&state, "interact", json!({ "actions": [] })).await;
    assert!(matches!(result, Err(Error::InvalidOption(_))));
}

#[tokio::test]
async fn test_action_results_mirror_submission_order() {
    let state = test_state(1);

    let response = call(
        &state,
        "navigate",
        json!({
            "url": "https://example.com/",
            "actions": [
                { "action": "wait", "seconds": 0.1 },
                { "action": "click", "element": "#missing" },
                { "action": "wait", "seconds": 0.1 }
            ]
        }),
    )
    .await
    .unwrap();

    let envelope = json_body(response).await;
    let actions = envelope["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 3);
    assert_eq!(actions[0]["action"], "wait");
    assert_eq!(actions[0]["ok"], true);
    // The failed click is reported inline, not as a transport error
    assert_eq!(actions[1]["action"], "click");
    assert_eq!(actions[1]["ok"], false);
    assert_eq!(actions[2]["ok"], true);
}

#[tokio::test]
async fn test_screenshot_returns_binary_with_content_type() {
    let state = test_state(1);

    let response = call(&state, "session", json!({})).await.unwrap();
    let id = json_body(response).await["session"]
        .as_str()
        .unwrap()
        .to_string();

    call(
        &state,
        "navigate",
        json!({ "session": id, "url": "https://example.com/" }),
    )
    .await
    .unwrap();

    let response = call(&state, "screenshot", json!({ "session": id }))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));

    let response = call(&state, "pdf", json!({ "session": id })).await.unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_debug_mode_attaches_artifacts_to_envelope() {
    let state = test_state(1);

    let response = call(
        &state,
        "navigate",
        json!({ "url": "https://example.com/", "debug": true }),
    )
    .await
    .unwrap();

    let envelope = json_body(response).await;
    assert!(envelope["debugLog"].as_array().is_some());
    assert!(envelope["debugScreenshot"].as_str().is_some());
}
