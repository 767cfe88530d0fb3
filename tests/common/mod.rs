#![allow(dead_code)]

//! Shared helpers: a router over a fresh in-memory store and a JSON request helper.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use birdwatch::{api_routes, common_routes_with_ready, AppState, InMemoryStore, SearchConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

pub const BODY_LIMIT: usize = 64 * 1024;

pub fn app_with(search: SearchConfig, body_limit: usize) -> Router {
    let state = AppState::new(Arc::new(InMemoryStore::new()), search);
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", api_routes(state, body_limit))
}

pub fn app() -> Router {
    app_with(SearchConfig::default(), BODY_LIMIT)
}

/// Send one request; the body is parsed as JSON (`Null` when empty).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(v) => send_raw(app, method, uri, &v.to_string()).await,
        None => {
            let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
            dispatch(app, request).await
        }
    }
}

/// Send a JSON-typed request whose body text is taken as is.
pub async fn send_raw(app: &Router, method: Method, uri: &str, raw: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, raw.len())
        .body(Body::from(raw.to_string()))
        .unwrap();
    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn create_bird(app: &Router, name: &str, color: &str, weight: f64, height: f64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/birds",
        Some(json!({ "name": name, "color": color, "weight": weight, "height": height })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

/// American Robin (77.5), Northern Cardinal (45.0), Blue Jay (85.0); returns their ids in that order.
pub async fn seed_birds(app: &Router) -> Vec<i64> {
    let mut ids = Vec::new();
    for (name, color, weight, height) in [
        ("American Robin", "Red", 77.5, 25.0),
        ("Northern Cardinal", "Red", 45.0, 22.0),
        ("Blue Jay", "Blue", 85.0, 30.0),
    ] {
        let bird = create_bird(app, name, color, weight, height).await;
        ids.push(bird["id"].as_i64().unwrap());
    }
    ids
}

pub async fn create_sighting(app: &Router, bird_id: i64, location: &str, date_time: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/sightings",
        Some(json!({ "birdId": bird_id, "location": location, "dateTime": date_time })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

pub fn names(page: &Value) -> Vec<String> {
    page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect()
}
