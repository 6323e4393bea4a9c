#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use energyflow::{
    api::AppState,
    database,
    flow::{ConnectionRules, SnapshotStorage},
    server::build_router,
};
use serde_json::Value;
use tower::ServiceExt;

pub async fn storage() -> SnapshotStorage {
    let pool = database::open_in_memory()
        .await
        .expect("in-memory database should open");
    let storage = SnapshotStorage::new(pool);
    storage.init_schema().await.expect("schema should initialize");
    storage
}

pub async fn app() -> (Router, AppState) {
    let state = AppState::new(storage().await, ConnectionRules::builtin());
    (build_router(state.clone()), state)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request should build"))
        .await
        .expect("router should respond");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}
