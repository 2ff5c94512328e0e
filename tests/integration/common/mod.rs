#![allow(dead_code)]

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use zt_event_logger::database::{self, EventStore, MemoryEventStore, SqliteEventStore};
use zt_event_logger::{AppState, Config, router};

pub const SECRET: &str = "00112233445566778899aabbccddeeff";

pub fn config(pre_shared_key: Option<&str>) -> Config {
    let key = pre_shared_key.map(str::to_string);
    Config::from_vars(move |name| match name {
        "DB_FILE_LOCATION" => Some(":memory:".to_string()),
        "ENVIRONMENT" => Some("test".to_string()),
        "PRE_SHARED_KEY" => key.clone(),
        _ => None,
    })
    .expect("test config")
}

/// Router backed by an in-memory store the test can inspect
pub fn memory_app(pre_shared_key: Option<&str>) -> (Router, MemoryEventStore) {
    let store = MemoryEventStore::new();
    let state = AppState::new(config(pre_shared_key), Arc::new(store.clone()));
    (router::build_router(state), store)
}

/// Router backed by a migrated in-memory SQLite database
pub async fn sqlite_app() -> Result<(Router, Arc<dyn EventStore>)> {
    let pool = database::setup_database(":memory:", 1).await?;
    database::run_migrations(&pool).await?;

    let store: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(pool));
    let state = AppState::new(config(None), store.clone());
    Ok((router::build_router(state), store))
}

pub fn receive_request(payload: &Value, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/events/receive")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("X-ZTC-Signature", signature);
    }
    builder
        .body(Body::from(payload.to_string()))
        .expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub async fn search(app: &Router, query: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .uri(format!("/events/search{query}"))
        .body(Body::empty())?;
    send(app, request).await
}
