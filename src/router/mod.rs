//! Router configuration: webhook ingestion, event search and health.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::handlers::{health_check, receive_event, search_events};
use crate::middleware::request_logger_middleware;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let timeout = Duration::from_secs(app_state.config.request_timeout);
    let body_limit = app_state.config.max_body_bytes;

    let events = Router::new()
        .route("/receive", post(receive_event))
        .route("/search", get(search_events));

    Router::new()
        .route("/health", get(health_check))
        .nest("/events", events)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logger_middleware))
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::REQUEST_TIMEOUT,
                    timeout,
                )),
        )
        .with_state(app_state)
}
