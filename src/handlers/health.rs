use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub environment: String,
    pub dependencies: Vec<ServiceHealth>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub name: String,
    pub status: String,
    pub response_time_ms: Option<u64>,
    pub last_check: chrono::DateTime<chrono::Utc>,
    pub error_message: Option<String>,
}

impl HealthStatus {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn add_dependency_check(
        &mut self,
        name: &str,
        is_healthy: bool,
        response_time: Option<u64>,
        error: Option<String>,
    ) {
        self.dependencies.push(ServiceHealth {
            name: name.to_string(),
            status: if is_healthy {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            response_time_ms: response_time,
            last_check: chrono::Utc::now(),
            error_message: error,
        });

        // Update overall status if any dependency is unhealthy
        if !is_healthy {
            self.status = "degraded".to_string();
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health check endpoint
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let mut health = HealthStatus::new(&state.config.environment);

    let started = Instant::now();
    let result = state.store.health_check().await;
    let elapsed = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => health.add_dependency_check("event_store", true, Some(elapsed), None),
        Err(e) => {
            tracing::error!(error = %e, "Event store health check failed");
            health.add_dependency_check("event_store", false, Some(elapsed), Some(e.to_string()))
        }
    }

    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
