//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheckResult>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check
///
/// A scorer on the fallback heuristic is reported as degraded and still
/// ready; an unhealthy store makes the service unavailable.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let mut checks = vec![state.engine.scorer().health_check().await];
    if let Some(store) = &state.store_health {
        checks.push(store.health_check().await);
    }

    let (code, status) = match AdapterHealth::overall(&checks) {
        AdapterHealth::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        AdapterHealth::Degraded => (StatusCode::OK, "degraded"),
        AdapterHealth::Healthy => (StatusCode::OK, "ready"),
    };

    (
        code,
        Json(ReadinessResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks,
        }),
    )
}
