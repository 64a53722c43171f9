//! HTTP API Layer
//!
//! REST API for the fraud risk decision engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: scoring, batch scoring, alarm explanations, health
//! - **Middleware**: JWT authentication (when enabled), tracing, audit logging
//! - **DTOs**: validated request bodies and batch responses
//! - **Error Handling**: consistent `{error, message, details}` bodies
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let engine = Arc::new(FraudEngine::builder(config.engine_config()).build()?);
//! let app = create_router(AppState::new(engine, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_fraud::FraudEngine;

use crate::config::ApiConfig;
use crate::handlers::{explain, health, scoring};
use crate::middleware::{audit_middleware, auth_middleware};

/// Request body cap; a full batch of claims with long notes exceeds axum's
/// 2 MiB default
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FraudEngine>,
    pub config: ApiConfig,
    /// Checked by the readiness probe alongside the scorer
    pub store_health: Option<Arc<dyn HealthCheckable>>,
}

impl AppState {
    pub fn new(engine: Arc<FraudEngine>, config: ApiConfig) -> Self {
        Self {
            engine,
            config,
            store_health: None,
        }
    }

    pub fn with_store_health(mut self, store: Arc<dyn HealthCheckable>) -> Self {
        self.store_health = Some(store);
        self
    }
}

/// Creates the main API router
///
/// `/health` and `/health/ready` are public. Routes under `/api/v1` require
/// a bearer token when `auth_enabled` is set.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let mut api_routes = Router::new()
        .route("/score_claim", post(scoring::score_claim))
        .route("/score_claims/batch", post(scoring::score_batch))
        .route("/explain", get(explain::list_alarms))
        .route("/explain/:alarm_type", get(explain::explain_alarm))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum_middleware::from_fn(audit_middleware));

    if state.config.auth_enabled {
        api_routes = api_routes.layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));
    }

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
