//! In-process HTTP tests for the scoring API

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};
use interface_api::auth::permissions;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};
use test_utils::{wait_for_records, FixedProbabilityBackend, TestEngine, TestEngineBuilder};

const SECRET: &str = "api-test-secret";

fn app_with(test: TestEngine, config: ApiConfig) -> Router {
    create_router(AppState::new(Arc::new(test.engine), config))
}

fn app() -> Router {
    app_with(TestEngineBuilder::new().build(), ApiConfig::default())
}

fn authed_config() -> ApiConfig {
    ApiConfig {
        auth_enabled: true,
        jwt_secret: SECRET.to_string(),
        ..Default::default()
    }
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_token(mut request: Request<Body>, roles: &[&str]) -> Request<Body> {
    let roles = roles.iter().map(|r| r.to_string()).collect();
    let token = authed_config().issue_token("analyst-7", roles).unwrap();
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    request
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn high_risk_body() -> Value {
    json!({
        "claimant_id": "api-high",
        "amount": 15000.0,
        "report_delay_days": 10,
        "provider": "shady_clinic",
        "notes": "This was a staged accident, I need quick cash for the repairs",
        "location": "Los Angeles, CA",
        "is_new_bank": true,
        "timestamp": "2024-03-13T10:00:00Z"
    })
}

fn low_risk_body() -> Value {
    json!({
        "claimant_id": "api-low",
        "amount": 2000.0,
        "report_delay_days": 2,
        "provider": "Trusted Clinic",
        "notes": "Routine annual checkup and blood work, receipts attached",
        "location": "New York, NY",
        "is_new_bank": false,
        "timestamp": "2024-03-13T10:00:00Z"
    })
}

fn moderate_body() -> Value {
    json!({
        "claimant_id": "api-moderate",
        "amount": 8000,
        "report_delay_days": 5,
        "provider": "out-of-network clinic",
        "notes": "",
        "location": "",
        "is_new_bank": false,
        "timestamp": "2024-03-13T10:00:00Z"
    })
}

// ============================================================================
// Scoring
// ============================================================================

mod scoring {
    use super::*;

    #[tokio::test]
    async fn test_high_risk_claim_rejected() {
        let (status, body) = send(app(), post_json("/api/v1/score_claim", &high_risk_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "Reject");
        assert!(body["alarms"].as_array().unwrap().len() >= 4);
        assert_eq!(body["recommendation"], "Submit supporting documents or appeal decision.");

        let types: Vec<&str> = body["alarms"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["type"].as_str().unwrap())
            .collect();
        assert!(types.contains(&"blacklist_hit"));
        assert!(types.contains(&"late_reporting"));
    }

    #[tokio::test]
    async fn test_low_risk_claim_approved() {
        let (status, body) = send(app(), post_json("/api/v1/score_claim", &low_risk_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "Approve");
        assert!(body["alarms"].as_array().unwrap().is_empty());
        assert!(body["fraud_probability"].as_f64().unwrap() < 0.30);
        assert!(body.get("recommendation").is_none());
    }

    #[tokio::test]
    async fn test_moderate_claim_reviewed() {
        let (status, body) = send(app(), post_json("/api/v1/score_claim", &moderate_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "Review");
        assert_eq!(body["alarms"][0]["type"], "out_of_network_provider");
        assert_eq!(body["alarms"][0]["severity"], "low");
        assert_eq!(body["score_source"], "fallback");
        assert_eq!(body["degraded"], true);
        assert!(body["explanation"]
            .as_str()
            .unwrap()
            .starts_with("Fraud analysis complete for claim of $8000.00 from claimant api-moderate."));
    }

    #[tokio::test]
    async fn test_model_probability_drives_decision() {
        let test = TestEngineBuilder::new()
            .with_backend(FixedProbabilityBackend::new(0.9))
            .build();
        let app = app_with(test, ApiConfig::default());

        let (status, body) = send(app, post_json("/api/v1/score_claim", &low_risk_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "Reject");
        assert_eq!(body["risk_level"], "high");
        assert_eq!(body["degraded"], false);
    }

    #[tokio::test]
    async fn test_scored_claim_is_persisted() {
        let test = TestEngineBuilder::new().build();
        let store = test.store.clone();
        let app = app_with(test, ApiConfig::default());

        let (status, _) = send(app, post_json("/api/v1/score_claim", &low_risk_body())).await;
        assert_eq!(status, StatusCode::OK);

        wait_for_records(&store, 1).await;
        let records = store.records().await;
        assert_eq!(records[0].claim.claimant_id, "api-low");
    }
}

// ============================================================================
// Validation
// ============================================================================

mod validation {
    use super::*;

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let mut body = low_risk_body();
        body["amount"] = json!(0);

        let (status, body) = send(app(), post_json("/api/v1/score_claim", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert!(body["details"][0].as_str().unwrap().starts_with("amount"));
    }

    #[tokio::test]
    async fn test_sub_cent_amount_rejected() {
        let mut body = low_risk_body();
        body["amount"] = json!(0.004);

        let (status, body) = send(app(), post_json("/api/v1/score_claim", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0], "amount: must be at least 0.01");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/score_claim")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"claimant_id\": "))
            .unwrap();

        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let mut body = low_risk_body();
        body.as_object_mut().unwrap().remove("amount");

        let (status, body) = send(app(), post_json("/api/v1/score_claim", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert!(body["message"].as_str().unwrap().contains("amount"));
    }

    #[tokio::test]
    async fn test_blank_claimant_rejected() {
        let mut body = low_risk_body();
        body["claimant_id"] = json!("");

        let (status, body) = send(app(), post_json("/api/v1/score_claim", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_bad_timestamp_rejected() {
        let mut body = low_risk_body();
        body["timestamp"] = json!("last tuesday");

        let (status, body) = send(app(), post_json("/api/v1/score_claim", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("last tuesday"));
    }

    #[tokio::test]
    async fn test_missing_timestamp_defaults_to_now() {
        let mut body = low_risk_body();
        body.as_object_mut().unwrap().remove("timestamp");

        let (status, _) = send(app(), post_json("/api/v1/score_claim", &body)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

// ============================================================================
// Batch
// ============================================================================

mod batch {
    use super::*;

    #[tokio::test]
    async fn test_batch_preserves_order_and_summarizes() {
        let request = json!({ "claims": [high_risk_body(), low_risk_body(), moderate_body()] });

        let (status, body) = send(app(), post_json("/api/v1/score_claims/batch", &request)).await;

        assert_eq!(status, StatusCode::OK);
        let decisions: Vec<&str> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["decision"].as_str().unwrap())
            .collect();
        assert_eq!(decisions, vec!["Reject", "Approve", "Review"]);

        assert_eq!(body["summary"]["total"], 3);
        assert_eq!(body["summary"]["approved"], 1);
        assert_eq!(body["summary"]["review"], 1);
        assert_eq!(body["summary"]["rejected"], 1);
        assert_eq!(body["summary"]["degraded"], 3);
    }

    #[tokio::test]
    async fn test_invalid_claim_rejects_batch() {
        let mut bad = low_risk_body();
        bad["amount"] = json!(-10);
        let request = json!({ "claims": [low_risk_body(), bad] });

        let (status, body) = send(app(), post_json("/api/v1/score_claims/batch", &request)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"][0].as_str().unwrap().starts_with("claims[1]"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (status, body) = send(app(), post_json("/api/v1/score_claims/batch", &json!({ "claims": [] }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["total"], 0);
        assert_eq!(body["summary"]["avg_probability"], 0.0);
    }
}

// ============================================================================
// Explanations
// ============================================================================

mod explain {
    use super::*;

    #[tokio::test]
    async fn test_known_alarm_type() {
        let (status, body) = send(app(), get("/api/v1/explain/late_reporting")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "late_reporting");
        assert!(body["description"].as_str().unwrap().contains("7 days"));
        assert!(!body["tips"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_alarm_type_not_found() {
        let (status, body) = send(app(), get("/api/v1/explain/alien_abduction")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_catalog_lists_every_alarm_type() {
        let (status, body) = send(app(), get("/api/v1/explain")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 13);
    }
}

// ============================================================================
// Authentication
// ============================================================================

mod auth {
    use super::*;

    fn authed_app() -> Router {
        app_with(TestEngineBuilder::new().build(), authed_config())
    }

    #[tokio::test]
    async fn test_missing_token_unauthorized() {
        let (status, body) = send(authed_app(), post_json("/api/v1/score_claim", &low_risk_body())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_with_permission_accepted() {
        let request = with_token(
            post_json("/api/v1/score_claim", &low_risk_body()),
            &[permissions::CLAIM_SCORE],
        );
        let (status, body) = send(authed_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "Approve");
    }

    #[tokio::test]
    async fn test_token_without_permission_forbidden() {
        let request = with_token(
            post_json("/api/v1/score_claim", &low_risk_body()),
            &[permissions::ALARM_READ],
        );
        let (status, body) = send(authed_app(), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_health_stays_public() {
        let (status, body) = send(authed_app(), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}

// ============================================================================
// Health
// ============================================================================

mod health {
    use super::*;

    struct DownStore;

    #[async_trait]
    impl HealthCheckable for DownStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::new("down-store", AdapterHealth::Unhealthy, 0).with_message("connection refused")
        }
    }

    #[tokio::test]
    async fn test_fallback_scorer_reports_degraded() {
        let (status, body) = send(app(), get("/health/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"][0]["status"], "degraded");
    }

    #[tokio::test]
    async fn test_ready_with_model_backend() {
        let test = TestEngineBuilder::new()
            .with_backend(FixedProbabilityBackend::new(0.2))
            .build();
        let (status, body) = send(app_with(test, ApiConfig::default()), get("/health/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_unhealthy_store_unavailable() {
        let test = TestEngineBuilder::new().build();
        let state = AppState::new(Arc::new(test.engine), ApiConfig::default()).with_store_health(Arc::new(DownStore));

        let (status, body) = send(create_router(state), get("/health/ready")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }
}
