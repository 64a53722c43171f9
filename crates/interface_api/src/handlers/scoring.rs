//! Scoring handlers

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use tracing::debug;

use domain_fraud::{BatchSummary, ScoringResult};

use crate::auth::{permissions, require_permission, Claims};
use crate::dto::scoring::{BatchScoreRequest, BatchScoreResponse, ScoreClaimRequest};
use crate::{error::ApiError, AppState};

/// Scores one claim
pub async fn score_claim(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    payload: Result<Json<ScoreClaimRequest>, JsonRejection>,
) -> Result<Json<ScoringResult>, ApiError> {
    require_permission(caller.as_deref(), permissions::CLAIM_SCORE)?;
    let Json(request) = payload?;

    let claim = request.into_claim()?;
    let result = state.engine.score(&claim).await?;
    Ok(Json(result))
}

/// Scores a batch of claims, results in request order
///
/// The whole batch is rejected when any claim fails validation.
pub async fn score_batch(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    payload: Result<Json<BatchScoreRequest>, JsonRejection>,
) -> Result<Json<BatchScoreResponse>, ApiError> {
    require_permission(caller.as_deref(), permissions::CLAIM_SCORE)?;
    let Json(request) = payload?;

    let claims = request.into_claims()?;
    debug!(size = claims.len(), "Scoring batch");
    let results = state
        .engine
        .score_batch(claims)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    let summary = BatchSummary::from_results(&results);

    Ok(Json(BatchScoreResponse { results, summary }))
}
