//! Alarm explanation handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use domain_fraud::AlarmExplanation;

use crate::auth::{permissions, require_permission, Claims};
use crate::{error::ApiError, AppState};

/// Explains one alarm type, 404 when the identifier is unknown
pub async fn explain_alarm(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    Path(alarm_type): Path<String>,
) -> Result<Json<AlarmExplanation>, ApiError> {
    require_permission(caller.as_deref(), permissions::ALARM_READ)?;
    Ok(Json(state.engine.explain(&alarm_type)?))
}

/// Lists explanations for every alarm type
pub async fn list_alarms(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
) -> Result<Json<Vec<AlarmExplanation>>, ApiError> {
    require_permission(caller.as_deref(), permissions::ALARM_READ)?;
    Ok(Json(state.engine.alarm_catalog().all()))
}
