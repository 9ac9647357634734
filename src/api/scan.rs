//! Abuse scan endpoint.

use crate::api::AppState;
use crate::domain::TriggerType;
use crate::error::AppError;
use crate::scanner::ScanReport;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub trigger_type: TriggerType,
}

pub async fn post_scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanReport>, AppError> {
    let user_id = request
        .user_id
        .ok_or_else(|| AppError::BadRequest("userId is required".into()))?;

    let report = state
        .scanner
        .scan_user(&user_id, request.trigger_type)
        .await?;

    Ok(Json(report))
}
