//! HTTP handlers for the REST API.
//!
//! Each handler delegates to the service layer.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{HealthResponse, HistoryQuery, HistoryResponse};
use super::error::AppError;
use super::state::AppState;
use crate::db::MissionRepository;
use crate::models::{MissionAnalysisResult, MissionId};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

/// GET /api/analytics/impact/{mission_id}
///
/// Run an impact analysis for the mission and return the aggregated result.
pub async fn get_mission_impact(
    State(state): State<AppState>,
    Path(mission_id): Path<String>,
) -> HandlerResult<MissionAnalysisResult> {
    let mission_id = MissionId::from(mission_id);
    let result = state.analysis.analyze_mission_impact(&mission_id).await?;
    Ok(Json(result))
}

/// GET /api/analytics/impact/{mission_id}/history?latest=true
pub async fn get_mission_history(
    State(state): State<AppState>,
    Path(mission_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> HandlerResult<HistoryResponse> {
    let mission_id = MissionId::from(mission_id);
    if mission_id.is_blank() {
        return Err(AppError::BadRequest("Mission id is empty".to_string()));
    }

    let records = if query.latest {
        services::latest_predictions(state.repository.as_ref(), &mission_id).await?
    } else {
        services::prediction_history(state.repository.as_ref(), &mission_id).await?
    };

    Ok(Json(HistoryResponse {
        mission_id,
        total: records.len(),
        records,
    }))
}
