//! Data Transfer Objects for the HTTP API.
//!
//! The analysis result itself is served as
//! [`MissionAnalysisResult`](crate::models::MissionAnalysisResult); only the
//! envelopes below are HTTP specific.

use serde::{Deserialize, Serialize};

use crate::models::{CampPredictionRecord, MissionId};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Repository connection status
    pub database: String,
}

/// Query parameters for the history endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Only the most recent record per camp
    #[serde(default)]
    pub latest: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub mission_id: MissionId,
    pub total: usize,
    pub records: Vec<CampPredictionRecord>,
}
