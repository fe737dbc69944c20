//! External predictor port.
//!
//! The ML service is an optional collaborator: it may be disabled, slow, or
//! broken. The engine talks to it only through [`ExternalPredictor`] and
//! always via [`predict_with_timeout`], which turns every failure mode into
//! `None` so the rule engine result stands on its own.

#[cfg(feature = "ml-client")]
pub mod http;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{Camp, CampId, Mission};

#[cfg(feature = "ml-client")]
pub use http::HttpPredictor;

/// Result type for predictor calls
pub type PredictorResult<T> = Result<T, PredictorError>;

/// Error type for predictor calls
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("Predictor timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Predictor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed prediction: {0}")]
    Malformed(String),
}

/// Disaster and camp context sent to the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub disaster_type: String,
    pub severity: String,
    pub urgency: String,
    pub affected_count: u64,
    pub injured_count: u64,
    pub missing_count: u64,
    pub latitude: f64,
    pub longitude: f64,
}

impl PredictionRequest {
    pub fn for_camp(mission: &Mission, camp: &Camp, urgency_label: &str) -> Self {
        Self {
            disaster_type: mission.disaster_type_label(),
            severity: mission.severity_label(),
            urgency: urgency_label.to_string(),
            affected_count: camp.headcount(),
            injured_count: camp.injured(),
            missing_count: 0,
            latitude: camp.latitude.unwrap_or(0.0),
            longitude: camp.longitude.unwrap_or(0.0),
        }
    }
}

/// Resource quantities suggested by the predictor. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictedRequirements {
    #[serde(alias = "foodPacketsPerDay")]
    pub food_packets_per_day: Option<u64>,
    #[serde(alias = "waterLitersPerDay")]
    pub water_liters_per_day: Option<u64>,
    #[serde(alias = "bedsRequired")]
    pub beds_required: Option<u64>,
    #[serde(alias = "medicalKitsRequired")]
    pub medical_kits_required: Option<u64>,
    #[serde(alias = "blanketsRequired")]
    pub blankets_required: Option<u64>,
    #[serde(alias = "toiletsRequired")]
    pub toilets_required: Option<u64>,
    #[serde(alias = "powerUnitsRequired")]
    pub power_units_required: Option<u64>,
    #[serde(alias = "ambulancesRequired")]
    pub ambulances_required: Option<u64>,
    #[serde(alias = "volunteersRequired")]
    pub volunteers_required: Option<u64>,
}

/// Structured prediction returned by the external service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prediction {
    pub requirements: Option<PredictedRequirements>,
    #[serde(alias = "riskScore")]
    pub risk_score: Option<f64>,
    #[serde(alias = "predictionSource")]
    pub prediction_source: Option<String>,
    pub explanations: Option<Vec<String>>,
}

impl Prediction {
    /// Reject predictions whose risk score cannot be blended.
    pub fn validate(self) -> PredictorResult<Self> {
        if let Some(score) = self.risk_score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(PredictorError::Malformed(format!(
                    "risk score {} outside [0, 100]",
                    score
                )));
            }
        }
        Ok(self)
    }
}

/// Request/response interface of the external ML predictor.
///
/// Implementations must be safe to call from many camp tasks at once.
#[async_trait]
pub trait ExternalPredictor: Send + Sync {
    /// Request a prediction. `Ok(None)` means the service had nothing to say.
    async fn predict(&self, request: &PredictionRequest) -> PredictorResult<Option<Prediction>>;

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "external"
    }
}

/// Predictor used when the ML service is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPredictor;

#[async_trait]
impl ExternalPredictor for DisabledPredictor {
    async fn predict(&self, _request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Call the predictor under a timeout, absorbing every failure into `None`.
pub async fn predict_with_timeout(
    predictor: &dyn ExternalPredictor,
    request: &PredictionRequest,
    timeout: Duration,
    camp_id: &CampId,
) -> Option<Prediction> {
    let outcome = match tokio::time::timeout(timeout, predictor.predict(request)).await {
        Ok(result) => result.and_then(|p| p.map(Prediction::validate).transpose()),
        Err(_) => Err(PredictorError::Timeout(timeout)),
    };

    match outcome {
        Ok(Some(prediction)) => Some(prediction),
        Ok(None) => {
            debug!(
                "Predictor '{}' returned no prediction for camp {}",
                predictor.name(),
                camp_id
            );
            None
        }
        Err(e) => {
            warn!(
                "Predictor '{}' unavailable for camp {}, falling back to rule engine: {}",
                predictor.name(),
                camp_id,
                e
            );
            None
        }
    }
}
