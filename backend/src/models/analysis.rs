//! Derived analysis records.
//!
//! Everything in this module is produced by the impact engine. Values are
//! built once per analysis pass and never mutated afterwards; a re-run
//! produces fresh records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::mission::{CampId, MissionId};

/// Resource quantities required by one camp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementEstimate {
    /// Food packets per day
    pub food_packets: u64,
    /// Drinking water in liters per day
    pub water_liters: u64,
    pub beds: u64,
    pub medical_kits: u64,
    pub toilets: u64,
    pub power_units: u64,
    pub ambulances: u64,
    pub volunteers: u64,
    pub blankets: u64,
}

/// Risk band derived from a 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Classify a risk score. Scores below zero or NaN fall into `Low`.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Self::Critical
        } else if score >= 50.0 {
            Self::High
        } else if score >= 25.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which component produced the final risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionSource {
    #[serde(rename = "Rule Engine")]
    RuleEngine,
    #[serde(rename = "Hybrid AI")]
    HybridAi,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleEngine => "Rule Engine",
            Self::HybridAi => "Hybrid AI",
        }
    }
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full per-camp analysis returned to callers and stored as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampAnalysis {
    pub camp_id: CampId,
    pub camp_name: String,
    pub population: u64,
    pub injured_count: u64,
    pub urgency: String,
    #[serde(flatten)]
    pub requirements: RequirementEstimate,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub saturation_percentage: f64,
    pub prediction_source: PredictionSource,
    pub explanations: Vec<String>,
}

/// Mission-level response of an impact analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionAnalysisResult {
    pub mission_id: MissionId,
    pub disaster_type: String,
    pub severity: String,
    pub camp_analysis_list: Vec<CampAnalysis>,
    /// Unweighted mean of per-camp risk scores, two decimals
    pub overall_risk_score: f64,
}

impl MissionAnalysisResult {
    pub fn camp_count(&self) -> usize {
        self.camp_analysis_list.len()
    }

    pub fn find_camp(&self, camp_id: &CampId) -> Option<&CampAnalysis> {
        self.camp_analysis_list.iter().find(|a| &a.camp_id == camp_id)
    }
}

/// Historical record of one camp analysis.
///
/// Every analysis run appends a new record keyed by (mission, camp); records
/// are never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampPredictionRecord {
    pub id: Uuid,
    pub mission_id: MissionId,
    pub camp_id: CampId,
    pub created_at: DateTime<Utc>,
    pub analysis: CampAnalysis,
}

impl CampPredictionRecord {
    pub fn new(mission_id: MissionId, analysis: CampAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            mission_id,
            camp_id: analysis.camp_id.clone(),
            created_at: Utc::now(),
            analysis,
        }
    }
}
