//! Deterministic rule engine.
//!
//! The per-camp pipeline is:
//!
//! ```text
//! urgency label ──► supply window ──┬─► requirements ─┐
//!                                   └─► risk score ───┴─► hybrid merge ─► saturation ─► explanations
//! ```
//!
//! Every stage except the merge input from the external predictor is a pure
//! function of the mission and camp. [`RuleEngine`] only carries the tunable
//! policy tables and is cheap to clone into concurrent camp tasks.

pub mod explanation;
pub mod merge;
pub mod requirements;
pub mod risk;
pub mod saturation;
pub mod urgency;

use serde::{Deserialize, Serialize};

use crate::models::{Camp, CampAnalysis, Mission, RiskLevel, Severity};
use crate::predictor::Prediction;

pub use explanation::generate_explanations;
pub use merge::{append_explanations, merge_prediction, MergedOutput, RuleOutput};
pub use requirements::RequirementPolicy;
pub use risk::RiskWeights;
pub use saturation::saturation_percentage;
pub use urgency::{evaluate_urgency, supply_window_hours, UrgencyAssessment};

/// Normalised inputs shared by the calculators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampContext {
    pub population: u64,
    pub injured: u64,
    pub severity: Severity,
    pub urgency: UrgencyAssessment,
}

impl CampContext {
    pub fn from_camp(mission: &Mission, camp: &Camp) -> Self {
        Self {
            population: camp.headcount(),
            injured: camp.injured(),
            severity: mission.severity(),
            urgency: evaluate_urgency(camp.effective_urgency(mission)),
        }
    }
}

/// Policy tables for the calculators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEngine {
    pub requirements: RequirementPolicy,
    pub risk: RiskWeights,
}

impl RuleEngine {
    pub fn new(requirements: RequirementPolicy, risk: RiskWeights) -> Self {
        Self { requirements, risk }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.requirements.validate()?;
        self.risk.validate()
    }

    /// Requirement estimate and local risk score for a camp.
    pub fn evaluate(&self, ctx: &CampContext) -> RuleOutput {
        RuleOutput {
            requirements: self.requirements.estimate(ctx),
            risk_score: f64::from(self.risk.score(ctx)),
        }
    }

    /// Merge with the optional prediction and build the final camp analysis.
    pub fn finish(
        &self,
        camp: &Camp,
        ctx: &CampContext,
        local: &RuleOutput,
        prediction: Option<&Prediction>,
    ) -> CampAnalysis {
        let merged = merge_prediction(local, prediction);
        let saturation = saturation_percentage(ctx.urgency.supply_window_hours);
        let explanations = append_explanations(
            generate_explanations(ctx, &merged.requirements),
            merged.external_explanations,
        );

        CampAnalysis {
            camp_id: camp.id.clone(),
            camp_name: camp.name.clone(),
            population: ctx.population,
            injured_count: ctx.injured,
            urgency: ctx.urgency.label.clone(),
            requirements: merged.requirements,
            risk_score: merged.risk_score,
            risk_level: RiskLevel::from_score(merged.risk_score),
            saturation_percentage: saturation,
            prediction_source: merged.prediction_source,
            explanations,
        }
    }

    /// Full pipeline without an external predictor.
    pub fn analyze(&self, mission: &Mission, camp: &Camp) -> CampAnalysis {
        let ctx = CampContext::from_camp(mission, camp);
        let local = self.evaluate(&ctx);
        self.finish(camp, &ctx, &local, None)
    }
}
