//! Hybrid merge of the rule engine output with an optional external prediction.
//!
//! Precedence:
//! - food, water, beds, medical kits and ambulances always keep the rule values
//! - toilets, power units, blankets and volunteers take the larger of the two
//! - the risk score is the mean of both scores when the predictor supplied one,
//!   and only then is the result tagged [`PredictionSource::HybridAi`]
//! - predictor explanations are appended after the rule explanations

use crate::models::{PredictionSource, RequirementEstimate};
use crate::predictor::Prediction;

/// What the rule engine computed locally for one camp.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutput {
    pub requirements: RequirementEstimate,
    pub risk_score: f64,
}

/// Result of merging the rule output with the predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedOutput {
    pub requirements: RequirementEstimate,
    pub risk_score: f64,
    pub prediction_source: PredictionSource,
    /// Explanations contributed by the predictor, to follow the rule lines
    pub external_explanations: Vec<String>,
}

pub fn merge_prediction(local: &RuleOutput, external: Option<&Prediction>) -> MergedOutput {
    let Some(prediction) = external else {
        return MergedOutput {
            requirements: local.requirements,
            risk_score: local.risk_score,
            prediction_source: PredictionSource::RuleEngine,
            external_explanations: Vec::new(),
        };
    };

    let mut requirements = local.requirements;
    if let Some(predicted) = &prediction.requirements {
        let raise = |current: u64, suggested: Option<u64>| suggested.map_or(current, |v| current.max(v));
        requirements.toilets = raise(requirements.toilets, predicted.toilets_required);
        requirements.power_units = raise(requirements.power_units, predicted.power_units_required);
        requirements.blankets = raise(requirements.blankets, predicted.blankets_required);
        requirements.volunteers = raise(requirements.volunteers, predicted.volunteers_required);
    }

    let (risk_score, prediction_source) = match prediction.risk_score {
        Some(external_score) if external_score.is_finite() => (
            ((local.risk_score + external_score) / 2.0).clamp(0.0, 100.0),
            PredictionSource::HybridAi,
        ),
        _ => (local.risk_score, PredictionSource::RuleEngine),
    };

    MergedOutput {
        requirements,
        risk_score,
        prediction_source,
        external_explanations: prediction
            .explanations
            .iter()
            .flatten()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Append predictor explanations to the rule explanations, skipping repeats.
pub fn append_explanations(mut rule_lines: Vec<String>, external: Vec<String>) -> Vec<String> {
    for line in external {
        if !rule_lines.contains(&line) {
            rule_lines.push(line);
        }
    }
    rule_lines
}
