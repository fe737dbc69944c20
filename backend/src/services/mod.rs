//! Service layer for business logic and orchestration.
//!
//! Services sit between the repository and the HTTP handlers: they own the
//! analysis workflow and never touch storage details directly.

pub mod history;
pub mod impact_analysis;

pub use history::{latest_predictions, prediction_history};
pub use impact_analysis::{
    overall_risk_score, AnalysisError, CampAnalysisError, ImpactAnalysisService,
};
