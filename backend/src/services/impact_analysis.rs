//! Mission impact analysis orchestration.
//!
//! [`ImpactAnalysisService::analyze_mission_impact`] loads a mission and its
//! camps, runs every camp through the rule engine (and the optional external
//! predictor) on its own tokio task, appends each camp result to the
//! prediction history and aggregates the mission-level risk score.
//!
//! Failure isolation:
//! - a camp that fails validation or whose task panics is logged and left out
//!   of the result; the other camps are unaffected
//! - predictor failures degrade that camp to the rule engine result
//! - history writes that fail are logged; the analysis is still returned
//!
//! Camp tasks are detached. Dropping the returned future stops waiting for
//! them but does not cancel them, so in-flight camps still finish and persist.

use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::ImpactConfig;
use crate::db::{FullRepository, RepositoryError};
use crate::engine::{CampContext, RuleEngine};
use crate::models::{
    Camp, CampAnalysis, CampId, CampPredictionRecord, Mission, MissionAnalysisResult, MissionId,
};
use crate::predictor::{predict_with_timeout, DisabledPredictor, ExternalPredictor, PredictionRequest};

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Upper bound on concurrent camp tasks accepted from configuration.
pub const MAX_CONCURRENCY_LIMIT: usize = 1024;
pub const DEFAULT_PREDICTOR_TIMEOUT: Duration = Duration::from_secs(3);

/// Mission-level failure of an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Mission not found: {0}")]
    MissionNotFound(MissionId),

    /// The store could not answer the mission or camp read.
    ///
    /// Kept apart from `MissionNotFound`: reporting an outage as a missing
    /// mission would tell callers that a live mission does not exist, and an
    /// empty result would look like a mission without camps. Callers can
    /// retry this one.
    #[error("Mission data unavailable for {mission_id}: {source}")]
    Unavailable {
        mission_id: MissionId,
        #[source]
        source: RepositoryError,
    },
}

/// Failure of a single camp. Never surfaces to callers of the service.
#[derive(Debug, thiserror::Error)]
pub enum CampAnalysisError {
    #[error("Invalid camp {camp_id}: {reason}")]
    InvalidCamp { camp_id: CampId, reason: String },

    #[error("Camp task failed: {0}")]
    TaskFailed(String),
}

/// Runs impact analyses against a repository and an optional predictor.
#[derive(Clone)]
pub struct ImpactAnalysisService {
    repository: Arc<dyn FullRepository>,
    predictor: Arc<dyn ExternalPredictor>,
    engine: Arc<RuleEngine>,
    max_concurrency: usize,
    predictor_timeout: Duration,
}

impl ImpactAnalysisService {
    /// Service with the default rule engine and no external predictor.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            predictor: Arc::new(DisabledPredictor),
            engine: Arc::new(RuleEngine::default()),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            predictor_timeout: DEFAULT_PREDICTOR_TIMEOUT,
        }
    }

    /// Service configured from [`ImpactConfig`]. The config is expected to
    /// have been validated.
    pub fn from_config(
        config: &ImpactConfig,
        repository: Arc<dyn FullRepository>,
        predictor: Arc<dyn ExternalPredictor>,
    ) -> Self {
        Self::new(repository)
            .with_predictor(predictor)
            .with_engine(config.rules.clone())
            .with_max_concurrency(config.analysis.max_concurrency)
            .with_predictor_timeout(config.analysis.predictor_timeout())
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn ExternalPredictor>) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Bound on concurrently running camp tasks, clamped to
    /// `1..=MAX_CONCURRENCY_LIMIT`.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.clamp(1, MAX_CONCURRENCY_LIMIT);
        self
    }

    pub fn with_predictor_timeout(mut self, timeout: Duration) -> Self {
        self.predictor_timeout = timeout;
        self
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repository
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Analyze every camp of a mission.
    ///
    /// Returns `MissionNotFound` without any side effects when the mission
    /// does not exist. Camp results are in the order the repository returned
    /// the camps; failed camps are omitted.
    pub async fn analyze_mission_impact(
        &self,
        mission_id: &MissionId,
    ) -> Result<MissionAnalysisResult, AnalysisError> {
        if mission_id.is_blank() {
            return Err(AnalysisError::MissionNotFound(mission_id.clone()));
        }

        let mission = self
            .repository
            .find_mission_by_id(mission_id)
            .await
            .map_err(|source| AnalysisError::Unavailable {
                mission_id: mission_id.clone(),
                source,
            })?
            .ok_or_else(|| AnalysisError::MissionNotFound(mission_id.clone()))?;

        info!(
            "Starting impact analysis for mission {} ({}, severity {})",
            mission.id,
            mission.disaster_type_label(),
            mission.severity_label()
        );

        let camps = self
            .repository
            .find_camps_by_mission_id(mission_id)
            .await
            .map_err(|source| AnalysisError::Unavailable {
                mission_id: mission_id.clone(),
                source,
            })?;

        info!("Mission {} has {} camps to analyze", mission.id, camps.len());

        let mission = Arc::new(mission);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let handles: Vec<_> = camps
            .into_iter()
            .map(|camp| {
                let task = CampTask {
                    mission: Arc::clone(&mission),
                    camp,
                    repository: Arc::clone(&self.repository),
                    predictor: Arc::clone(&self.predictor),
                    engine: Arc::clone(&self.engine),
                    predictor_timeout: self.predictor_timeout,
                };
                let semaphore = Arc::clone(&semaphore);
                let camp_id = task.camp.id.clone();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| CampAnalysisError::TaskFailed(e.to_string()))?;
                    task.run().await
                });
                (camp_id, handle)
            })
            .collect();

        let mut camp_analysis_list = Vec::with_capacity(handles.len());
        for (camp_id, handle) in handles {
            match handle.await {
                Ok(Ok(analysis)) => camp_analysis_list.push(analysis),
                Ok(Err(e)) => {
                    error!("Skipping camp {} of mission {}: {}", camp_id, mission.id, e);
                }
                Err(join_error) => {
                    let e = CampAnalysisError::TaskFailed(join_error.to_string());
                    error!("Skipping camp {} of mission {}: {}", camp_id, mission.id, e);
                }
            }
        }

        let overall_risk_score = overall_risk_score(&camp_analysis_list);
        info!(
            "Impact analysis for mission {} finished: {} camps analyzed, overall risk {:.2}",
            mission.id,
            camp_analysis_list.len(),
            overall_risk_score
        );

        Ok(MissionAnalysisResult {
            mission_id: mission.id.clone(),
            disaster_type: mission.disaster_type_label(),
            severity: mission.severity_label(),
            camp_analysis_list,
            overall_risk_score,
        })
    }
}

/// Everything one camp task owns.
struct CampTask {
    mission: Arc<Mission>,
    camp: Camp,
    repository: Arc<dyn FullRepository>,
    predictor: Arc<dyn ExternalPredictor>,
    engine: Arc<RuleEngine>,
    predictor_timeout: Duration,
}

impl CampTask {
    async fn run(self) -> Result<CampAnalysis, CampAnalysisError> {
        validate_camp(&self.mission, &self.camp)?;

        let ctx = CampContext::from_camp(&self.mission, &self.camp);
        let local = self.engine.evaluate(&ctx);

        let request = PredictionRequest::for_camp(&self.mission, &self.camp, &ctx.urgency.label);
        let prediction = predict_with_timeout(
            self.predictor.as_ref(),
            &request,
            self.predictor_timeout,
            &self.camp.id,
        )
        .await;

        let analysis = self
            .engine
            .finish(&self.camp, &ctx, &local, prediction.as_ref());
        debug!(
            "Camp {} analyzed: risk {} ({}), source {}",
            analysis.camp_id, analysis.risk_score, analysis.risk_level, analysis.prediction_source
        );

        let record = CampPredictionRecord::new(self.mission.id.clone(), analysis.clone());
        if let Err(e) = self.repository.save_prediction(&record).await {
            error!(
                "Failed to persist prediction for mission {} camp {}: {}",
                self.mission.id, self.camp.id, e
            );
        }

        Ok(analysis)
    }
}

fn validate_camp(mission: &Mission, camp: &Camp) -> Result<(), CampAnalysisError> {
    if camp.id.is_blank() {
        return Err(CampAnalysisError::InvalidCamp {
            camp_id: camp.id.clone(),
            reason: "camp identifier is empty".to_string(),
        });
    }
    if camp.mission_id != mission.id {
        return Err(CampAnalysisError::InvalidCamp {
            camp_id: camp.id.clone(),
            reason: format!(
                "camp belongs to mission {}, not {}",
                camp.mission_id, mission.id
            ),
        });
    }
    Ok(())
}

/// Unweighted mean of camp risk scores rounded to two decimals; 0.0 when
/// there are no camps.
pub fn overall_risk_score(analyses: &[CampAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    let sum: f64 = analyses.iter().map(|a| a.risk_score).sum();
    round2(sum / analyses.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "impact_analysis_tests.rs"]
mod tests;
