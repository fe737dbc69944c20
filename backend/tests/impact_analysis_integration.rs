//! End-to-end tests of mission impact analysis against the local repository.

mod support;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use idro_impact::db::{
    FullRepository, LocalRepository, MissionRepository, PredictionRepository, RepositoryResult,
};
use idro_impact::models::{
    Camp, CampPredictionRecord, Mission, MissionId, PredictionSource, RiskLevel,
};
use idro_impact::predictor::Prediction;
use idro_impact::services::{prediction_history, AnalysisError, ImpactAnalysisService};

use support::*;

fn service(repo: &LocalRepository) -> ImpactAnalysisService {
    ImpactAnalysisService::new(Arc::new(repo.clone()) as Arc<dyn FullRepository>)
}

fn m1() -> MissionId {
    MissionId::from("m-1")
}

fn reference_camp() -> Camp {
    Camp::new("c-1", "m-1", "Relief Hub A")
        .with_population(100)
        .with_injured(10)
        .with_urgency("Immediate")
}

// =========================================================
// Contract
// =========================================================

#[tokio::test]
async fn test_reference_mission() {
    let repo = mission_with_camps(Mission::new("m-1").with_disaster_type("FLOOD"), vec![reference_camp()]);

    let result = service(&repo).analyze_mission_impact(&m1()).await.unwrap();

    assert_eq!(result.camp_count(), 1);
    let camp = &result.camp_analysis_list[0];
    assert_eq!(camp.requirements.food_packets, 300);
    assert_eq!(camp.requirements.water_liters, 500);
    assert_eq!(camp.requirements.beds, 10);
    assert_eq!(camp.requirements.medical_kits, 5);
    assert_eq!(camp.requirements.ambulances, 3);
    assert_eq!(camp.saturation_percentage, 100.0);
    assert_eq!(camp.prediction_source, PredictionSource::RuleEngine);
    assert_eq!(camp.risk_score, 46.0);
    assert_eq!(camp.risk_level, RiskLevel::Medium);
    assert_eq!(
        camp.explanations,
        vec![
            "Population of 100 requires 300 food packets and 500 liters of water per day.",
            "10 injured people require 10 beds and medical kits.",
            "Urgency level: IMMEDIATE.",
            "Recommend deploying 3 ambulances.",
        ]
    );
    assert_eq!(result.overall_risk_score, 46.0);
}

#[tokio::test]
async fn test_zero_camps_scores_zero() {
    let repo = mission_with_camps(Mission::new("m-1"), vec![]);

    let result = service(&repo).analyze_mission_impact(&m1()).await.unwrap();

    assert!(result.camp_analysis_list.is_empty());
    assert_eq!(result.overall_risk_score, 0.0);
    assert_eq!(repo.prediction_count(), 0);
}

#[tokio::test]
async fn test_unknown_mission_fails_without_writes() {
    let repo = mission_with_camps(Mission::new("m-1"), vec![reference_camp()]);

    let err = service(&repo)
        .analyze_mission_impact(&MissionId::from("m-404"))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::MissionNotFound(ref id) if id.as_str() == "m-404"));
    assert_eq!(repo.prediction_count(), 0);
}

#[tokio::test]
async fn test_store_outage_is_unavailable() {
    let repo = mission_with_camps(Mission::new("m-1"), vec![reference_camp()]);
    repo.set_healthy(false);

    let err = service(&repo).analyze_mission_impact(&m1()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Unavailable { .. }));
}

#[tokio::test]
async fn test_overall_score_is_rounded_unweighted_mean() {
    let repo = mission_with_camps(Mission::new("m-1").with_magnitude("6.4"), numbered_camps(3));

    let result = service(&repo).analyze_mission_impact(&m1()).await.unwrap();

    let scores: Vec<f64> = result.camp_analysis_list.iter().map(|c| c.risk_score).collect();
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    assert_eq!(result.overall_risk_score, (mean * 100.0).round() / 100.0);
}

// =========================================================
// Hybrid predictor
// =========================================================

#[tokio::test]
async fn test_predictor_score_makes_camp_hybrid() {
    let repo = mission_with_camps(Mission::new("m-1"), vec![reference_camp()]);
    let predictor = Arc::new(FixedPredictor::new(Prediction {
        risk_score: Some(80.0),
        explanations: Some(vec!["Road access cut by flooding.".into()]),
        ..Default::default()
    }));

    let result = service(&repo)
        .with_predictor(predictor.clone())
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    let camp = &result.camp_analysis_list[0];
    assert_eq!(predictor.calls(), 1);
    assert_eq!(camp.prediction_source, PredictionSource::HybridAi);
    assert_eq!(camp.risk_score, 63.0);
    assert_eq!(camp.risk_level, RiskLevel::High);
    assert_eq!(camp.requirements.food_packets, 300);
    assert_eq!(camp.explanations.len(), 5);
    assert_eq!(camp.explanations[4], "Road access cut by flooding.");
}

#[tokio::test]
async fn test_predictor_without_score_stays_rule_engine() {
    let repo = mission_with_camps(Mission::new("m-1"), vec![reference_camp()]);
    let predictor = Arc::new(FixedPredictor::new(Prediction {
        prediction_source: Some("ML".into()),
        ..Default::default()
    }));

    let result = service(&repo)
        .with_predictor(predictor)
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    assert_eq!(result.camp_analysis_list[0].prediction_source, PredictionSource::RuleEngine);
    assert_eq!(result.camp_analysis_list[0].risk_score, 46.0);
}

#[tokio::test]
async fn test_predictor_failure_only_affects_its_camp() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(3));

    let result = service(&repo)
        .with_predictor(Arc::new(FailingFor { affected_count: 200 }))
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    let sources: Vec<PredictionSource> = result
        .camp_analysis_list
        .iter()
        .map(|c| c.prediction_source)
        .collect();
    assert_eq!(
        sources,
        vec![PredictionSource::HybridAi, PredictionSource::RuleEngine, PredictionSource::HybridAi]
    );
}

#[tokio::test]
async fn test_hanging_predictor_times_out() {
    let repo = mission_with_camps(Mission::new("m-1"), vec![reference_camp()]);
    let service = service(&repo)
        .with_predictor(Arc::new(HangingPredictor))
        .with_predictor_timeout(Duration::from_millis(50));

    let result = tokio::time::timeout(Duration::from_secs(5), service.analyze_mission_impact(&m1()))
        .await
        .expect("analysis should not wait for the predictor")
        .unwrap();

    assert_eq!(result.camp_analysis_list[0].prediction_source, PredictionSource::RuleEngine);
}

// =========================================================
// Containment
// =========================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_camp_is_omitted() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(3));

    let result = service(&repo)
        .with_predictor(Arc::new(PanicsFor { affected_count: 200 }))
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    let ids: Vec<&str> = result.camp_analysis_list.iter().map(|c| c.camp_id.as_str()).collect();
    assert_eq!(ids, vec!["c-0", "c-2"]);
    assert_eq!(repo.prediction_count(), 2);
}

/// Returns a stray camp of another mission alongside the real ones.
struct MisroutingRepository {
    inner: LocalRepository,
    stray: Camp,
}

#[async_trait]
impl MissionRepository for MisroutingRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn find_mission_by_id(&self, mission_id: &MissionId) -> RepositoryResult<Option<Mission>> {
        self.inner.find_mission_by_id(mission_id).await
    }

    async fn find_camps_by_mission_id(&self, mission_id: &MissionId) -> RepositoryResult<Vec<Camp>> {
        let mut camps = self.inner.find_camps_by_mission_id(mission_id).await?;
        camps.insert(0, self.stray.clone());
        Ok(camps)
    }
}

#[async_trait]
impl PredictionRepository for MisroutingRepository {
    async fn save_prediction(&self, record: &CampPredictionRecord) -> RepositoryResult<()> {
        self.inner.save_prediction(record).await
    }

    async fn find_predictions_by_mission(
        &self,
        mission_id: &MissionId,
    ) -> RepositoryResult<Vec<CampPredictionRecord>> {
        self.inner.find_predictions_by_mission(mission_id).await
    }
}

#[tokio::test]
async fn test_camp_of_other_mission_is_omitted() {
    let inner = mission_with_camps(Mission::new("m-1"), vec![reference_camp()]);
    let repo = MisroutingRepository {
        inner: inner.clone(),
        stray: Camp::new("c-stray", "m-2", "Elsewhere").with_population(5000),
    };

    let result = ImpactAnalysisService::new(Arc::new(repo))
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    assert_eq!(result.camp_count(), 1);
    assert!(result.find_camp(&"c-stray".into()).is_none());
    assert_eq!(inner.prediction_count(), 1);
}

// =========================================================
// Persistence
// =========================================================

#[tokio::test]
async fn test_persistence_failure_still_returns_results() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(4));
    repo.set_fail_saves(true);

    let result = service(&repo).analyze_mission_impact(&m1()).await.unwrap();

    assert_eq!(result.camp_count(), 4);
    assert_eq!(repo.prediction_count(), 0);
}

#[tokio::test]
async fn test_reruns_append_history() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(2));
    let service = service(&repo);

    service.analyze_mission_impact(&m1()).await.unwrap();
    service.analyze_mission_impact(&m1()).await.unwrap();

    let history = prediction_history(&repo, &m1()).await.unwrap();
    assert_eq!(history.len(), 4);
    let ids: std::collections::HashSet<_> = history.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 4);
    assert!(history.iter().all(|r| r.mission_id == m1()));
}

// =========================================================
// Concurrency
// =========================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fan_out_is_bounded() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(12));
    let probe = Arc::new(ConcurrencyProbe::with_delay(Duration::from_millis(25)));

    let result = service(&repo)
        .with_predictor(probe.clone())
        .with_max_concurrency(3)
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    assert_eq!(result.camp_count(), 12);
    assert!(probe.peak() >= 1);
    assert!(probe.peak() <= 3, "peak concurrency was {}", probe.peak());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_results_follow_camp_order() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(10));
    let probe = Arc::new(ConcurrencyProbe::with_delay(Duration::from_millis(5)));

    let result = service(&repo)
        .with_predictor(probe)
        .analyze_mission_impact(&m1())
        .await
        .unwrap();

    let ids: Vec<String> = result.camp_analysis_list.iter().map(|c| c.camp_id.to_string()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("c-{}", i)).collect();
    assert_eq!(ids, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_abandoned_call_still_persists() {
    let repo = mission_with_camps(Mission::new("m-1"), numbered_camps(4));
    let service = service(&repo).with_predictor(Arc::new(ConcurrencyProbe::with_delay(
        Duration::from_millis(100),
    )));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), service.analyze_mission_impact(&m1())).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(repo.prediction_count(), 4);
}
