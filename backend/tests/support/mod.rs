//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use idro_impact::db::LocalRepository;
use idro_impact::models::{Camp, Mission};
use idro_impact::predictor::{
    ExternalPredictor, Prediction, PredictionRequest, PredictorError, PredictorResult,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Repository holding mission `m-1` with the given camps.
pub fn mission_with_camps(mission: Mission, camps: Vec<Camp>) -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_mission(mission);
    for camp in camps {
        repo.insert_camp(camp);
    }
    repo
}

/// `count` camps of mission `m-1`; camp `i` has population `(i + 1) * 100`.
pub fn numbered_camps(count: usize) -> Vec<Camp> {
    (0..count)
        .map(|i| {
            Camp::new(format!("c-{}", i), "m-1", format!("Camp {}", i))
                .with_population(((i + 1) * 100) as i64)
                .with_injured(i as i64)
                .with_urgency("12 Hours")
        })
        .collect()
}

/// Returns the same prediction for every camp.
pub struct FixedPredictor {
    pub prediction: Prediction,
    pub calls: AtomicUsize,
}

impl FixedPredictor {
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExternalPredictor for FixedPredictor {
    async fn predict(&self, _request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.prediction.clone()))
    }
}

/// Fails for camps with the given headcount, scores 90 for everyone else.
pub struct FailingFor {
    pub affected_count: u64,
}

#[async_trait]
impl ExternalPredictor for FailingFor {
    async fn predict(&self, request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        if request.affected_count == self.affected_count {
            return Err(PredictorError::Status {
                status: 500,
                body: "model crashed".into(),
            });
        }
        Ok(Some(Prediction {
            risk_score: Some(90.0),
            ..Default::default()
        }))
    }
}

/// Panics for camps with the given headcount.
pub struct PanicsFor {
    pub affected_count: u64,
}

#[async_trait]
impl ExternalPredictor for PanicsFor {
    async fn predict(&self, request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        if request.affected_count == self.affected_count {
            panic!("predictor client bug");
        }
        Ok(None)
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingPredictor;

#[async_trait]
impl ExternalPredictor for HangingPredictor {
    async fn predict(&self, _request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }
}

/// Records the highest number of calls in flight at once.
#[derive(Default)]
pub struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    pub delay: Duration,
}

impl ConcurrencyProbe {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExternalPredictor for ConcurrencyProbe {
    async fn predict(&self, _request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(None)
    }
}
