//! In-memory local repository implementation.
//!
//! Used by the development server and by tests. Missions, camps and the
//! prediction history live behind a single lock; clones share the same data.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{Camp, CampPredictionRecord, Mission, MissionId};

/// In-memory local repository.
///
/// # Example
/// ```
/// use idro_impact::db::repositories::LocalRepository;
/// use idro_impact::models::{Camp, Mission};
///
/// let repo = LocalRepository::new();
/// repo.insert_mission(Mission::new("m-1").with_disaster_type("Flood"));
/// repo.insert_camp(Camp::new("c-1", "m-1", "North shelter").with_population(120));
/// assert_eq!(repo.camp_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    missions: HashMap<MissionId, Mission>,
    // Insertion order is the storage order reported to callers.
    camps: Vec<Camp>,
    predictions: Vec<CampPredictionRecord>,

    // Failure injection
    is_healthy: bool,
    fail_saves: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            missions: HashMap::new(),
            camps: Vec::new(),
            predictions: Vec::new(),
            is_healthy: true,
            fail_saves: false,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Add or replace a mission.
    pub fn insert_mission(&self, mission: Mission) {
        self.data.write().missions.insert(mission.id.clone(), mission);
    }

    /// Add a camp. Camps are not checked against existing missions.
    pub fn insert_camp(&self, camp: Camp) {
        self.data.write().camps.push(camp);
    }

    /// Set the health status for testing connection failures.
    ///
    /// An unhealthy repository fails every read and write.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make `save_prediction` fail while reads keep working.
    pub fn set_fail_saves(&self, fail: bool) {
        self.data.write().fail_saves = fail;
    }

    /// Clear all data, keeping the failure switches.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            fail_saves: data.fail_saves,
            ..Default::default()
        };
    }

    pub fn mission_count(&self) -> usize {
        self.data.read().missions.len()
    }

    pub fn camp_count(&self) -> usize {
        self.data.read().camps.len()
    }

    /// Number of stored prediction records across all missions.
    pub fn prediction_count(&self) -> usize {
        self.data.read().predictions.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection(
                "Local repository is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MissionRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn find_mission_by_id(&self, mission_id: &MissionId) -> RepositoryResult<Option<Mission>> {
        self.check_health("find_mission_by_id")?;
        Ok(self.data.read().missions.get(mission_id).cloned())
    }

    async fn find_camps_by_mission_id(&self, mission_id: &MissionId) -> RepositoryResult<Vec<Camp>> {
        self.check_health("find_camps_by_mission_id")?;
        Ok(self
            .data
            .read()
            .camps
            .iter()
            .filter(|camp| &camp.mission_id == mission_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PredictionRepository for LocalRepository {
    async fn save_prediction(&self, record: &CampPredictionRecord) -> RepositoryResult<()> {
        self.check_health("save_prediction")?;
        let mut data = self.data.write();
        if data.fail_saves {
            return Err(RepositoryError::internal(
                "Prediction writes are disabled",
                ErrorContext::new("save_prediction").with_entity("camp", &record.camp_id),
            ));
        }
        data.predictions.push(record.clone());
        Ok(())
    }

    async fn find_predictions_by_mission(
        &self,
        mission_id: &MissionId,
    ) -> RepositoryResult<Vec<CampPredictionRecord>> {
        self.check_health("find_predictions_by_mission")?;
        Ok(self
            .data
            .read()
            .predictions
            .iter()
            .filter(|record| &record.mission_id == mission_id)
            .cloned()
            .collect())
    }
}
