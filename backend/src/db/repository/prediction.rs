use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CampPredictionRecord, MissionId};

/// Append-only history of camp analyses.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Append one record. Existing records for the same camp are kept.
    async fn save_prediction(&self, record: &CampPredictionRecord) -> RepositoryResult<()>;

    /// Every record stored for a mission, oldest first.
    async fn find_predictions_by_mission(
        &self,
        mission_id: &MissionId,
    ) -> RepositoryResult<Vec<CampPredictionRecord>>;
}
