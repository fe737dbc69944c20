use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Camp, Mission, MissionId};

/// Read access to missions and the camps attached to them.
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Whether the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch a mission. `Ok(None)` means the mission does not exist; errors
    /// are reserved for a store that could not answer.
    async fn find_mission_by_id(&self, mission_id: &MissionId) -> RepositoryResult<Option<Mission>>;

    /// All camps whose mission reference equals `mission_id`, in storage
    /// order. An unknown mission yields an empty list.
    async fn find_camps_by_mission_id(&self, mission_id: &MissionId) -> RepositoryResult<Vec<Camp>>;
}
