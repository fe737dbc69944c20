//! Read side of the prediction history.

use std::collections::HashMap;

use crate::db::{PredictionRepository, RepositoryResult};
use crate::models::{CampId, CampPredictionRecord, MissionId};

/// Every stored camp analysis for a mission, oldest first.
pub async fn prediction_history<R>(
    repo: &R,
    mission_id: &MissionId,
) -> RepositoryResult<Vec<CampPredictionRecord>>
where
    R: PredictionRepository + ?Sized,
{
    let mut records = repo.find_predictions_by_mission(mission_id).await?;
    // Stable: records written in the same instant keep storage order.
    records.sort_by_key(|record| record.created_at);
    Ok(records)
}

/// The most recent record per camp, in the order camps first appear in the
/// history.
pub async fn latest_predictions<R>(
    repo: &R,
    mission_id: &MissionId,
) -> RepositoryResult<Vec<CampPredictionRecord>>
where
    R: PredictionRepository + ?Sized,
{
    let history = prediction_history(repo, mission_id).await?;

    let mut slots: HashMap<CampId, usize> = HashMap::new();
    let mut latest: Vec<CampPredictionRecord> = Vec::new();
    for record in history {
        match slots.get(&record.camp_id) {
            Some(&index) => latest[index] = record,
            None => {
                slots.insert(record.camp_id.clone(), latest.len());
                latest.push(record);
            }
        }
    }
    Ok(latest)
}
