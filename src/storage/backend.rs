//! TrainerStore - Persistence seam for trainers

use async_trait::async_trait;

use super::error::StorageResult;
use crate::trainer::{NewTrainer, Trainer, TrainerId};

/// Persistence of trainers and the items they own.
///
/// Implementations must assign strictly increasing ids that are never reused,
/// and a create must either persist the trainer with all of its items or
/// nothing at all.
#[async_trait]
pub trait TrainerStore: Send + Sync {
    /// Look up a trainer with its items. `Ok(None)` when no such id exists.
    async fn get_by_id(&self, id: TrainerId) -> StorageResult<Option<Trainer>>;

    /// Persist a new trainer and its items, returning the assigned id.
    ///
    /// The request is expected to be validated already.
    async fn create(&self, trainer: &NewTrainer) -> StorageResult<TrainerId>;
}
