//! Trainer Service
//!
//! TigerStyle: The two RPC operations, stateless, over an injected store.
//!
//! `GetTrainer` output is a compatibility contract with existing clients:
//!
//! ```text
//! ID: <id>
//! Name: <name>
//! Age: <age>          (only when the trainer has an age)
//! Pokemon: <item>     (one per item, storage order)
//! ```
//!
//! A lookup miss is not an error; it renders as the single line
//! [`TRAINER_NOT_FOUND`].

use std::sync::Arc;

use tracing::Instrument;

use crate::storage::{StorageError, TrainerStore};
use crate::trainer::{NewTrainer, Trainer, TrainerId, ValidationError};

/// Line returned by `GetTrainer` for an unknown id.
pub const TRAINER_NOT_FOUND: &str = "Trainer not found";

// =============================================================================
// TrainerService
// =============================================================================

/// Implements `GetTrainer` and `PostTrainer`.
#[derive(Clone)]
pub struct TrainerService {
    store: Arc<dyn TrainerStore>,
}

impl TrainerService {
    /// Create a service over the given store.
    pub fn new(store: Arc<dyn TrainerStore>) -> Self {
        Self { store }
    }

    /// Fetch a trainer and render it as response lines.
    ///
    /// # Errors
    /// Returns [`ServiceError::StorageUnavailable`] if the store fails.
    pub async fn get_trainer(&self, id: TrainerId) -> Result<Vec<String>, ServiceError> {
        let span = tracing::info_span!("GetTrainer", id);
        async move {
            let lines = match self.store.get_by_id(id).await? {
                Some(trainer) => render_trainer(&trainer),
                None => {
                    tracing::info!("trainer not found");
                    vec![TRAINER_NOT_FOUND.to_string()]
                }
            };
            Ok(lines)
        }
        .instrument(span)
        .await
    }

    /// Validate and persist a trainer, returning the confirmation text.
    ///
    /// # Errors
    /// [`ServiceError::InvalidArgument`] when validation fails (nothing is
    /// persisted), [`ServiceError::StorageUnavailable`] if the store fails.
    pub async fn post_trainer(&self, trainer: NewTrainer) -> Result<String, ServiceError> {
        let span = tracing::info_span!("PostTrainer", name = %trainer.name, items = trainer.items.len());
        async move {
            if let Err(e) = trainer.validate() {
                tracing::warn!(error = %e, "rejected trainer");
                return Err(ServiceError::InvalidArgument(e));
            }

            let id = self.store.create(&trainer).await?;
            tracing::info!(id, "trainer created");

            Ok(format!(
                "Trainer '{}' with ID {} added successfully.",
                trainer.name, id
            ))
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for TrainerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainerService").finish_non_exhaustive()
    }
}

/// Render a trainer in the fixed line order.
pub fn render_trainer(trainer: &Trainer) -> Vec<String> {
    let mut lines = Vec::with_capacity(3 + trainer.items.len());
    lines.push(format!("ID: {}", trainer.id));
    lines.push(format!("Name: {}", trainer.name));
    if let Some(age) = trainer.age {
        lines.push(format!("Age: {age}"));
    }
    lines.extend(trainer.items.iter().map(|item| format!("Pokemon: {item}")));
    lines
}

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced to the transport as faults.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request was rejected; reported as a client fault.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The store failed; reported as a server fault and not retried.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTrainerStore;
    use chrono::Utc;

    fn service() -> (Arc<MemoryTrainerStore>, TrainerService) {
        let store = Arc::new(MemoryTrainerStore::new());
        let service = TrainerService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_ash_ketchum_scenario() {
        let (_, service) = service();

        let msg = service
            .post_trainer(NewTrainer::new("Ash Ketchum").with_items(["Pikachu", "Charizard", "Bulbasaur"]))
            .await
            .unwrap();
        assert_eq!(msg, "Trainer 'Ash Ketchum' with ID 1 added successfully.");

        let lines = service.get_trainer(1).await.unwrap();
        assert_eq!(
            lines,
            vec![
                "ID: 1",
                "Name: Ash Ketchum",
                "Pokemon: Pikachu",
                "Pokemon: Charizard",
                "Pokemon: Bulbasaur",
            ]
        );
    }

    #[tokio::test]
    async fn test_not_found_is_single_line() {
        let (_, service) = service();
        assert_eq!(service.get_trainer(7).await.unwrap(), vec![TRAINER_NOT_FOUND]);
        assert_eq!(service.get_trainer(-3).await.unwrap(), vec![TRAINER_NOT_FOUND]);
    }

    #[tokio::test]
    async fn test_empty_name_persists_nothing() {
        let (store, service) = service();

        let err = service.post_trainer(NewTrainer::new("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(ValidationError::EmptyName)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_nul_and_blank_items_are_invalid_arguments() {
        let (store, service) = service();

        for trainer in [
            NewTrainer::new("Ash\0"),
            NewTrainer::new("Ash").with_item("Pika\0chu"),
            NewTrainer::new("Ash").with_items(["Pikachu", ""]),
        ] {
            assert!(matches!(
                service.post_trainer(trainer).await,
                Err(ServiceError::InvalidArgument(_))
            ));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let (store, service) = service();
        store.set_unavailable(true);

        assert!(matches!(
            service.post_trainer(NewTrainer::new("Misty")).await,
            Err(ServiceError::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.get_trainer(1).await,
            Err(ServiceError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn test_render_includes_age_when_known() {
        let trainer = Trainer {
            id: 9,
            name: "Brock".to_string(),
            age: Some(15),
            items: vec!["Onix".to_string()],
            created_at: Utc::now(),
        };
        assert_eq!(
            render_trainer(&trainer),
            vec!["ID: 9", "Name: Brock", "Age: 15", "Pokemon: Onix"]
        );
    }
}
