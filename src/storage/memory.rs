//! MemoryTrainerStore - In-process storage for tests and demo mode
//!
//! TigerStyle: Same contract as Postgres, plus a switch that makes every
//! call fail so the unavailable path can be exercised without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::backend::TrainerStore;
use super::error::{StorageError, StorageResult};
use crate::trainer::{NewTrainer, Trainer, TrainerId};

#[derive(Debug, Default)]
struct Inner {
    trainers: BTreeMap<TrainerId, Trainer>,
    /// Last id handed out. Only ever grows.
    last_id: TrainerId,
}

/// Trainer store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryTrainerStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl MemoryTrainerStore {
    /// Create an empty store. The first id assigned is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the demo trainers (ids 1 to 3).
    pub fn seeded() -> Self {
        let demo = [
            ("Ash Ketchum", &["Pikachu", "Charizard", "Bulbasaur"][..]),
            ("Misty", &["Starmie", "Psyduck"][..]),
            ("Brock", &["Onix", "Geodude", "Vulpix"][..]),
        ];

        let mut inner = Inner::default();
        for (name, items) in demo {
            let trainer = NewTrainer::new(name).with_items(items.iter().copied());
            inner.insert(&trainer);
        }

        Self {
            inner: RwLock::new(inner),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of trainers currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.trainers.len()
    }

    /// Whether the store holds no trainers.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("memory store switched off"));
        }
        Ok(())
    }
}

impl Inner {
    fn insert(&mut self, trainer: &NewTrainer) -> TrainerId {
        let id = self.last_id + 1;
        self.last_id = id;

        self.trainers.insert(
            id,
            Trainer {
                id,
                name: trainer.name.clone(),
                age: trainer.age,
                items: trainer.items.clone(),
                created_at: Utc::now(),
            },
        );

        // Postcondition
        assert!(self.trainers.contains_key(&id), "inserted trainer must be readable");
        id
    }
}

#[async_trait]
impl TrainerStore for MemoryTrainerStore {
    async fn get_by_id(&self, id: TrainerId) -> StorageResult<Option<Trainer>> {
        self.check_available()?;
        Ok(self.inner.read().await.trainers.get(&id).cloned())
    }

    async fn create(&self, trainer: &NewTrainer) -> StorageResult<TrainerId> {
        self.check_available()?;
        // Id assignment and insert happen under one write lock.
        Ok(self.inner.write().await.insert(trainer))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryTrainerStore::new();
        let id = store
            .create(&NewTrainer::new("Ash Ketchum").with_items(["Pikachu", "Charizard"]))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let trainer = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(trainer.name, "Ash Ketchum");
        assert_eq!(trainer.items, vec!["Pikachu", "Charizard"]);
        assert_eq!(trainer.age, None);

        assert!(store.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_continues_after_demo_ids() {
        let store = MemoryTrainerStore::seeded();
        assert_eq!(store.len().await, 3);

        let misty = store.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(misty.items, vec!["Starmie", "Psyduck"]);

        let id = store.create(&NewTrainer::new("Gary")).await.unwrap();
        assert_eq!(id, 4);
    }

    #[tokio::test]
    async fn test_unavailable_fails_fast_and_persists_nothing() {
        let store = MemoryTrainerStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.create(&NewTrainer::new("Ash")).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(store.get_by_id(1).await, Err(StorageError::Unavailable(_))));

        store.set_unavailable(false);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemoryTrainerStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.create(&NewTrainer::new(format!("Trainer{i}"))).await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
    }
}
