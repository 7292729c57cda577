//! PostgresTrainerStore - Production Storage
//!
//! TigerStyle: Real database storage, one transaction per create.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS trainers (
//!     id BIGSERIAL PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     age INTEGER,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! CREATE TABLE IF NOT EXISTS trainer_items (
//!     id BIGSERIAL PRIMARY KEY,
//!     trainer_id BIGINT NOT NULL REFERENCES trainers(id),
//!     name TEXT NOT NULL
//! );
//! CREATE INDEX IF NOT EXISTS idx_trainer_items_trainer ON trainer_items(trainer_id);
//! ```
//!
//! Ids come from `BIGSERIAL`, so concurrent creates never collide and a
//! rolled back create burns its id instead of reusing it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::backend::TrainerStore;
use super::error::{StorageError, StorageResult};
use crate::trainer::{NewTrainer, Trainer, TrainerId};

/// Advisory lock key held while the schema is created
const SCHEMA_LOCK_KEY: i64 = 0x7472_6169_6e65_72;

const SCHEMA_STATEMENTS: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS trainers (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        age INTEGER,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trainer_items (
        id BIGSERIAL PRIMARY KEY,
        trainer_id BIGINT NOT NULL REFERENCES trainers(id),
        name TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_trainer_items_trainer ON trainer_items(trainer_id)",
];

// =============================================================================
// PostgresTrainerStore
// =============================================================================

/// PostgreSQL trainer store.
#[derive(Debug, Clone)]
pub struct PostgresTrainerStore {
    pool: PgPool,
}

impl PostgresTrainerStore {
    /// Connect to the database and make sure the schema exists.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] if the pool cannot be created or
    /// the schema cannot be initialized.
    pub async fn connect(connection_string: &str, max_connections: u32) -> StorageResult<Self> {
        // Preconditions
        assert!(
            !connection_string.is_empty(),
            "connection string cannot be empty"
        );
        assert!(max_connections > 0, "pool needs at least one connection");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|e| StorageError::unavailable(format!("failed to connect: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StorageResult<()> {
        // Concurrent `CREATE TABLE IF NOT EXISTS` can still collide, so
        // schema setup is serialized on an advisory lock.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::unavailable(format!("failed to create schema: {e}")))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::unavailable(format!("failed to create schema: {e}")))?;

        // One statement per query: prepared statements hold a single command.
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::unavailable(format!("failed to create schema: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::unavailable(format!("failed to create schema: {e}")))?;

        tracing::debug!("trainer schema ready");
        Ok(())
    }

    /// Get the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn row_to_trainer(row: &PgRow, items: Vec<String>) -> StorageResult<Trainer> {
    let id: i64 = row.try_get("id").map_err(|e| StorageError::corrupt(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| StorageError::corrupt(e.to_string()))?;
    let age: Option<i32> = row.try_get("age").map_err(|e| StorageError::corrupt(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| StorageError::corrupt(e.to_string()))?;

    Ok(Trainer {
        id,
        name,
        age,
        items,
        created_at,
    })
}

// =============================================================================
// TrainerStore Implementation
// =============================================================================

#[async_trait]
impl TrainerStore for PostgresTrainerStore {
    async fn get_by_id(&self, id: TrainerId) -> StorageResult<Option<Trainer>> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query("SELECT id, name, age, created_at FROM trainers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<String> =
            sqlx::query_scalar("SELECT name FROM trainer_items WHERE trainer_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(&mut *conn)
                .await?;

        let trainer = row_to_trainer(&row, items)?;

        // Postcondition
        assert_eq!(trainer.id, id, "returned trainer must match requested id");
        Ok(Some(trainer))
    }

    async fn create(&self, trainer: &NewTrainer) -> StorageResult<TrainerId> {
        // Precondition
        assert!(!trainer.name.is_empty(), "trainer must have a name");

        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        let id: TrainerId =
            sqlx::query_scalar("INSERT INTO trainers (name, age) VALUES ($1, $2) RETURNING id")
                .bind(&trainer.name)
                .bind(trainer.age)
                .fetch_one(&mut *tx)
                .await?;

        for item in &trainer.items {
            sqlx::query("INSERT INTO trainer_items (trainer_id, name) VALUES ($1, $2)")
                .bind(id)
                .bind(item)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        // Postcondition
        assert!(id > 0, "serial ids start at 1");
        Ok(id)
    }
}

// =============================================================================
// Tests (require running Postgres)
// =============================================================================
