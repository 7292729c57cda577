//! Trainer SOAP Service
//!
//! TigerStyle: A thin, explicit CRUD service for Pokemon trainers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  POST /soap            │ soap (axum)        │
//! ├─────────────────────────────────────────────┤
//! │  GetTrainer/PostTrainer│ TrainerService     │
//! ├─────────────────────────────────────────────┤
//! │  TrainerStore trait    │ Postgres / Memory  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Store and service are built explicitly at startup and injected into the
//! transport; nothing is global.

pub mod config;
pub mod service;
pub mod soap;
pub mod storage;
pub mod trainer;

pub use service::{ServiceError, TrainerService};
pub use storage::{MemoryTrainerStore, PostgresTrainerStore, StorageError, TrainerStore};
pub use trainer::{NewTrainer, Trainer, TrainerId};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "trainer-soap";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP bind address
pub const HTTP_BIND_ADDRESS_DEFAULT: &str = "0.0.0.0:5000";

/// Default size of the Postgres connection pool
pub const DB_CONNECTIONS_COUNT_DEFAULT: u32 = 10;

/// Maximum trainer name length in bytes
pub const TRAINER_NAME_BYTES_MAX: usize = 255;

/// Maximum number of items a trainer can be created with
pub const TRAINER_ITEMS_COUNT_MAX: usize = 64;

/// Maximum item name length in bytes
pub const ITEM_NAME_BYTES_MAX: usize = 255;

/// Maximum trainer age
pub const TRAINER_AGE_MAX: i32 = 150;

/// Target namespace of the SOAP service
pub const SOAP_TARGET_NAMESPACE: &str = "trainer.soap.api";

/// Maximum accepted SOAP request body in bytes
pub const SOAP_REQUEST_BYTES_MAX: usize = 64 * 1024;
