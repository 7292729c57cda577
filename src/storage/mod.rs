//! Storage - Trainer Store Trait and Implementations
//!
//! TigerStyle: Abstract storage, injected into the service at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TrainerStore Trait                        │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴──────────┐         ┌────────┴─────────────┐
//! │MemoryTrainerStore │         │ PostgresTrainerStore │
//! │ (tests, demo)     │         │  (production)        │
//! └───────────────────┘         └──────────────────────┘
//! ```

mod backend;
mod error;
mod memory;
mod postgres;

pub use backend::TrainerStore;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryTrainerStore;
pub use postgres::PostgresTrainerStore;
