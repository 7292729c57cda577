//! Trainer - Records managed by the service
//!
//! TigerStyle: Explicit types, validation before persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ITEM_NAME_BYTES_MAX, TRAINER_AGE_MAX, TRAINER_ITEMS_COUNT_MAX, TRAINER_NAME_BYTES_MAX};

/// Store-assigned trainer identifier.
pub type TrainerId = i64;

// =============================================================================
// Trainer
// =============================================================================

/// A persisted trainer together with the items (Pokemon) it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    /// Identifier assigned by the store, never changes
    pub id: TrainerId,
    /// Display name
    pub name: String,
    /// Age, if known
    pub age: Option<i32>,
    /// Owned item names in insertion order
    pub items: Vec<String>,
    /// When the store persisted the record
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// NewTrainer
// =============================================================================

/// Creation request for a trainer that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTrainer {
    pub name: String,
    pub age: Option<i32>,
    pub items: Vec<String>,
}

impl NewTrainer {
    /// Create a request with a name and no items.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            items: Vec::new(),
        }
    }

    /// Set the age.
    #[must_use]
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    /// Append an owned item.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Replace the owned items.
    #[must_use]
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Check the request against the record limits.
    ///
    /// Whitespace-only names and items are treated as empty. NUL bytes are
    /// refused up front since Postgres cannot store them in `TEXT`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.name.len() > TRAINER_NAME_BYTES_MAX {
            return Err(ValidationError::NameTooLong {
                len: self.name.len(),
                max: TRAINER_NAME_BYTES_MAX,
            });
        }
        if self.name.contains('\0') {
            return Err(ValidationError::NulByte);
        }
        if let Some(age) = self.age {
            if !(0..=TRAINER_AGE_MAX).contains(&age) {
                return Err(ValidationError::AgeOutOfRange {
                    age,
                    max: TRAINER_AGE_MAX,
                });
            }
        }
        if self.items.len() > TRAINER_ITEMS_COUNT_MAX {
            return Err(ValidationError::TooManyItems {
                count: self.items.len(),
                max: TRAINER_ITEMS_COUNT_MAX,
            });
        }
        if let Some(item) = self.items.iter().find(|i| i.len() > ITEM_NAME_BYTES_MAX) {
            return Err(ValidationError::ItemNameTooLong {
                len: item.len(),
                max: ITEM_NAME_BYTES_MAX,
            });
        }
        if self.items.iter().any(|i| i.trim().is_empty()) {
            return Err(ValidationError::EmptyItem);
        }
        if self.items.iter().any(|i| i.contains('\0')) {
            return Err(ValidationError::NulByte);
        }
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Reasons a creation request is rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("trainer name must not be empty")]
    EmptyName,

    #[error("trainer name is {len} bytes, max is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("trainer age {age} is outside 0..={max}")]
    AgeOutOfRange { age: i32, max: i32 },

    #[error("trainer has {count} items, max is {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("item name is {len} bytes, max is {max}")]
    ItemNameTooLong { len: usize, max: usize },

    #[error("item name must not be empty")]
    EmptyItem,

    #[error("names must not contain NUL bytes")]
    NulByte,
}

// =============================================================================
// Tests
// =============================================================================
