//! Storage errors

/// Result alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised by a [`super::TrainerStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be reached or a transaction failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A row could not be mapped back into a trainer.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a corrupt row error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => Self::Corrupt(err.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
