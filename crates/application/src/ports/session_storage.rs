//! Session storage port
//!
//! Defines the durable key/value store backing the token store.

use async_trait::async_trait;
use mentorlink_domain::ApiError;

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The value handed to the store is not acceptable.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::storage(err.to_string())
    }
}

/// Durable client-side key/value storage.
///
/// `set_many` and `remove_many` apply a whole batch; adapters that can do so
/// commit the batch atomically.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes every entry of the batch.
    ///
    /// # Errors
    /// Returns an error if the batch cannot be persisted.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Removes every key of the batch. Missing keys are ignored.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;
}
