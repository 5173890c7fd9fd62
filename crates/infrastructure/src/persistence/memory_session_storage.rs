//! In-memory session storage for sessions that must not outlive the process.

use std::collections::HashMap;

use async_trait::async_trait;
use mentorlink_application::ports::{SessionStorage, StorageError};
use parking_lot::Mutex;

/// Session storage kept in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}
