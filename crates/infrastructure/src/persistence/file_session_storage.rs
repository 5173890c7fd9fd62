//! File-based session storage.
//!
//! The whole key/value map lives in one JSON file. Every batch is written to
//! a temporary sibling file which is then renamed over the original, so a
//! crash mid-write leaves either the old or the new map on disk.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mentorlink_application::ports::{SessionStorage, StorageError};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const SCHEMA_VERSION: u32 = 1;

/// On-disk layout:
/// ```json
/// {
///   "schema_version": 1,
///   "values": {
///     "accessToken": "...",
///     "refreshToken": "...",
///     "userInfo": "{\"id\":\"u-1\"}"
///   }
/// }
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    schema_version: u32,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Session storage persisted to a JSON file.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Creates a storage writing to `path`. The file and its parent
    /// directories are created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default session file: `<config dir>/mentorlink/session.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mentorlink").join("session.json"))
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        match from_json_bytes::<SessionFile>(&content) {
            Ok(file) => Ok(file.values),
            Err(e) => {
                // An unreadable file must not lock the user out; the next
                // write replaces it.
                warn!(path = %self.path.display(), error = %e, "session file is corrupt, ignoring");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn save(&self, values: BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(&SessionFile {
            schema_version: SCHEMA_VERSION,
            values,
        })
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, &content).await?;
        restrict_permissions(&temp).await?;
        fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        self.save(values).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        let before = values.len();
        for key in keys {
            values.remove(*key);
        }
        if values.len() == before {
            return Ok(());
        }
        self.save(values).await
    }
}
