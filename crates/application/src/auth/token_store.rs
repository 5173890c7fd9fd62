//! Durable storage of the credential pair.
//!
//! The token store is the single source of truth for the current access and
//! refresh tokens. Both tokens are always written, read and cleared together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mentorlink_domain::{Credentials, TokenStatus};
use tokio::sync::RwLock;
use tracing::warn;

use crate::ports::{SessionStorage, StorageError};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key of the cached profile of the signed-in user.
pub const USER_PROFILE_KEY: &str = "userInfo";

/// Token store backed by a [`SessionStorage`] adapter.
///
/// Reads and writes are serialized through an async read/write lock, so no
/// reader observes a half-written pair even when the adapter writes a batch
/// one key at a time.
pub struct TokenStore {
    storage: Arc<dyn SessionStorage>,
    /// Extra session cache keys cleared together with the tokens.
    session_keys: Vec<String>,
    lock: RwLock<()>,
}

impl TokenStore {
    /// Create a token store that also clears the cached user profile.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_session_keys(storage, [USER_PROFILE_KEY])
    }

    /// Create with a custom list of session cache keys to clear on logout.
    ///
    /// The user profile key is always a session key, whether listed or not.
    #[must_use]
    pub fn with_session_keys<I, S>(storage: Arc<dyn SessionStorage>, session_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = session_keys.into_iter().map(Into::into).collect();
        if !keys.iter().any(|k| k == USER_PROFILE_KEY) {
            keys.insert(0, USER_PROFILE_KEY.to_string());
        }
        Self {
            storage,
            session_keys: keys,
            lock: RwLock::new(()),
        }
    }

    /// Read the stored pair, or `None` if not authenticated.
    ///
    /// A pair with a missing or empty half is reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn get(&self) -> Result<Option<Credentials>, StorageError> {
        let _guard = self.lock.read().await;
        let access = self.storage.get(ACCESS_TOKEN_KEY).await?;
        let refresh = self.storage.get(REFRESH_TOKEN_KEY).await?;

        match (access, refresh) {
            (None, None) => Ok(None),
            (Some(access_token), Some(refresh_token)) => {
                let credentials = Credentials {
                    access_token,
                    refresh_token,
                };
                if credentials.validate().is_ok() {
                    Ok(Some(credentials))
                } else {
                    warn!("stored credential pair has an empty token, treating as signed out");
                    Ok(None)
                }
            }
            _ => {
                warn!("stored credential pair is incomplete, treating as signed out");
                Ok(None)
            }
        }
    }

    /// Current access token, if authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get().await?.map(|c| c.access_token))
    }

    /// Persist both tokens together.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair is incomplete or cannot be persisted.
    pub async fn set(&self, credentials: &Credentials) -> Result<(), StorageError> {
        credentials
            .validate()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        let _guard = self.lock.write().await;
        self.storage
            .set_many(&[
                (ACCESS_TOKEN_KEY, credentials.access_token.as_str()),
                (REFRESH_TOKEN_KEY, credentials.refresh_token.as_str()),
            ])
            .await
    }

    /// Remove both tokens and every session cache key.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        let mut keys = vec![ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY];
        keys.extend(self.session_keys.iter().map(String::as_str));
        self.storage.remove_many(&keys).await
    }

    /// Read a session cache value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn session_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.read().await;
        self.storage.get(key).await
    }

    /// Write a session cache value. Only keys that are cleared with the
    /// session are accepted, so no cached user data outlives a logout.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a session key or cannot be persisted.
    pub async fn set_session_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.session_keys.iter().any(|k| k == key) {
            return Err(StorageError::InvalidData(format!(
                "'{key}' is not a session key"
            )));
        }
        let _guard = self.lock.write().await;
        self.storage.set_many(&[(key, value)]).await
    }

    /// Status of the stored access token at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn status(&self, now: DateTime<Utc>) -> Result<TokenStatus, StorageError> {
        Ok(self
            .get()
            .await?
            .map_or(TokenStatus::NotAuthenticated, |c| c.status(now)))
    }

    /// Session cache keys cleared with the tokens.
    #[must_use]
    pub fn session_keys(&self) -> &[String] {
        &self.session_keys
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("session_keys", &self.session_keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn store() -> (Arc<MemoryStorage>, TokenStore) {
        let storage = Arc::new(MemoryStorage::default());
        let store = TokenStore::new(storage.clone());
        (storage, store)
    }

    #[tokio::test]
    async fn test_set_and_get_pair() {
        let (storage, store) = store();
        assert_eq!(store.get().await.unwrap(), None);

        store
            .set(&Credentials::new("A1", "R1").unwrap())
            .await
            .unwrap();

        assert_eq!(
            store.get().await.unwrap(),
            Some(Credentials::new("A1", "R1").unwrap())
        );
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A1"));
        assert_eq!(storage.raw(ACCESS_TOKEN_KEY).as_deref(), Some("A1"));
        assert_eq!(storage.raw(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_partial_pair_reads_as_signed_out() {
        let (storage, store) = store();
        storage.insert(ACCESS_TOKEN_KEY, "A1");
        assert_eq!(store.get().await.unwrap(), None);

        storage.insert(REFRESH_TOKEN_KEY, "");
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_rejects_incomplete_pair() {
        let (storage, store) = store();
        let incomplete = Credentials {
            access_token: "A1".to_string(),
            refresh_token: String::new(),
        };
        assert!(matches!(
            store.set(&incomplete).await,
            Err(StorageError::InvalidData(_))
        ));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_tokens_and_session_cache() {
        let (storage, store) = store();
        store
            .set(&Credentials::new("A1", "R1").unwrap())
            .await
            .unwrap();
        store
            .set_session_value(USER_PROFILE_KEY, r#"{"role":"mentor"}"#)
            .await
            .unwrap();
        storage.insert("theme", "dark");

        store.clear().await.unwrap();

        assert_eq!(store.get().await.unwrap(), None);
        assert_eq!(storage.raw(USER_PROFILE_KEY), None);
        assert_eq!(storage.raw("theme").as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_only_session_keys_are_writable() {
        let (_, store) = store();
        assert!(matches!(
            store.set_session_value("theme", "dark").await,
            Err(StorageError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_key_is_always_a_session_key() {
        let storage = Arc::new(MemoryStorage::default());
        let store = TokenStore::with_session_keys(storage.clone(), ["walletCache"]);
        assert_eq!(store.session_keys(), [USER_PROFILE_KEY, "walletCache"]);

        store
            .set_session_value(USER_PROFILE_KEY, r#"{"id":"u-1"}"#)
            .await
            .unwrap();
        store.set_session_value("walletCache", "42").await.unwrap();
        store.clear().await.unwrap();

        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_status_not_authenticated() {
        let (_, store) = store();
        assert_eq!(
            store.status(Utc::now()).await.unwrap(),
            TokenStatus::NotAuthenticated
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_observe_half_written_pair() {
        let storage = Arc::new(MemoryStorage::with_write_delay(Duration::from_millis(5)));
        let store = Arc::new(TokenStore::new(storage));
        store
            .set(&Credentials::new("A0", "R0").unwrap())
            .await
            .unwrap();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for round in 1..=10 {
                    let credentials =
                        Credentials::new(format!("A{round}"), format!("R{round}")).unwrap();
                    store.set(&credentials).await.unwrap();
                    if round % 3 == 0 {
                        store.clear().await.unwrap();
                    }
                }
            })
        };

        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..200 {
                    if let Some(credentials) = store.get().await.unwrap() {
                        assert_eq!(
                            credentials.access_token[1..],
                            credentials.refresh_token[1..],
                            "observed a pair mixing two writes"
                        );
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }
}
