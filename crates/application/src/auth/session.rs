//! Explicit login, registration and logout.

use std::sync::Arc;

use mentorlink_domain::{ApiError, ApiRequest, Credentials, TokenStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::auth::{TokenStore, USER_PROFILE_KEY};
use crate::client::UnauthenticatedClient;
use crate::ports::Clock;

/// Establishes and ends sessions.
///
/// Login and registration go through the unauthenticated client; a
/// successful response stores the returned token pair and caches the user
/// profile when the server sends one.
pub struct SessionService {
    public: Arc<UnauthenticatedClient>,
    tokens: Arc<TokenStore>,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    /// Creates a session service.
    #[must_use]
    pub fn new(
        public: Arc<UnauthenticatedClient>,
        tokens: Arc<TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            public,
            tokens,
            clock,
        }
    }

    /// Signs in with email and password and stores the returned session.
    ///
    /// # Errors
    ///
    /// Returns the server's error, [`ApiError::InvalidResponse`] when the
    /// payload carries no complete token pair, or a storage error.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        let request = ApiRequest::post(self.public.auth_endpoints().login.as_str())
            .with_body(json!({ "email": email, "password": password }));
        let data = self.public.request(&request).await?;
        self.establish(&data).await?;
        info!("signed in");
        Ok(data)
    }

    /// Registers a new account. When the server answers with a token pair
    /// the session is stored as for a login.
    ///
    /// # Errors
    ///
    /// Returns the server's error or a storage error.
    #[instrument(skip_all)]
    pub async fn register<T>(&self, registration: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let request = ApiRequest::post(self.public.auth_endpoints().register.as_str())
            .with_json(registration)?;
        let data = self.public.request(&request).await?;
        if has_token_pair(&data) {
            self.establish(&data).await?;
            info!("registered and signed in");
        } else {
            debug!("registered without a session");
        }
        Ok(data)
    }

    /// Ends the session. The server is told on a best-effort basis; the
    /// local session is cleared whatever the server answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the local session cannot be cleared.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(access) = self.tokens.access_token().await? {
            let request = ApiRequest::post(self.public.auth_endpoints().logout.as_str());
            if let Err(err) = self.public.dispatch(&request, Some(&access)).await {
                warn!(error = %err, "logout call failed, clearing session anyway");
            }
        }
        self.tokens.clear().await?;
        info!("signed out");
        Ok(())
    }

    /// Returns true if a complete token pair is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.tokens.get().await?.is_some())
    }

    /// Status of the stored access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn token_status(&self) -> Result<TokenStatus, ApiError> {
        Ok(self.tokens.status(self.clock.now()).await?)
    }

    /// Cached profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn profile(&self) -> Result<Option<Value>, ApiError> {
        let Some(raw) = self.tokens.session_value(USER_PROFILE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "cached profile is not valid JSON, ignoring");
                Ok(None)
            }
        }
    }

    /// Stores the token pair, then caches the profile. Once the pair is
    /// stored the session stands; a profile that cannot be cached is logged.
    async fn establish(&self, data: &Value) -> Result<(), ApiError> {
        let credentials = credentials_from(data)?;
        self.tokens.set(&credentials).await?;
        if let Some(user) = data.get("user").filter(|u| !u.is_null()) {
            if let Err(err) = self
                .tokens
                .set_session_value(USER_PROFILE_KEY, &user.to_string())
                .await
            {
                warn!(error = %err, "failed to cache user profile");
            }
        }
        Ok(())
    }
}

fn has_token_pair(data: &Value) -> bool {
    data.get("accessToken").is_some() && data.get("refreshToken").is_some()
}

fn credentials_from(data: &Value) -> Result<Credentials, ApiError> {
    let credentials = Credentials::deserialize(data)
        .map_err(|e| ApiError::invalid_response(format!("response has no token pair: {e}")))?;
    credentials
        .validate()
        .map_err(|e| ApiError::invalid_response(e.to_string()))?;
    Ok(credentials)
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
