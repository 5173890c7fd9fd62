//! Client for calls that require a session.

use std::sync::Arc;

use mentorlink_domain::{ApiError, ApiRequest};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::{RefreshCoordinator, TokenStore};
use crate::client::UnauthenticatedClient;
use crate::ports::{LoginRedirect, SessionNavigator};

/// Sends requests with the stored access token and recovers from expiry.
///
/// Paths on the public allow-list are forwarded to the unauthenticated
/// client and never carry a token. Any other request that fails with the
/// access token expired code waits for a refresh and is replayed once with
/// the new token.
pub struct AuthenticatedClient {
    public: Arc<UnauthenticatedClient>,
    tokens: Arc<TokenStore>,
    coordinator: RefreshCoordinator,
    navigator: Arc<dyn SessionNavigator>,
}

impl AuthenticatedClient {
    /// Creates a client refreshing through `public`.
    #[must_use]
    pub fn new(
        public: Arc<UnauthenticatedClient>,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn SessionNavigator>,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(
            public.clone(),
            Arc::clone(&tokens),
            Arc::clone(&navigator),
        );
        Self {
            public,
            tokens,
            coordinator,
            navigator,
        }
    }

    /// Refresh coordinator shared by every request of this client.
    #[must_use]
    pub const fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Token store backing this client.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Sends `request` and returns the payload of the success envelope.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when no envelope was received
    /// - [`ApiError::SessionInvalid`] when the session ended; the token
    ///   store has been cleared and the login redirect signalled
    /// - the refresh error when the access token expired and could not be
    ///   renewed
    /// - [`ApiError::Business`] for any other error envelope
    #[instrument(skip_all, fields(request_id = %request.id, method = %request.method, path = %request.path))]
    pub async fn request(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        if self.public.is_public(&request.path) {
            debug!("public endpoint, sending without token");
            return self.public.dispatch(&request, None).await;
        }

        let sent = self.tokens.access_token().await?;
        let first = self.public.dispatch(&request, sent.as_deref()).await;

        match first {
            Err(err) if err.is_auth_expired() && !request.is_retried() => {
                request.mark_retried();
                let access = self.fresh_access_token(sent.as_deref(), &err).await?;
                let replay = self.public.dispatch(&request, Some(&access)).await;
                self.settle(replay).await
            }
            other => self.settle(other).await,
        }
    }

    /// Token to replay with after `sent` was rejected as expired. When the
    /// store already holds a different token, a refresh completed while the
    /// request was in flight and that token is reused. When the store was
    /// emptied meanwhile, the session already ended and was reported then.
    async fn fresh_access_token(
        &self,
        sent: Option<&str>,
        err: &ApiError,
    ) -> Result<String, ApiError> {
        match self.tokens.access_token().await? {
            Some(current) if Some(current.as_str()) != sent => {
                debug!("access token already refreshed, replaying");
                Ok(current)
            }
            None if sent.is_some() => {
                debug!(code = err.code(), "session ended while the request was in flight");
                Err(ApiError::session_invalid(
                    "NO_SESSION",
                    "session ended while the request was in flight",
                ))
            }
            _ => {
                debug!(code = err.code(), "access token expired, waiting for refresh");
                self.coordinator.refreshed_access_token().await
            }
        }
    }

    /// Sends a GET request and deserializes the payload.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::request`]; a payload of the wrong shape is
    /// reported as [`ApiError::InvalidResponse`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.request(ApiRequest::get(path)).await?)
    }

    /// Sends a POST request with a JSON body and deserializes the payload.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        decode(self.request(ApiRequest::post(path).with_json(body)?).await?)
    }

    /// Sends a PUT request with a JSON body and deserializes the payload.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::get`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        decode(self.request(ApiRequest::put(path).with_json(body)?).await?)
    }

    /// Sends a PATCH request with a JSON body and deserializes the payload.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::get`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        decode(self.request(ApiRequest::patch(path).with_json(body)?).await?)
    }

    /// Sends a DELETE request and deserializes the payload.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::get`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.request(ApiRequest::delete(path)).await?)
    }

    async fn settle(&self, outcome: Result<Value, ApiError>) -> Result<Value, ApiError> {
        match outcome {
            Err(ApiError::AuthExpired { code, description }) => {
                // Already replayed once; a second expiry ends the session.
                warn!(code = %code, "access token rejected after refresh");
                Err(self
                    .end_session(
                        ApiError::session_invalid(code, description),
                        LoginRedirect::RetryExhausted,
                    )
                    .await)
            }
            Err(err) if err.is_session_invalid() => {
                warn!(code = err.code(), "session rejected by server");
                Err(self.end_session(err, LoginRedirect::SessionInvalid).await)
            }
            other => other,
        }
    }

    async fn end_session(&self, err: ApiError, reason: LoginRedirect) -> ApiError {
        if let Err(clear_err) = self.tokens.clear().await {
            warn!(error = %clear_err, "failed to clear session");
        }
        self.navigator.redirect_to_login(reason);
        err
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data)
        .map_err(|e| ApiError::invalid_response(format!("unexpected payload: {e}")))
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("public", &self.public)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
