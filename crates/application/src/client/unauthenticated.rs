//! Client for calls made without an access token.

use std::sync::Arc;

use async_trait::async_trait;
use mentorlink_domain::{
    ApiError, ApiRequest, AuthEndpoints, Credentials, PublicEndpoints, ResponseCodes,
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::auth::TokenRefresher;
use crate::ports::HttpTransport;

/// Sends login, registration, refresh and public read calls.
///
/// The allow-list held here is the single authority on which paths run
/// without a session.
pub struct UnauthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    codes: ResponseCodes,
    public_endpoints: PublicEndpoints,
    auth_endpoints: AuthEndpoints,
}

impl UnauthenticatedClient {
    /// Creates a client with the default response codes and endpoints.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            codes: ResponseCodes::default(),
            public_endpoints: PublicEndpoints::default(),
            auth_endpoints: AuthEndpoints::default(),
        }
    }

    /// Sets the response code sentinels.
    #[must_use]
    pub fn with_response_codes(mut self, codes: ResponseCodes) -> Self {
        self.codes = codes;
        self
    }

    /// Sets the public allow-list.
    #[must_use]
    pub fn with_public_endpoints(mut self, public_endpoints: PublicEndpoints) -> Self {
        self.public_endpoints = public_endpoints;
        self
    }

    /// Sets the authentication endpoint paths.
    #[must_use]
    pub fn with_auth_endpoints(mut self, auth_endpoints: AuthEndpoints) -> Self {
        self.auth_endpoints = auth_endpoints;
        self
    }

    /// Returns true if `path` runs without a session.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_endpoints.is_public(path)
    }

    /// Public allow-list.
    #[must_use]
    pub const fn public_endpoints(&self) -> &PublicEndpoints {
        &self.public_endpoints
    }

    /// Authentication endpoint paths.
    #[must_use]
    pub const fn auth_endpoints(&self) -> &AuthEndpoints {
        &self.auth_endpoints
    }

    /// Response code sentinels.
    #[must_use]
    pub const fn response_codes(&self) -> &ResponseCodes {
        &self.codes
    }

    /// Sends `request` without a bearer token and returns the payload.
    ///
    /// # Errors
    ///
    /// Returns the error from the server's envelope, or a transport error
    /// when no envelope was received.
    #[instrument(skip_all, fields(request_id = %request.id, method = %request.method, path = %request.path))]
    pub async fn request(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.dispatch(request, None).await
    }

    /// Sends `request` with an explicit bearer credential and unwraps the
    /// envelope. Shared by the authenticated client and the refresh call.
    pub(crate) async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Value, ApiError> {
        debug!(
            retried = request.is_retried(),
            with_token = bearer.is_some(),
            "sending request"
        );
        let response = self.transport.send(request, bearer).await?;
        debug!(
            status = response.status,
            elapsed_ms = u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
            "response received"
        );
        response.decode(&self.codes)
    }
}

#[async_trait]
impl TokenRefresher for UnauthenticatedClient {
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, ApiError> {
        let request = ApiRequest::post(self.auth_endpoints.refresh.as_str());
        let data = self.dispatch(&request, Some(refresh_token)).await?;
        let credentials: Credentials = serde_json::from_value(data).map_err(|e| {
            ApiError::invalid_response(format!("refresh response is not a token pair: {e}"))
        })?;
        credentials
            .validate()
            .map_err(|e| ApiError::invalid_response(e.to_string()))?;
        Ok(credentials)
    }
}

impl std::fmt::Debug for UnauthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnauthenticatedClient")
            .field("codes", &self.codes)
            .field("public_endpoints", &self.public_endpoints)
            .field("auth_endpoints", &self.auth_endpoints)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::TransportError;
    use crate::test_support::{REFRESH_PATH, RecordedCall, ScriptedTransport, fail, ok};
    use mentorlink_domain::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_unwraps_payload_without_token() {
        let transport = ScriptedTransport::new(|_, _| ok(json!({"fee": 0.1})));
        let client = UnauthenticatedClient::new(transport.clone());

        let data = client
            .request(&ApiRequest::get("/platform-fees/active"))
            .await
            .unwrap();

        assert_eq!(data, json!({"fee": 0.1}));
        assert_eq!(
            transport.calls(),
            vec![RecordedCall {
                path: "/platform-fees/active".to_string(),
                bearer: None
            }]
        );
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let transport =
            ScriptedTransport::new(|_, _| fail("INVALID_CREDENTIALS", "Wrong email or password"));
        let client = UnauthenticatedClient::new(transport);

        let err = client
            .request(&ApiRequest::post("/auth/login"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        assert_eq!(err.description(), "Wrong email or password");
    }

    #[tokio::test]
    async fn test_network_failure_becomes_transport_error() {
        let transport = ScriptedTransport::new(|_, _| {
            Err(TransportError::Connection("connection refused".to_string()))
        });
        let client = UnauthenticatedClient::new(transport);

        let err = client
            .request(&ApiRequest::get("/policies/active"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.code(), "NETWORK_ERROR");
    }

    #[tokio::test]
    async fn test_refresh_sends_refresh_token_as_bearer() {
        let transport = ScriptedTransport::new(|_, _| {
            ok(json!({"accessToken": "A2", "refreshToken": "R2"}))
        });
        let client = UnauthenticatedClient::new(transport.clone());

        let credentials = client.refresh("R1").await.unwrap();

        assert_eq!(credentials, Credentials::new("A2", "R2").unwrap());
        assert_eq!(
            transport.calls(),
            vec![RecordedCall {
                path: REFRESH_PATH.to_string(),
                bearer: Some("R1".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_refresh_rejects_incomplete_pair() {
        let transport = ScriptedTransport::new(|_, _| ok(json!({"accessToken": "A2"})));
        let client = UnauthenticatedClient::new(transport);

        let err = client.refresh("R1").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));

        let transport = ScriptedTransport::new(|_, _| {
            ok(json!({"accessToken": "A2", "refreshToken": ""}))
        });
        let client = UnauthenticatedClient::new(transport);
        assert!(matches!(
            client.refresh("R1").await,
            Err(ApiError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_allow_list_is_configurable() {
        let transport = ScriptedTransport::new(|_, _| ok(json!(null)));
        let client = UnauthenticatedClient::new(transport)
            .with_public_endpoints(PublicEndpoints::default().with("/banners/active"));

        assert!(client.is_public("/banners/active"));
        assert!(client.is_public("/auth/login"));
        assert!(!client.is_public("/bookings"));
    }
}
