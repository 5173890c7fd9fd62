//! HTTP transport port

use async_trait::async_trait;
use mentorlink_domain::{ApiError, ApiRequest, RawResponse};

/// Errors raised when no HTTP response was obtained.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::transport(err.to_string())
    }
}

/// Port for sending a request to the MentorLink API.
///
/// Implementations resolve the request path against the API base URL and
/// return whatever status and body the server produced; interpreting the
/// envelope is left to the clients.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request`, attaching `Authorization: Bearer <bearer>` when a
    /// bearer credential is given.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorlink_domain::ErrorKind;

    #[test]
    fn test_transport_error_becomes_api_transport_error() {
        let err: ApiError = TransportError::Timeout { timeout_ms: 30_000 }.into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.description(), "request timed out after 30000ms");
    }
}
