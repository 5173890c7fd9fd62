//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The credential pair is incomplete or contains an empty token.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be encoded as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Code reported for failures that never produced a server envelope.
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";

/// Code reported when a successful response could not be decoded.
pub const INVALID_RESPONSE_CODE: &str = "INVALID_RESPONSE";

/// Code reported for local session storage failures.
pub const STORAGE_ERROR_CODE: &str = "STORAGE_ERROR";

/// Broad category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never reached the server or the reply was unusable.
    Transport,
    /// The access token expired; recoverable through a refresh.
    AuthExpired,
    /// The session is no longer valid; the user must log in again.
    SessionInvalid,
    /// Any other application-level failure.
    Business,
    /// Local persistence of the session failed.
    Storage,
}

/// Error returned by every client call.
///
/// Always carries a `code` and a human readable `description`, mirroring the
/// server's `{respCode, description}` error envelope. The type is `Clone` so
/// a single refresh outcome can be delivered to every waiting request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (network failure, timeout) or the server
    /// answered with an HTTP error and no envelope.
    #[error("network error: {description}")]
    Transport {
        /// What went wrong.
        description: String,
    },

    /// The server answered successfully but the body was not an envelope.
    #[error("invalid response: {description}")]
    InvalidResponse {
        /// What went wrong.
        description: String,
    },

    /// The access token has expired.
    #[error("access token expired ({code}): {description}")]
    AuthExpired {
        /// Server response code.
        code: String,
        /// Server description.
        description: String,
    },

    /// The session is invalid and cannot be repaired locally.
    #[error("session invalid ({code}): {description}")]
    SessionInvalid {
        /// Server response code.
        code: String,
        /// Server description.
        description: String,
    },

    /// Any other non-success response code.
    #[error("request failed ({code}): {description}")]
    Business {
        /// Server response code.
        code: String,
        /// Server description.
        description: String,
    },

    /// Reading or writing local session state failed.
    #[error("session storage error: {description}")]
    Storage {
        /// What went wrong.
        description: String,
    },
}

impl ApiError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(description: impl Into<String>) -> Self {
        Self::Transport {
            description: description.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(description: impl Into<String>) -> Self {
        Self::InvalidResponse {
            description: description.into(),
        }
    }

    /// Creates a session invalid error.
    #[must_use]
    pub fn session_invalid(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::SessionInvalid {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Creates a business error.
    #[must_use]
    pub fn business(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Business {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Creates a storage error.
    #[must_use]
    pub fn storage(description: impl Into<String>) -> Self {
        Self::Storage {
            description: description.into(),
        }
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Transport { .. } => NETWORK_ERROR_CODE,
            Self::InvalidResponse { .. } => INVALID_RESPONSE_CODE,
            Self::Storage { .. } => STORAGE_ERROR_CODE,
            Self::AuthExpired { code, .. }
            | Self::SessionInvalid { code, .. }
            | Self::Business { code, .. } => code,
        }
    }

    /// Returns the human readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Transport { description }
            | Self::InvalidResponse { description }
            | Self::Storage { description }
            | Self::AuthExpired { description, .. }
            | Self::SessionInvalid { description, .. }
            | Self::Business { description, .. } => description,
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::InvalidResponse { .. } => ErrorKind::Transport,
            Self::AuthExpired { .. } => ErrorKind::AuthExpired,
            Self::SessionInvalid { .. } => ErrorKind::SessionInvalid,
            Self::Business { .. } => ErrorKind::Business,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Returns true if the access token expired.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    /// Returns true if the session must be re-established from scratch.
    #[must_use]
    pub const fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid { .. })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::business("INVALID_REQUEST", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transport_error_uses_generic_code() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.code(), NETWORK_ERROR_CODE);
        assert_eq!(err.description(), "connection refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_envelope_errors_keep_server_code() {
        let err = ApiError::business("BOOKING_FULL", "No slots left");
        assert_eq!(err.code(), "BOOKING_FULL");
        assert_eq!(err.description(), "No slots left");
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.to_string(), "request failed (BOOKING_FULL): No slots left");
    }

    #[test]
    fn test_invalid_response_is_transport_kind() {
        let err = ApiError::invalid_response("expected envelope");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.code(), INVALID_RESPONSE_CODE);
    }

    #[test]
    fn test_auth_predicates() {
        let expired = ApiError::AuthExpired {
            code: "TOKEN_EXPIRED".to_string(),
            description: "expired".to_string(),
        };
        assert!(expired.is_auth_expired());
        assert!(!expired.is_session_invalid());

        let invalid = ApiError::session_invalid("UNAUTHORIZED", "log in again");
        assert!(invalid.is_session_invalid());
        assert!(!invalid.is_auth_expired());
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: ApiError = DomainError::UnsupportedMethod("TRACE".to_string()).into();
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert!(err.description().contains("TRACE"));
    }
}
