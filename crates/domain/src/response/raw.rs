//! Raw HTTP reply as returned by the transport.

use std::time::Duration;

use serde_json::Value;

use crate::error::ApiError;
use crate::response::{ApiEnvelope, ResponseCodes};

/// Longest body excerpt quoted in an error description.
const BODY_EXCERPT_LEN: usize = 200;

/// HTTP status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Time from send to body fully read.
    pub duration: Duration,
}

impl RawResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>, duration: Duration) -> Self {
        Self {
            status,
            body,
            duration,
        }
    }

    /// Creates a response whose body is `value` serialized as JSON.
    #[must_use]
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string().into_bytes(), Duration::ZERO)
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Unwraps the business payload.
    ///
    /// An envelope is honoured whatever the HTTP status, since the server
    /// reports application failures (including expired tokens) through it.
    /// An HTTP error without an envelope becomes a transport error; an empty
    /// 2xx body yields `null`.
    ///
    /// # Errors
    ///
    /// Returns the envelope's error, a transport error, or an invalid
    /// response error when a 2xx body cannot be read as an envelope.
    pub fn decode(&self, codes: &ResponseCodes) -> Result<Value, ApiError> {
        match serde_json::from_slice::<ApiEnvelope>(&self.body) {
            Ok(envelope) => envelope.into_result(codes),
            Err(_) if !self.is_success() => Err(ApiError::transport(format!(
                "HTTP {}: {}",
                self.status,
                self.body_excerpt()
            ))),
            Err(_) if self.body.iter().all(u8::is_ascii_whitespace) => Ok(Value::Null),
            Err(e) => Err(ApiError::invalid_response(format!(
                "expected response envelope: {e}"
            ))),
        }
    }

    fn body_excerpt(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if text.is_empty() {
            return "no response body".to_string();
        }
        text.chars().take(BODY_EXCERPT_LEN).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_success_payload() {
        let codes = ResponseCodes::default();
        let response = RawResponse::json(
            200,
            &json!({"respCode": "0", "description": "OK", "data": {"mentors": []}}),
        );
        assert_eq!(response.decode(&codes).unwrap(), json!({"mentors": []}));
    }

    #[test]
    fn test_envelope_on_http_error_is_honoured() {
        let codes = ResponseCodes::default();
        let response = RawResponse::json(
            401,
            &json!({"respCode": "TOKEN_EXPIRED", "description": "Access token expired"}),
        );
        let err = response.decode(&codes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(err.description(), "Access token expired");
    }

    #[test]
    fn test_http_error_without_envelope_is_transport() {
        let codes = ResponseCodes::default();
        let response = RawResponse::new(502, b"Bad Gateway".to_vec(), Duration::ZERO);
        let err = response.decode(&codes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.description(), "HTTP 502: Bad Gateway");

        let empty = RawResponse::new(503, Vec::new(), Duration::ZERO);
        assert_eq!(
            empty.decode(&codes).unwrap_err().description(),
            "HTTP 503: no response body"
        );
    }

    #[test]
    fn test_empty_success_body_is_null() {
        let codes = ResponseCodes::default();
        let response = RawResponse::new(204, Vec::new(), Duration::ZERO);
        assert_eq!(response.decode(&codes).unwrap(), Value::Null);
    }

    #[test]
    fn test_non_envelope_success_is_invalid_response() {
        let codes = ResponseCodes::default();
        let response = RawResponse::new(200, b"<html></html>".to_vec(), Duration::ZERO);
        assert!(matches!(
            response.decode(&codes),
            Err(ApiError::InvalidResponse { .. })
        ));
    }
}
