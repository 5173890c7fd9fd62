//! The `{respCode, description, data}` envelope wrapping every API reply.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Sentinel response codes used by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCodes {
    /// Code of a successful call.
    pub success: String,
    /// Code meaning "access token expired, refresh and retry".
    pub access_token_expired: String,
    /// Code meaning "session invalid, log in again".
    pub session_invalid: String,
}

impl Default for ResponseCodes {
    fn default() -> Self {
        Self {
            success: "0".to_string(),
            access_token_expired: "TOKEN_EXPIRED".to_string(),
            session_invalid: "UNAUTHORIZED".to_string(),
        }
    }
}

/// Classification of a response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The call succeeded.
    Success,
    /// The access token expired.
    AccessTokenExpired,
    /// The session is invalid.
    SessionInvalid,
    /// Any other failure.
    Failure,
}

impl ResponseCodes {
    /// Classifies a response code.
    #[must_use]
    pub fn classify(&self, code: &str) -> ResponseOutcome {
        let code = code.trim();
        if code == self.success {
            ResponseOutcome::Success
        } else if code == self.access_token_expired {
            ResponseOutcome::AccessTokenExpired
        } else if code == self.session_invalid {
            ResponseOutcome::SessionInvalid
        } else {
            ResponseOutcome::Failure
        }
    }
}

/// Transport envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    /// Application response code; sent as a string or a number.
    #[serde(deserialize_with = "code_as_string")]
    pub resp_code: String,
    /// Human readable message.
    #[serde(default)]
    pub description: Option<String>,
    /// Business payload.
    #[serde(default)]
    pub data: Value,
}

impl ApiEnvelope {
    /// Creates a success envelope around `data`.
    #[must_use]
    pub fn success(codes: &ResponseCodes, data: Value) -> Self {
        Self {
            resp_code: codes.success.clone(),
            description: None,
            data,
        }
    }

    /// Creates an error envelope.
    #[must_use]
    pub fn error(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            resp_code: code.into(),
            description: Some(description.into()),
            data: Value::Null,
        }
    }

    /// Unwraps the payload, turning a non-success code into an [`ApiError`].
    ///
    /// # Errors
    ///
    /// Returns the error described by the envelope's code.
    pub fn into_result(self, codes: &ResponseCodes) -> Result<Value, ApiError> {
        let description = self.description.unwrap_or_default();
        match codes.classify(&self.resp_code) {
            ResponseOutcome::Success => Ok(self.data),
            ResponseOutcome::AccessTokenExpired => Err(ApiError::AuthExpired {
                code: self.resp_code,
                description,
            }),
            ResponseOutcome::SessionInvalid => Err(ApiError::SessionInvalid {
                code: self.resp_code,
                description,
            }),
            ResponseOutcome::Failure => Err(ApiError::Business {
                code: self.resp_code,
                description,
            }),
        }
    }
}

fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(code) => Ok(code),
        Value::Number(code) => Ok(code.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "respCode must be a string or number, got {other}"
        ))),
    }
}
