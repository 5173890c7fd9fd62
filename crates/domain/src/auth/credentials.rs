//! The access/refresh token pair.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::TokenStatus;
use crate::error::{DomainError, DomainResult};

/// Seconds before expiry at which a token is reported as expiring.
const EXPIRING_WINDOW_SECONDS: i64 = 60;

/// Access and refresh token issued together by the server.
///
/// The pair is always stored, read and cleared as a unit. Serializes with the
/// server's field names (`accessToken`, `refreshToken`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Bearer token attached to authenticated requests.
    pub access_token: String,
    /// Token exchanged for a new pair when the access token expires.
    pub refresh_token: String,
}

impl Credentials {
    /// Creates a credential pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either token is empty.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> DomainResult<Self> {
        let credentials = Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Checks that both tokens are present.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing token.
    pub fn validate(&self) -> DomainResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(DomainError::InvalidCredentials(
                "access token is empty".to_string(),
            ));
        }
        if self.refresh_token.trim().is_empty() {
            return Err(DomainError::InvalidCredentials(
                "refresh token is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Expiry of the access token, read from its JWT `exp` claim.
    ///
    /// Returns `None` for opaque tokens or tokens without an `exp` claim.
    #[must_use]
    pub fn access_token_expiry(&self) -> Option<DateTime<Utc>> {
        jwt_expiry(&self.access_token)
    }

    /// Status of the access token at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> TokenStatus {
        let Some(expires_at) = self.access_token_expiry() else {
            return TokenStatus::Valid {
                seconds_remaining: None,
            };
        };

        let seconds_remaining = (expires_at - now).num_seconds();
        if seconds_remaining <= 0 {
            TokenStatus::Expired
        } else if seconds_remaining <= EXPIRING_WINDOW_SECONDS {
            TokenStatus::Expiring { seconds_remaining }
        } else {
            TokenStatus::Valid {
                seconds_remaining: Some(seconds_remaining),
            }
        }
    }

    /// Short preview of a token for logs (first 8 chars + ...).
    #[must_use]
    pub fn token_preview(token: &str) -> String {
        if token.len() > 12 && token.is_char_boundary(8) {
            format!("{}...", &token[..8])
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &Self::token_preview(&self.access_token))
            .field("refresh_token", &Self::token_preview(&self.refresh_token))
            .finish()
    }
}

fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}
