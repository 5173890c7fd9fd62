//! Session token status for UI display.

/// Status of the stored access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No credential pair is stored.
    NotAuthenticated,
    /// Token is valid and not expiring soon.
    Valid {
        /// Seconds until expiry, or None if the token carries no expiry.
        seconds_remaining: Option<i64>,
    },
    /// Token is valid but will expire soon.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token has expired; the next authenticated call will refresh it.
    Expired,
}

impl TokenStatus {
    /// Returns true if a credential pair is stored.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::NotAuthenticated)
    }

    /// Returns true if the access token is still usable.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not signed in".to_string(),
            Self::Valid {
                seconds_remaining: Some(secs),
            } => {
                if *secs > 3600 {
                    format!("Signed in, session valid for {} hours", secs / 3600)
                } else if *secs > 60 {
                    format!("Signed in, session valid for {} minutes", secs / 60)
                } else {
                    format!("Signed in, session valid for {secs} seconds")
                }
            }
            Self::Valid {
                seconds_remaining: None,
            } => "Signed in".to_string(),
            Self::Expiring { seconds_remaining } => {
                format!("Session expiring in {seconds_remaining} seconds (will auto-refresh)")
            }
            Self::Expired => "Session expired (will refresh on next request)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_predicates() {
        assert!(!TokenStatus::NotAuthenticated.is_authenticated());
        assert!(TokenStatus::Expired.is_authenticated());
        assert!(!TokenStatus::Expired.is_valid());
        assert!(
            TokenStatus::Expiring {
                seconds_remaining: 5
            }
            .is_valid()
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TokenStatus::NotAuthenticated.display_message(),
            "Not signed in"
        );
        assert!(
            TokenStatus::Valid {
                seconds_remaining: Some(7200)
            }
            .display_message()
            .contains("2 hours")
        );
        assert!(
            TokenStatus::Expiring {
                seconds_remaining: 30
            }
            .display_message()
            .contains("auto-refresh")
        );
    }
}
