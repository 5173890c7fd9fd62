//! Endpoint policy: which paths run without a session, and where the
//! authentication endpoints live.

use serde::{Deserialize, Serialize};

/// Allow-list of path fragments that are served without a bearer token.
///
/// A request path is public when it contains any of the fragments. The list
/// covers authentication (login, register, refresh) and read-only "active
/// policy" lookups; deployments extend it through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicEndpoints {
    fragments: Vec<String>,
}

impl PublicEndpoints {
    /// Creates an allow-list from path fragments. Empty fragments are dropped
    /// since they would match every path.
    #[must_use]
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(Into::into)
                .filter(|f| !f.trim().is_empty())
                .collect(),
        }
    }

    /// Adds a fragment to the allow-list.
    #[must_use]
    pub fn with(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        if !fragment.trim().is_empty() && !self.fragments.contains(&fragment) {
            self.fragments.push(fragment);
        }
        self
    }

    /// Returns true if `path` may be called without a session.
    ///
    /// Only the path is matched; a query string is ignored.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        self.fragments.iter().any(|f| path.contains(f.as_str()))
    }

    /// Returns the configured fragments.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

impl Default for PublicEndpoints {
    fn default() -> Self {
        Self::new([
            "/auth/login",
            "/auth/register",
            "/auth/refresh",
            "/policies/active",
            "/platform-fees/active",
        ])
    }
}

/// Paths of the authentication endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEndpoints {
    /// Exchanges email and password for a credential pair.
    pub login: String,
    /// Creates an account.
    pub register: String,
    /// Exchanges a refresh token for a new credential pair.
    pub refresh: String,
    /// Ends the server-side session.
    pub logout: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            register: "/auth/register".to_string(),
            refresh: "/auth/refresh".to_string(),
            logout: "/auth/logout".to_string(),
        }
    }
}
