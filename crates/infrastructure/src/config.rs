//! Client configuration.
//!
//! Values are layered, later sources winning:
//! 1. built-in defaults
//! 2. an optional TOML file (`mentorlink.toml` or an explicit path)
//! 3. `MENTORLINK__*` environment variables, `__` separating nested keys
//!    (`MENTORLINK__BASE_URL`, `MENTORLINK__RESPONSE_CODES__SUCCESS`)

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use mentorlink_domain::{AuthEndpoints, PublicEndpoints, ResponseCodes};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::adapters::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mentorlink.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "MENTORLINK";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid base_url '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request timeout is zero.
    #[error("timeout_ms must be greater than zero")]
    InvalidTimeout,

    /// A persistent session was requested but no location is available.
    #[error("no storage_path configured and no user config directory found")]
    NoStorageLocation,
}

/// Configuration of a [`crate::MentorLinkClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL request paths are appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Authentication endpoint paths.
    pub endpoints: AuthEndpoints,
    /// Response code sentinels.
    pub response_codes: ResponseCodes,
    /// Path fragments served without a session.
    pub public_endpoints: Vec<String>,
    /// Fragments appended to `public_endpoints`.
    pub extra_public_endpoints: Vec<String>,
    /// Session cache keys cleared together with the tokens. The user profile
    /// key is always cleared, listed or not.
    pub session_keys: Vec<String>,
    /// Keep the session on disk across restarts.
    pub persist_session: bool,
    /// Session file; defaults to `<config dir>/mentorlink/session.json`.
    pub storage_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: AuthEndpoints::default(),
            response_codes: ResponseCodes::default(),
            public_endpoints: PublicEndpoints::default().fragments().to_vec(),
            extra_public_endpoints: Vec::new(),
            session_keys: vec![mentorlink_application::auth::USER_PROFILE_KEY.to_string()],
            persist_session: true,
            storage_path: None,
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Loads `mentorlink.toml` (if present) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads from `path` (or `mentorlink.toml` when `None`) and the
    /// environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or validation fails.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("public_endpoints")
            .with_list_parse_key("extra_public_endpoints")
            .with_list_parse_key("session_keys")
            .try_parsing(true)
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self, ConfigError> {
        let file = path.map_or_else(
            || File::with_name(DEFAULT_CONFIG_FILE),
            |path| File::from(path),
        );

        let config: Self = Config::builder()
            .add_source(file.required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the values that cannot be defaulted.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad base URL or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Effective public allow-list.
    #[must_use]
    pub fn public_allow_list(&self) -> PublicEndpoints {
        PublicEndpoints::new(
            self.public_endpoints
                .iter()
                .chain(&self.extra_public_endpoints)
                .cloned(),
        )
    }

    /// Location of the session file.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the platform has no
    /// user config directory.
    pub fn session_file(&self) -> Result<PathBuf, ConfigError> {
        self.storage_path
            .clone()
            .or_else(crate::persistence::FileSessionStorage::default_path)
            .ok_or(ConfigError::NoStorageLocation)
    }
}
