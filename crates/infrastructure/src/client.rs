//! Wiring of the production client.

use std::sync::Arc;

use mentorlink_application::ports::{HttpTransport, SessionStorage, TransportError};
use mentorlink_application::{
    AuthenticatedClient, SessionService, TokenStore, UnauthenticatedClient,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::adapters::{BroadcastNavigator, ReqwestTransport, SessionEvent, SystemClock};
use crate::config::{ClientConfig, ConfigError};
use crate::persistence::{FileSessionStorage, MemorySessionStorage};

/// Errors raised while assembling a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be created.
    #[error("failed to create HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

/// MentorLink API client with session handling.
///
/// Owns one token store, one refresh coordinator and one event channel;
/// clone the `Arc`s it hands out rather than building a second client for
/// the same session.
#[derive(Debug)]
pub struct MentorLinkClient {
    api: Arc<AuthenticatedClient>,
    public: Arc<UnauthenticatedClient>,
    session: Arc<SessionService>,
    navigator: BroadcastNavigator,
}

impl MentorLinkClient {
    /// Builds a client from `config`, persisting the session as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the transport
    /// cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport =
            ReqwestTransport::new(&config.base_url, config.timeout_ms, &config.user_agent)?;

        let storage: Arc<dyn SessionStorage> = if config.persist_session {
            let path = config.session_file()?;
            info!(path = %path.display(), "using persistent session");
            Arc::new(FileSessionStorage::new(path))
        } else {
            Arc::new(MemorySessionStorage::new())
        };

        Ok(Self::with_parts(config, Arc::new(transport), storage))
    }

    /// Loads configuration from `mentorlink.toml` and the environment and
    /// builds a client.
    ///
    /// # Errors
    ///
    /// See [`MentorLinkClient::from_config`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_config(&ClientConfig::load()?)
    }

    /// Builds a client on explicit transport and storage adapters.
    #[must_use]
    pub fn with_parts(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let tokens = Arc::new(TokenStore::with_session_keys(
            storage,
            config.session_keys.iter().cloned(),
        ));
        let public = Arc::new(
            UnauthenticatedClient::new(transport)
                .with_response_codes(config.response_codes.clone())
                .with_public_endpoints(config.public_allow_list())
                .with_auth_endpoints(config.endpoints.clone()),
        );
        let navigator = BroadcastNavigator::new();
        let api = Arc::new(AuthenticatedClient::new(
            Arc::clone(&public),
            Arc::clone(&tokens),
            Arc::new(navigator.clone()),
        ));
        let session = Arc::new(SessionService::new(
            Arc::clone(&public),
            tokens,
            Arc::new(SystemClock::new()),
        ));

        Self {
            api,
            public,
            session,
            navigator,
        }
    }

    /// Client for calls that require a session.
    #[must_use]
    pub const fn api(&self) -> &Arc<AuthenticatedClient> {
        &self.api
    }

    /// Client for calls made without a session.
    #[must_use]
    pub const fn public(&self) -> &Arc<UnauthenticatedClient> {
        &self.public
    }

    /// Login, registration and logout.
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    /// Subscribes to session events such as "login required".
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.navigator.subscribe()
    }
}
