//! MentorLink Application - Session handling and API clients
//!
//! This crate defines the application layer with:
//! - Port traits (transport, session storage, navigation, clock)
//! - The token store and the refresh coordinator
//! - The unauthenticated and authenticated API clients
//! - Explicit login / logout through the session service

pub mod auth;
pub mod client;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{RefreshCoordinator, SessionService, TokenRefresher, TokenStore};
pub use client::{AuthenticatedClient, UnauthenticatedClient};
pub use ports::{
    Clock, HttpTransport, LoginRedirect, SessionNavigator, SessionStorage, StorageError,
    TransportError,
};
