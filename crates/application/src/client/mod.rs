//! API clients.
//!
//! [`UnauthenticatedClient`] sends calls that never carry a bearer token and
//! owns the public allow-list. [`AuthenticatedClient`] sends everything else
//! and repairs expired sessions through the refresh coordinator.

mod authenticated;
mod unauthenticated;

pub use authenticated::AuthenticatedClient;
pub use unauthenticated::UnauthenticatedClient;
