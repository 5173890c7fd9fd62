//! Session handling for the MentorLink client.
//!
//! This module provides:
//! - The token store holding the credential pair
//! - The refresh coordinator that keeps refreshes single-flight
//! - The session service for explicit login and logout

mod refresh;
mod session;
mod token_store;

pub use refresh::{RefreshCoordinator, TokenRefresher};
pub use session::SessionService;
pub use token_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore, USER_PROFILE_KEY};
