//! Adapters implementing the application ports.

mod broadcast_navigator;
mod reqwest_transport;
mod system_clock;

pub use broadcast_navigator::{BroadcastNavigator, SessionEvent};
pub use reqwest_transport::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT, ReqwestTransport};
pub use system_clock::SystemClock;
