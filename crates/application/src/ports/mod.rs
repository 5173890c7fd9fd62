//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session logic and the outside
//! world. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod clock;
mod http_transport;
mod navigator;
mod session_storage;

pub use clock::Clock;
pub use http_transport::{HttpTransport, TransportError};
pub use navigator::{LoginRedirect, SessionNavigator};
pub use session_storage::{SessionStorage, StorageError};
