//! MentorLink Infrastructure - Adapters and wiring
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, configuration loading, and the
//! [`MentorLinkClient`] that assembles them.

pub mod adapters;
pub mod client;
pub mod config;
pub mod persistence;
pub mod serialization;
pub mod telemetry;

pub use adapters::{BroadcastNavigator, ReqwestTransport, SessionEvent, SystemClock};
pub use client::{ClientError, MentorLinkClient};
pub use crate::config::{ClientConfig, ConfigError};
pub use persistence::{FileSessionStorage, MemorySessionStorage};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
pub use telemetry::init_tracing;
