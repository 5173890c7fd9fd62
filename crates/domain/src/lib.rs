//! MentorLink Domain - Core client types
//!
//! This crate defines the domain model for the MentorLink API client:
//! credentials, requests, the server's response envelope, the public
//! endpoint policy and the client error taxonomy.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod endpoints;
pub mod error;
pub mod id;
pub mod request;
pub mod response;

pub use auth::{Credentials, TokenStatus};
pub use endpoints::{AuthEndpoints, PublicEndpoints};
pub use error::{ApiError, DomainError, DomainResult, ErrorKind};
pub use id::generate_id_v7;
pub use request::{ApiRequest, HttpMethod};
pub use response::{ApiEnvelope, RawResponse, ResponseCodes, ResponseOutcome};
