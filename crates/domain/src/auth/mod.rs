//! Authentication domain types

mod credentials;
mod status;

pub use credentials::Credentials;
pub use status::TokenStatus;
