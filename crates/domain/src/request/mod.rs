//! Outgoing request types

mod api_request;
mod method;

pub use api_request::ApiRequest;
pub use method::HttpMethod;
