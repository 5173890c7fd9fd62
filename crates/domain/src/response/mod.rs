//! Response types: the raw transport reply and the server envelope.

mod envelope;
mod raw;

pub use envelope::{ApiEnvelope, ResponseCodes, ResponseOutcome};
pub use raw::RawResponse;
