//! Tracing setup.

#![allow(missing_docs, clippy::unwrap_used)]

use mentorlink_infrastructure::telemetry::{DEFAULT_FILTER, init_tracing};
use tracing_subscriber::EnvFilter;

#[test]
fn test_init_tracing_installs_once() {
    assert!(init_tracing());
    assert!(!init_tracing());
}

#[test]
fn test_default_filter_targets_client_crates() {
    let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
    assert_eq!(filter.to_string(), "mentorlink=info");
}
