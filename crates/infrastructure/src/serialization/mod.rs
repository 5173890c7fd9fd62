//! Deterministic JSON serialization for files on disk.
//!
//! Keys are written in sorted order (via `BTreeMap`) with 2-space
//! indentation and a trailing newline, so session files diff cleanly.

mod json;

pub use json::*;
