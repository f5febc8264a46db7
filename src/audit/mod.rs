//! Audit engine module
//!
//! Drives fingerprinting and tampering across a list of files.

mod engine;

pub use engine::*;
