//! Report output module
//!
//! Renders audit results as text or JSON.

mod writer;

pub use writer::*;
