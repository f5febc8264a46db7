//! Configuration module for washcheck
//!
//! Provides CLI argument parsing and the runtime settings derived from it.

mod settings;

pub use settings::*;
