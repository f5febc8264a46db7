//! File system operations module
//!
//! Provides the staged file copier and the tail-flipping tamper step.

mod operations;
pub mod tamper;

pub use operations::*;
pub use tamper::{
    flip_tail, washed_path, TailEdit, TailFlipper, TamperError, TamperOptions, TamperOutcome,
    TamperedFile, Tamperer,
};
