//! # washcheck - Fingerprint and Tamper-Sensitivity Auditing
//!
//! washcheck computes four fingerprints of a file in a single streaming pass
//! (MD5, SHA-1, CRC-32 and CRC-64/ECMA-182), then writes a copy whose last
//! five bytes are XORed with `0xAA` and fingerprints the copy to confirm the
//! change is detected.
//!
//! ## Features
//!
//! - **Single-pass hashing**: every chunk feeds all four accumulators
//! - **Sampling**: files above 100 MiB are hashed from a 1 MiB head and tail
//! - **Bit-exact CRC-64**: reflected ECMA-182, check value `995dc9bbdf1939fa`
//! - **Safe copies**: tampered copies are staged and renamed into place
//!
//! ## Quick Start
//!
//! ```no_run
//! use washcheck::hash::{hash_file, SamplingPolicy};
//! use std::path::Path;
//!
//! let fingerprint = hash_file(Path::new("data.bin"), &SamplingPolicy::default(), true).unwrap();
//! print!("{}", fingerprint);
//! ```
//!
//! ## Auditing
//!
//! ```no_run
//! use washcheck::audit::AuditEngine;
//! use washcheck::config::AuditConfig;
//! use std::path::PathBuf;
//!
//! let config = AuditConfig {
//!     files: vec![PathBuf::from("report.pdf")],
//!     ..Default::default()
//! };
//!
//! let result = AuditEngine::new(config).execute(|report| println!("{:?}", report.status));
//! println!("{} processed, {} skipped", result.summary.processed, result.summary.skipped);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod config;
pub mod error;
pub mod fs;
pub mod hash;
pub mod report;

// Re-export commonly used types
pub use audit::{AuditEngine, AuditResult, FileReport, FileStatus};
pub use config::{AuditConfig, OutputFormat};
pub use error::{Result, WashError};
pub use hash::{Crc64, Fingerprint, FingerprintHasher, SamplingPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use washcheck::prelude::*;
    //! ```

    pub use crate::audit::{AuditEngine, AuditResult, FileReport, FileStatus, FingerprintOutcome};
    pub use crate::config::{AuditConfig, OutputFormat};
    pub use crate::error::{Result, WashError};
    pub use crate::fs::{flip_tail, washed_path, Tamperer, TamperOutcome};
    pub use crate::hash::{hash_bytes, hash_file, Algorithm, Crc64, Fingerprint, SamplingPolicy};
}
