//! Fingerprint computation
//!
//! Provides streaming MD5, SHA-1, CRC-32 and CRC-64 over a single pass,
//! with head/tail sampling for very large files.

pub mod crc64;
mod fingerprint;
mod sampling;

pub use crc64::Crc64;
pub use fingerprint::*;
pub use sampling::*;
