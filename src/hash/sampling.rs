//! Full-versus-sampled read planning
//!
//! Very large files are fingerprinted from a bounded head and tail window
//! instead of end to end.

use crate::error::{Result, WashError};
use serde::{Deserialize, Serialize};

/// Default head/tail window (1 MiB)
pub const DEFAULT_SAMPLE_SIZE: u64 = 1024 * 1024;

/// Files strictly larger than this are sampled (100 MiB)
pub const DEFAULT_THRESHOLD: u64 = 100 * 1024 * 1024;

/// How a file is read for fingerprinting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Entire stream, sequentially
    Full,
    /// Head window followed by tail window
    Sampled,
}

impl SamplingMode {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Sampled => "sampled",
        }
    }
}

/// A contiguous region of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// Offset from the start of the file
    pub offset: u64,
    /// Number of bytes
    pub length: u64,
}

/// Read plan for a single file
///
/// A `Sampled` decision always holds exactly two ranges, head first.
/// A `Full` decision holds none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingDecision {
    mode: SamplingMode,
    ranges: Vec<ByteRange>,
}

impl SamplingDecision {
    /// Read the whole stream
    pub fn full() -> Self {
        Self {
            mode: SamplingMode::Full,
            ranges: Vec::new(),
        }
    }

    fn sampled(head: ByteRange, tail: ByteRange) -> Self {
        Self {
            mode: SamplingMode::Sampled,
            ranges: vec![head, tail],
        }
    }

    /// Selected mode
    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Ranges to read, in order
    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    /// Total bytes this plan feeds to the hashers, if known up front
    pub fn sampled_len(&self) -> Option<u64> {
        match self.mode {
            SamplingMode::Full => None,
            SamplingMode::Sampled => Some(self.ranges.iter().map(|r| r.length).sum()),
        }
    }
}

/// Sampling thresholds
///
/// Deserialization goes through [`SamplingPolicy::new`], so a stored policy
/// is validated the same way as one built from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyFields")]
pub struct SamplingPolicy {
    sample_size: u64,
    threshold: u64,
}

#[derive(Deserialize)]
struct PolicyFields {
    sample_size: u64,
    threshold: u64,
}

impl TryFrom<PolicyFields> for SamplingPolicy {
    type Error = WashError;

    fn try_from(fields: PolicyFields) -> Result<Self> {
        Self::new(fields.sample_size, fields.threshold)
    }
}

impl SamplingPolicy {
    /// Create a policy, rejecting thresholds that could yield a negative tail offset
    pub fn new(sample_size: u64, threshold: u64) -> Result<Self> {
        if sample_size == 0 {
            return Err(WashError::config("sample size must be greater than zero"));
        }
        if threshold < sample_size {
            return Err(WashError::config(format!(
                "sampling threshold ({}) must not be smaller than the sample size ({})",
                threshold, sample_size
            )));
        }
        Ok(Self {
            sample_size,
            threshold,
        })
    }

    /// Head/tail window size
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Size above which sampling kicks in
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Decide how to read a file of `file_size` bytes
    pub fn decide(&self, file_size: u64, sampling_enabled: bool) -> SamplingDecision {
        if !sampling_enabled || file_size <= self.threshold {
            return SamplingDecision::full();
        }

        let Some(tail_offset) = file_size.checked_sub(self.sample_size) else {
            tracing::debug!(
                "File size {} below sample size {}, reading in full",
                file_size,
                self.sample_size
            );
            return SamplingDecision::full();
        };

        SamplingDecision::sampled(
            ByteRange {
                offset: 0,
                length: self.sample_size,
            },
            ByteRange {
                offset: tail_offset,
                length: self.sample_size,
            },
        )
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}
