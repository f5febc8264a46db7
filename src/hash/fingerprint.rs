//! Multi-algorithm fingerprinting
//!
//! One pass over the input feeds four independent accumulators: MD5, SHA-1,
//! CRC-32 (IEEE, reflected) and CRC-64/ECMA-182.

use crate::error::{IoResultExt, Result};
use crate::hash::crc64::Crc64;
use crate::hash::sampling::{SamplingDecision, SamplingMode, SamplingPolicy};
use digest::Digest;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Chunk size for sequential reads (1 MiB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Algorithms making up a fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    /// MD5 (128-bit)
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
    /// CRC-32/ISO-HDLC
    Crc32,
    /// CRC-64/ECMA-182, reflected
    Crc64,
}

impl Algorithm {
    /// Every algorithm, in report order
    pub const ALL: [Algorithm; 4] = [Self::Md5, Self::Sha1, Self::Crc32, Self::Crc64];

    /// Report label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Crc32 => "CRC32",
            Self::Crc64 => "CRC64",
        }
    }

    /// Length of the hex digest
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Crc32 => 8,
            Self::Crc64 => 16,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Finalized digests of one byte stream, as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// MD5 digest
    pub md5: String,
    /// SHA-1 digest
    pub sha1: String,
    /// CRC-32 checksum
    pub crc32: String,
    /// CRC-64 checksum
    pub crc64: String,
    /// How the source was read
    pub mode: SamplingMode,
    /// Bytes fed to the accumulators
    pub bytes_hashed: u64,
}

impl Fingerprint {
    /// Digest for one algorithm
    pub fn get(&self, algorithm: Algorithm) -> &str {
        match algorithm {
            Algorithm::Md5 => &self.md5,
            Algorithm::Sha1 => &self.sha1,
            Algorithm::Crc32 => &self.crc32,
            Algorithm::Crc64 => &self.crc64,
        }
    }

    /// `(name, digest)` pairs in report order
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Algorithm::ALL.into_iter().map(move |a| (a.name(), self.get(a)))
    }

    /// Algorithms whose digest differs between `self` and `other`
    pub fn changed(&self, other: &Fingerprint) -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|a| self.get(*a) != other.get(*a))
            .collect()
    }

    /// Whether every digest matches
    pub fn matches(&self, other: &Fingerprint) -> bool {
        self.changed(other).is_empty()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, digest) in self.entries() {
            writeln!(f, "{}: {}", name, digest)?;
        }
        Ok(())
    }
}

/// The four accumulators, updated in lockstep
///
/// `finalize` consumes the hasher, so a finished set cannot be fed again.
#[derive(Clone)]
pub struct FingerprintHasher {
    md5: Md5,
    sha1: Sha1,
    crc32: crc32fast::Hasher,
    crc64: Crc64,
    bytes_processed: u64,
}

impl FingerprintHasher {
    /// Create a fresh set of accumulators
    pub fn new() -> Self {
        Self {
            md5: Md5::new(),
            sha1: Sha1::new(),
            crc32: crc32fast::Hasher::new(),
            crc64: Crc64::new(),
            bytes_processed: 0,
        }
    }

    /// Feed a chunk to every accumulator
    pub fn update(&mut self, data: &[u8]) {
        self.md5.update(data);
        self.sha1.update(data);
        self.crc32.update(data);
        self.crc64.update(data);
        self.bytes_processed += data.len() as u64;
    }

    /// Bytes processed so far
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    /// Finalize as a full-stream fingerprint
    pub fn finalize(self) -> Fingerprint {
        self.finalize_as(SamplingMode::Full)
    }

    fn finalize_as(self, mode: SamplingMode) -> Fingerprint {
        Fingerprint {
            md5: hex::encode(self.md5.finalize()),
            sha1: hex::encode(self.sha1.finalize()),
            crc32: format!("{:08x}", self.crc32.finalize()),
            crc64: self.crc64.hex(),
            mode,
            bytes_hashed: self.bytes_processed,
        }
    }
}

impl Default for FingerprintHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint a reader according to a read plan
///
/// Sampled plans seek to each range in order and stream it through the
/// accumulators, so the digests equal those of `head ++ tail`. A range that
/// cannot be read in full (for example because the file shrank) fails the
/// whole computation. Memory use is one chunk regardless of the plan.
pub fn compute<R: Read + Seek>(
    reader: &mut R,
    decision: &SamplingDecision,
) -> std::io::Result<Fingerprint> {
    let mut hasher = FingerprintHasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    match decision.mode() {
        SamplingMode::Sampled => {
            for range in decision.ranges() {
                reader.seek(SeekFrom::Start(range.offset))?;

                let mut remaining = range.length;
                while remaining > 0 {
                    let want = remaining.min(CHUNK_SIZE as u64) as usize;
                    reader.read_exact(&mut buffer[..want])?;
                    hasher.update(&buffer[..want]);
                    remaining -= want as u64;
                }
            }
        }
        SamplingMode::Full => {
            reader.seek(SeekFrom::Start(0))?;

            loop {
                let bytes_read = match reader.read(&mut buffer) {
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };

                if bytes_read == 0 {
                    break;
                }

                hasher.update(&buffer[..bytes_read]);
            }
        }
    }

    Ok(hasher.finalize_as(decision.mode()))
}

/// Fingerprint a file on disk
pub fn hash_file(
    path: &Path,
    policy: &SamplingPolicy,
    sampling_enabled: bool,
) -> Result<Fingerprint> {
    let mut file = File::open(path).with_path(path)?;
    let size = file.metadata().with_path(path)?.len();
    let decision = policy.decide(size, sampling_enabled);

    tracing::debug!(
        "Hashing {} ({}, {} mode, {} read)",
        path.display(),
        humansize::format_size(size, humansize::BINARY),
        decision.mode().name(),
        humansize::format_size(decision.sampled_len().unwrap_or(size), humansize::BINARY)
    );

    compute(&mut file, &decision).with_path(path)
}

/// Fingerprint data in memory
pub fn hash_bytes(data: &[u8]) -> Fingerprint {
    let mut hasher = FingerprintHasher::new();
    hasher.update(data);
    hasher.finalize()
}
