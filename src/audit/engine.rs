//! Per-file audit pipeline
//!
//! Files are processed strictly one after another: fingerprint the original,
//! write the tampered copy, fingerprint the copy. A failure only ends the
//! file it happened in.

use crate::config::AuditConfig;
use crate::error::WashError;
use crate::fs::{TailEdit, TamperError, TamperOutcome, Tamperer};
use crate::hash::{hash_file, Algorithm, Fingerprint};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Fingerprint, or the message of the error that prevented it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintOutcome {
    /// All four digests
    Ok(Fingerprint),
    /// Open or read failure
    Error(String),
}

impl FingerprintOutcome {
    fn from_result(result: crate::error::Result<Fingerprint>) -> Self {
        match result {
            Ok(fingerprint) => Self::Ok(fingerprint),
            Err(e) => Self::Error(e.message()),
        }
    }

    /// The fingerprint, if hashing succeeded
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Ok(fingerprint) => Some(fingerprint),
            Self::Error(_) => None,
        }
    }
}

/// What happened to one input path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Not an existing regular file
    NotFound,
    /// Shorter than the tamper window
    Skipped {
        /// File size in bytes
        size: u64,
    },
    /// Fingerprint only, no tamper step requested
    Hashed {
        /// Fingerprint of the file
        fingerprint: FingerprintOutcome,
    },
    /// Duplicating the file failed; no copy exists
    CopyFailed {
        /// Fingerprint of the original
        before: FingerprintOutcome,
        /// Error message
        error: String,
    },
    /// Flipping the copy's trailing bytes failed; the copy is unmodified
    ModifyFailed {
        /// Fingerprint of the original
        before: FingerprintOutcome,
        /// Unmodified copy left on disk
        washed_path: PathBuf,
        /// Error message
        error: String,
    },
    /// Original and tampered copy both fingerprinted
    Audited {
        /// Fingerprint of the original
        before: FingerprintOutcome,
        /// Tampered copy
        washed_path: PathBuf,
        /// Bytes flipped in the copy
        edit: TailEdit,
        /// Fingerprint of the copy
        after: FingerprintOutcome,
        /// Algorithms whose digest changed
        changed: Vec<Algorithm>,
    },
}

/// Report for a single input path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Path as given
    pub path: PathBuf,
    /// Outcome
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileReport {
    /// Whether the path was an existing regular file
    pub fn is_valid_input(&self) -> bool {
        !matches!(self.status, FileStatus::NotFound)
    }

    /// Whether any step of this file's processing failed
    pub fn has_failure(&self) -> bool {
        match &self.status {
            FileStatus::NotFound | FileStatus::Skipped { .. } => false,
            FileStatus::Hashed { fingerprint } => fingerprint.fingerprint().is_none(),
            FileStatus::CopyFailed { .. } | FileStatus::ModifyFailed { .. } => true,
            FileStatus::Audited { before, after, .. } => {
                before.fingerprint().is_none() || after.fingerprint().is_none()
            }
        }
    }

    /// Audited, both fingerprints present, yet nothing changed
    pub fn is_undetected(&self) -> bool {
        match &self.status {
            FileStatus::Audited {
                before: FingerprintOutcome::Ok(_),
                after: FingerprintOutcome::Ok(_),
                changed,
                ..
            } => changed.is_empty(),
            _ => false,
        }
    }
}

/// Counts over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Paths processed past the existence check, skips excluded
    pub processed: u64,
    /// Files below the tamper window
    pub skipped: u64,
    /// Paths that were not regular files
    pub missing: u64,
    /// Files with at least one failed step
    pub failed: u64,
    /// Audited files whose fingerprint did not change
    pub undetected: u64,
}

impl AuditSummary {
    fn record(&mut self, report: &FileReport) {
        match report.status {
            FileStatus::NotFound => self.missing += 1,
            FileStatus::Skipped { .. } => self.skipped += 1,
            _ => self.processed += 1,
        }
        if report.has_failure() {
            self.failed += 1;
        }
        if report.is_undetected() {
            self.undetected += 1;
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    /// Per-path reports, in input order
    pub files: Vec<FileReport>,
    /// Aggregate counts
    pub summary: AuditSummary,
    /// Wall-clock time
    #[serde(skip)]
    pub duration: Duration,
}

impl AuditResult {
    /// True when at least one input was an existing regular file
    pub fn any_valid_input(&self) -> bool {
        self.files.iter().any(FileReport::is_valid_input)
    }
}

/// Runs the audit pipeline over configured paths
pub struct AuditEngine {
    config: AuditConfig,
    tamperer: Tamperer,
}

impl AuditEngine {
    /// Create a new engine
    pub fn new(config: AuditConfig) -> Self {
        let tamperer = Tamperer::new(config.tamper.clone());
        Self { config, tamperer }
    }

    /// Create an engine that tampers through `tamperer`
    pub fn with_tamperer(config: AuditConfig, tamperer: Tamperer) -> Self {
        Self { config, tamperer }
    }

    /// Configuration in use
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Process every configured path, calling `on_report` as each one finishes
    pub fn execute<F>(&self, mut on_report: F) -> AuditResult
    where
        F: FnMut(&FileReport),
    {
        let start = Instant::now();
        let mut files = Vec::with_capacity(self.config.files.len());
        let mut summary = AuditSummary::default();

        for path in &self.config.files {
            let report = self.process_file(path);
            summary.record(&report);
            on_report(&report);
            files.push(report);
        }

        let duration = start.elapsed();
        tracing::info!(
            "Processed {} file(s), skipped {}, missing {} in {:.2?}",
            summary.processed,
            summary.skipped,
            summary.missing,
            duration
        );

        AuditResult {
            files,
            summary,
            duration,
        }
    }

    /// Run a single path through the pipeline
    pub fn process_file(&self, path: &Path) -> FileReport {
        let status = self.process_status(path);
        FileReport {
            path: path.to_path_buf(),
            status,
        }
    }

    fn process_status(&self, path: &Path) -> FileStatus {
        let size = match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                tracing::warn!("{}", WashError::NotFound(path.to_path_buf()));
                return FileStatus::NotFound;
            }
        };

        if self.config.fingerprint_only {
            return FileStatus::Hashed {
                fingerprint: self.fingerprint(path),
            };
        }

        let window = self.tamperer.options().window;
        if size < window {
            tracing::info!("{}", WashError::too_small(path, size, window));
            return FileStatus::Skipped { size };
        }

        let before = self.fingerprint(path);

        match self.tamperer.tamper(path) {
            Ok(TamperOutcome::Tampered(tampered)) => {
                let after = self.fingerprint(&tampered.path);
                let changed = match (before.fingerprint(), after.fingerprint()) {
                    (Some(b), Some(a)) => {
                        let changed = b.changed(a);
                        if changed.is_empty() {
                            tracing::warn!(
                                "Fingerprint of {} did not change after tampering",
                                path.display()
                            );
                        }
                        changed
                    }
                    _ => Vec::new(),
                };

                FileStatus::Audited {
                    before,
                    washed_path: tampered.path,
                    edit: tampered.edit,
                    after,
                    changed,
                }
            }
            // File shrank below the window after the size check
            Ok(TamperOutcome::Skipped { size }) => FileStatus::Skipped { size },
            Err(e) => {
                tracing::warn!("{}: {}", path.display(), e);
                match e {
                    TamperError::Copy(source) => FileStatus::CopyFailed {
                        before,
                        error: source.message(),
                    },
                    TamperError::Modify { path: copy, source } => FileStatus::ModifyFailed {
                        before,
                        washed_path: copy,
                        error: source.message(),
                    },
                }
            }
        }
    }

    fn fingerprint(&self, path: &Path) -> FingerprintOutcome {
        let result = hash_file(path, &self.config.policy, self.config.sampling);
        if let Err(e) = &result {
            tracing::warn!("{}", e);
        }
        FingerprintOutcome::from_result(result)
    }
}
