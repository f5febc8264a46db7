//! Error types for washcheck
//!
//! Every failure is tied to the file being audited so the engine can report
//! it and move on to the next path.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for washcheck operations
#[derive(Error, Debug)]
pub enum WashError {
    /// I/O error during open, read, seek, write or copy
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Path does not refer to an existing regular file
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// File is shorter than the tamper window
    #[error("File too small: {path} ({size} bytes, need at least {minimum})")]
    TooSmall {
        /// File that was checked
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Smallest size that can be tampered
        minimum: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report serialization error
    #[error("Report error: {0}")]
    Report(String),
}

impl WashError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a too-small error
    pub fn too_small(path: &Path, size: u64, minimum: u64) -> Self {
        Self::TooSmall {
            path: path.to_path_buf(),
            size,
            minimum,
        }
    }

    /// Message without the path prefix, for per-file report lines
    pub fn message(&self) -> String {
        match self {
            Self::Io { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::NotFound(path) | Self::TooSmall { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Result type alias for washcheck operations
pub type Result<T> = std::result::Result<T, WashError>;

impl From<serde_json::Error> for WashError {
    fn from(err: serde_json::Error) -> Self {
        WashError::Report(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| WashError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = WashError::io("/test/path", io_err);
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
        assert_eq!(err.message(), "file not found");
        assert!(err.to_string().contains("/test/path"));
    }

    #[test]
    fn test_with_path_extension() {
        let res: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.with_path("/locked").unwrap_err();
        assert!(matches!(err, WashError::Io { .. }));
        assert_eq!(err.path().unwrap(), &PathBuf::from("/locked"));
    }

    #[test]
    fn test_too_small_display() {
        let err = WashError::too_small(Path::new("tiny.bin"), 4, 5);
        assert_eq!(
            err.to_string(),
            "File too small: tiny.bin (4 bytes, need at least 5)"
        );
        assert!(WashError::config("bad").path().is_none());
    }
}
