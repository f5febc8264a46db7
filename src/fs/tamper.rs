//! Tamper copies
//!
//! Produces a "washed" duplicate of a file whose trailing bytes are XORed
//! with a fixed mask. Fingerprinting the duplicate shows whether a small
//! trailing change is detected. The source file is never opened for writing.

use crate::error::{IoResultExt, Result, WashError};
use crate::fs::operations::{CopyOptions, FileCopier};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of trailing bytes that get flipped
pub const TAMPER_WINDOW: u64 = 5;

/// XOR mask applied to each flipped byte
pub const TAMPER_MASK: u8 = 0xAA;

/// Marker inserted before the extension of the output file
pub const DEFAULT_MARKER: &str = "washed";

/// Derive the output path: `dir/name.ext` becomes `dir/name_<marker>.ext`
pub fn washed_path(source: &Path, marker: &str) -> PathBuf {
    let mut name = OsString::new();
    name.push(source.file_stem().unwrap_or_default());
    name.push("_");
    name.push(marker);
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    source.with_file_name(name)
}

/// Bytes rewritten by [`flip_tail`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailEdit {
    /// Offset of the first rewritten byte
    pub offset: u64,
    /// Bytes before the edit
    pub before: Vec<u8>,
    /// Bytes after the edit
    pub after: Vec<u8>,
}

/// XOR the last `window` bytes of a file in place
///
/// Applying the same window and mask twice restores the original contents.
/// The file length never changes.
pub fn flip_tail(path: &Path, window: u64, mask: u8) -> Result<TailEdit> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_path(path)?;

    let len = file.metadata().with_path(path)?.len();
    let offset = len.checked_sub(window).ok_or_else(|| {
        WashError::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("file is {} bytes, shorter than the {}-byte window", len, window),
            ),
        )
    })?;

    let mut before = vec![0u8; window as usize];
    file.seek(SeekFrom::Start(offset)).with_path(path)?;
    file.read_exact(&mut before).with_path(path)?;

    let after: Vec<u8> = before.iter().map(|b| b ^ mask).collect();

    file.seek(SeekFrom::Start(offset)).with_path(path)?;
    file.write_all(&after).with_path(path)?;
    file.sync_all().with_path(path)?;

    Ok(TailEdit {
        offset,
        before,
        after,
    })
}

/// Options for producing tampered copies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamperOptions {
    /// Trailing bytes to flip
    pub window: u64,
    /// XOR mask
    pub mask: u8,
    /// Output name marker
    pub marker: String,
}

impl Default for TamperOptions {
    fn default() -> Self {
        Self {
            window: TAMPER_WINDOW,
            mask: TAMPER_MASK,
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

/// A successfully tampered duplicate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamperedFile {
    /// File that was duplicated
    pub source: PathBuf,
    /// Mutated duplicate
    pub path: PathBuf,
    /// Trailing bytes that were flipped
    pub edit: TailEdit,
}

/// Result of a tamper request
#[derive(Debug, Clone)]
pub enum TamperOutcome {
    /// Duplicate written and mutated
    Tampered(TamperedFile),
    /// Source shorter than the window; nothing written
    Skipped {
        /// Source size in bytes
        size: u64,
    },
}

/// A tamper failure, tagged with the step that failed
#[derive(Debug, Error)]
pub enum TamperError {
    /// Duplicating the source failed; no output file exists
    #[error("copy failed: {0}")]
    Copy(#[source] WashError),

    /// Flipping the trailing bytes failed; the unmutated duplicate remains on disk
    #[error("modification failed: {source}")]
    Modify {
        /// Duplicate left on disk
        path: PathBuf,
        /// Underlying error
        #[source]
        source: WashError,
    },
}

impl TamperError {
    /// Underlying error
    pub fn inner(&self) -> &WashError {
        match self {
            Self::Copy(source) | Self::Modify { source, .. } => source,
        }
    }
}

/// Signature of the step that mutates the duplicate
pub type TailFlipper = fn(&Path, u64, u8) -> Result<TailEdit>;

/// Produces washed duplicates
pub struct Tamperer {
    options: TamperOptions,
    copier: FileCopier,
    flipper: TailFlipper,
}

impl Tamperer {
    /// Create a tamperer with the given options
    pub fn new(options: TamperOptions) -> Self {
        Self {
            options,
            copier: FileCopier::new(CopyOptions::default()),
            flipper: flip_tail,
        }
    }

    /// Replace the mutation step
    pub fn with_flipper(mut self, flipper: TailFlipper) -> Self {
        self.flipper = flipper;
        self
    }

    /// Options in use
    pub fn options(&self) -> &TamperOptions {
        &self.options
    }

    /// Output path for a source file
    pub fn output_path(&self, source: &Path) -> PathBuf {
        washed_path(source, &self.options.marker)
    }

    /// Duplicate `source` and flip the trailing window of the duplicate
    pub fn tamper(&self, source: &Path) -> std::result::Result<TamperOutcome, TamperError> {
        let size = std::fs::metadata(source)
            .with_path(source)
            .map_err(TamperError::Copy)?
            .len();

        if size < self.options.window {
            tracing::debug!("{} is {} bytes, not tampering", source.display(), size);
            return Ok(TamperOutcome::Skipped { size });
        }

        let dest = self.output_path(source);

        self.copier.copy(source, &dest).map_err(TamperError::Copy)?;

        let edit = match (self.flipper)(&dest, self.options.window, self.options.mask) {
            Ok(edit) => edit,
            Err(source) => {
                tracing::warn!("Leaving unmodified copy at {}", dest.display());
                return Err(TamperError::Modify { path: dest, source });
            }
        };

        tracing::info!(
            "Flipped {} trailing bytes of {} at offset {}",
            edit.after.len(),
            dest.display(),
            edit.offset
        );

        Ok(TamperOutcome::Tampered(TamperedFile {
            source: source.to_path_buf(),
            path: dest,
            edit,
        }))
    }
}

impl Default for Tamperer {
    fn default() -> Self {
        Self::new(TamperOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_washed_path() {
        assert_eq!(
            washed_path(Path::new("/data/report.pdf"), "washed"),
            PathBuf::from("/data/report_washed.pdf")
        );
        assert_eq!(
            washed_path(Path::new("archive.tar.gz"), "washed"),
            PathBuf::from("archive.tar_washed.gz")
        );
        assert_eq!(
            washed_path(Path::new("dir/README"), "washed"),
            PathBuf::from("dir/README_washed")
        );
        assert_eq!(
            washed_path(Path::new(".bashrc"), "x"),
            PathBuf::from(".bashrc_x")
        );
    }

    #[test]
    fn test_tamper_flips_tail_only() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("sample.bin");
        let original: Vec<u8> = (0u8..32).collect();
        std::fs::write(&src, &original).unwrap();

        let outcome = Tamperer::default().tamper(&src).unwrap();
        let TamperOutcome::Tampered(tampered) = outcome else {
            panic!("expected tampered outcome");
        };

        assert_eq!(tampered.path, dir.path().join("sample_washed.bin"));
        assert_eq!(tampered.edit.offset, 27);

        let washed = std::fs::read(&tampered.path).unwrap();
        assert_eq!(washed.len(), original.len());
        assert_eq!(&washed[..27], &original[..27]);
        for i in 27..32 {
            assert_eq!(washed[i], original[i] ^ 0xAA);
        }

        // Source untouched
        assert_eq!(std::fs::read(&src).unwrap(), original);
    }

    #[test]
    fn test_flip_tail_is_self_inverse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let first = flip_tail(&path, 5, 0xAA).unwrap();
        assert_ne!(std::fs::read(&path).unwrap(), b"hello world");

        let second = flip_tail(&path, 5, 0xAA).unwrap();
        assert_eq!(second.before, first.after);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
    }

    #[test]
    fn test_skip_below_window() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("tiny.dat");
        std::fs::write(&src, b"abcd").unwrap();

        let tamperer = Tamperer::default();
        let outcome = tamperer.tamper(&src).unwrap();
        assert!(matches!(outcome, TamperOutcome::Skipped { size: 4 }));
        assert!(!tamperer.output_path(&src).exists());
    }

    #[test]
    fn test_exact_window() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("five.dat");
        std::fs::write(&src, [0u8; 5]).unwrap();

        let outcome = Tamperer::default().tamper(&src).unwrap();
        let TamperOutcome::Tampered(tampered) = outcome else {
            panic!("expected tampered outcome");
        };
        assert_eq!(std::fs::read(&tampered.path).unwrap(), vec![0xAA; 5]);
    }

    #[test]
    fn test_missing_source_fails_at_copy() {
        let dir = TempDir::new().unwrap();
        let err = Tamperer::default()
            .tamper(&dir.path().join("nope.bin"))
            .unwrap_err();
        assert!(matches!(err, TamperError::Copy(WashError::Io { .. })));
        assert!(err.to_string().starts_with("copy failed: "));
    }

    fn failing_flip(path: &Path, _window: u64, _mask: u8) -> Result<TailEdit> {
        Err(WashError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only medium"),
        ))
    }

    #[test]
    fn test_failed_flip_keeps_unmodified_copy() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("keep.bin");
        std::fs::write(&src, b"0123456789").unwrap();

        let tamperer = Tamperer::default().with_flipper(failing_flip);
        let err = tamperer.tamper(&src).unwrap_err();

        let TamperError::Modify { path, .. } = &err else {
            panic!("expected modify failure, got {:?}", err);
        };
        assert_eq!(path, &dir.path().join("keep_washed.bin"));
        assert_eq!(std::fs::read(path).unwrap(), b"0123456789");
        assert_eq!(err.inner().message(), "read-only medium");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_flip_tail_short_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short");
        std::fs::write(&path, b"ab").unwrap();
        assert!(flip_tail(&path, 5, 0xAA).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"ab");
    }
}
