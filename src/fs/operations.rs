//! File copy operations
//!
//! Copies are staged in a hidden sibling file and renamed into place, so a
//! failed copy never leaves a half-written destination behind.

use crate::error::{IoResultExt, Result, WashError};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Options for file copy operations
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Buffer size for buffered operations
    pub buffer_size: usize,
    /// Sync to disk before the rename
    pub sync: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024, // 1MB
            sync: true,
        }
    }
}

/// Byte-for-byte file copier
pub struct FileCopier {
    options: CopyOptions,
}

impl FileCopier {
    /// Create a new file copier with the given options
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    /// Copy file contents from source to destination, replacing any existing file
    ///
    /// Only contents are copied; permissions and timestamps of the
    /// destination are the defaults for a newly created file. Returns the
    /// number of bytes copied.
    pub fn copy(&self, source: &Path, dest: &Path) -> Result<u64> {
        let start = std::time::Instant::now();
        let staging = staging_path(dest);

        let bytes_copied = match self.copy_buffered(source, &staging) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = std::fs::remove_file(&staging);
                return Err(e);
            }
        };

        if let Err(e) = std::fs::rename(&staging, dest) {
            let _ = std::fs::remove_file(&staging);
            return Err(WashError::io(dest, e));
        }

        tracing::debug!(
            "Copied {} -> {} ({} in {:.2?})",
            source.display(),
            dest.display(),
            humansize::format_size(bytes_copied, humansize::BINARY),
            start.elapsed()
        );

        Ok(bytes_copied)
    }

    fn copy_buffered(&self, source: &Path, dest: &Path) -> Result<u64> {
        let src_file = File::open(source).with_path(source)?;
        let dst_file = File::create(dest).with_path(dest)?;

        let mut reader = BufReader::with_capacity(self.options.buffer_size, src_file);
        let mut writer = BufWriter::with_capacity(self.options.buffer_size, dst_file);

        let bytes_copied = std::io::copy(&mut reader, &mut writer)
            .map_err(|e| WashError::io(source, e))?;

        let dst_file = writer
            .into_inner()
            .map_err(|e| WashError::io(dest, e.into_error()))?;

        if self.options.sync {
            dst_file.sync_all().with_path(dest)?;
        }

        Ok(bytes_copied)
    }
}

/// Hidden sibling used while a copy is in flight: `dir/.name.partial`
fn staging_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_default());
    name.push(".partial");
    dest.with_file_name(name)
}
