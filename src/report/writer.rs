//! Report rendering
//!
//! The text layout is line oriented so scripts can pick out the
//! `NAME: digest` lines; the JSON layout serializes the whole run.

use crate::audit::{AuditResult, FileReport, FileStatus, FingerprintOutcome};
use crate::error::{Result, WashError};
use std::io::{self, Write};

/// Line printed after each completed file
pub const SEPARATOR: &str = "----------------------------------------";

fn write_fingerprint(out: &mut impl Write, outcome: &FingerprintOutcome) -> io::Result<()> {
    match outcome {
        FingerprintOutcome::Ok(fingerprint) => write!(out, "{}", fingerprint),
        FingerprintOutcome::Error(message) => writeln!(out, "error: {}", message),
    }
}

/// Write one file's report in the text layout
pub fn write_text(out: &mut impl Write, report: &FileReport) -> io::Result<()> {
    let path = report.path.display();

    match &report.status {
        FileStatus::NotFound => writeln!(out, "File not found: {}", path),
        FileStatus::Skipped { .. } => writeln!(out, "Skipping small file: {}", path),
        FileStatus::Hashed { fingerprint } => {
            writeln!(out, "Processing: {}", path)?;
            write_fingerprint(out, fingerprint)?;
            writeln!(out, "{}", SEPARATOR)
        }
        FileStatus::CopyFailed { before, error } => {
            writeln!(out, "Processing: {}", path)?;
            writeln!(out, "Before:")?;
            write_fingerprint(out, before)?;
            writeln!(out, "Copy failed: {}", error)
        }
        FileStatus::ModifyFailed { before, error, .. } => {
            writeln!(out, "Processing: {}", path)?;
            writeln!(out, "Before:")?;
            write_fingerprint(out, before)?;
            writeln!(out, "Modification failed: {}", error)
        }
        FileStatus::Audited {
            before,
            washed_path,
            edit,
            after,
            ..
        } => {
            writeln!(out, "Processing: {}", path)?;
            writeln!(out, "Before:")?;
            write_fingerprint(out, before)?;
            writeln!(
                out,
                "Modified the last {} bytes of {}.",
                edit.after.len(),
                washed_path.display()
            )?;
            writeln!(out, "After:")?;
            write_fingerprint(out, after)?;
            writeln!(out, "{}", SEPARATOR)
        }
    }
}

/// Write the whole run as a JSON document
pub fn write_json(out: &mut impl Write, result: &AuditResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out).map_err(|e| WashError::Report(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditSummary;
    use crate::fs::TailEdit;
    use crate::hash::{hash_bytes, Algorithm};
    use std::path::PathBuf;
    use std::time::Duration;

    fn render(report: &FileReport) -> String {
        let mut buf = Vec::new();
        write_text(&mut buf, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_audited_layout() {
        let before = hash_bytes(b"hello");
        let after = hash_bytes(b"hel\xc6\xc5");
        let report = FileReport {
            path: PathBuf::from("hello.txt"),
            status: FileStatus::Audited {
                changed: before.changed(&after),
                before: FingerprintOutcome::Ok(before.clone()),
                washed_path: PathBuf::from("hello_washed.txt"),
                edit: TailEdit {
                    offset: 0,
                    before: b"hello".to_vec(),
                    after: b"hello".iter().map(|b| b ^ 0xAA).collect(),
                },
                after: FingerprintOutcome::Ok(after.clone()),
            },
        };

        let text = render(&report);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Processing: hello.txt");
        assert_eq!(lines[1], "Before:");
        assert_eq!(lines[2], format!("MD5: {}", before.md5));
        assert_eq!(lines[5], format!("CRC64: {}", before.crc64));
        assert_eq!(lines[6], "Modified the last 5 bytes of hello_washed.txt.");
        assert_eq!(lines[7], "After:");
        assert_eq!(lines[9], format!("SHA1: {}", after.sha1));
        assert_eq!(lines[12], SEPARATOR);

        let digest_lines = lines
            .iter()
            .filter(|l| Algorithm::ALL.iter().any(|a| l.starts_with(&format!("{}: ", a))))
            .count();
        assert_eq!(digest_lines, 8);
    }

    #[test]
    fn test_notices() {
        let missing = FileReport {
            path: PathBuf::from("gone"),
            status: FileStatus::NotFound,
        };
        assert_eq!(render(&missing), "File not found: gone\n");

        let small = FileReport {
            path: PathBuf::from("tiny"),
            status: FileStatus::Skipped { size: 2 },
        };
        assert_eq!(render(&small), "Skipping small file: tiny\n");
    }

    #[test]
    fn test_hash_error_line() {
        let report = FileReport {
            path: PathBuf::from("locked.bin"),
            status: FileStatus::CopyFailed {
                before: FingerprintOutcome::Error("Permission denied".to_string()),
                error: "Permission denied".to_string(),
            },
        };
        let text = render(&report);
        assert!(text.contains("error: Permission denied\n"));
        assert!(text.ends_with("Copy failed: Permission denied\n"));
    }

    #[test]
    fn test_json_document() {
        let result = AuditResult {
            files: vec![FileReport {
                path: PathBuf::from("a"),
                status: FileStatus::Hashed {
                    fingerprint: FingerprintOutcome::Ok(hash_bytes(b"123456789")),
                },
            }],
            summary: AuditSummary {
                processed: 1,
                ..Default::default()
            },
            duration: Duration::from_millis(5),
        };

        let mut buf = Vec::new();
        write_json(&mut buf, &result).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["summary"]["processed"], 1);
        assert_eq!(value["files"][0]["status"], "hashed");
        assert_eq!(value["files"][0]["fingerprint"]["ok"]["crc64"], "995dc9bbdf1939fa");
        assert_eq!(value["files"][0]["fingerprint"]["ok"]["mode"], "full");
    }
}
