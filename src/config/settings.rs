//! Configuration settings for washcheck
//!
//! Defines CLI arguments, defaults, and the runtime configuration derived
//! from them.

use crate::error::{Result, WashError};
use crate::fs::TamperOptions;
use crate::hash::SamplingPolicy;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// washcheck - fingerprint files and check that a small trailing change is detected
#[derive(Parser, Debug, Clone)]
#[command(name = "washcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fingerprint files and verify tamper sensitivity")]
#[command(long_about = r#"
washcheck computes MD5, SHA-1, CRC-32 and CRC-64/ECMA-182 fingerprints of each
file, writes a copy named <stem>_washed.<ext> whose last 5 bytes are XORed with
0xAA, and fingerprints the copy again.

Files larger than the sampling threshold are fingerprinted from their first
and last sample-size bytes only, unless --no-sample is given.

Examples:
  washcheck report.pdf photo.jpg          # Audit two files
  washcheck --no-sample disk.img          # Hash every byte of a large file
  washcheck --output-format json *.bin    # Machine-readable report
  washcheck --hash-only data.bin          # Fingerprints only, no copy
"#)]
pub struct CliArgs {
    /// Files to audit
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Hash whole files even above the sampling threshold
    #[arg(long)]
    pub no_sample: bool,

    /// Head/tail window used when sampling (e.g., 1M, 64K)
    #[arg(long, default_value = "1M", value_name = "SIZE")]
    pub sample_size: String,

    /// Files larger than this are sampled (e.g., 100M, 1G)
    #[arg(long, default_value = "100M", value_name = "SIZE")]
    pub threshold: String,

    /// Print fingerprints without writing a tampered copy
    #[arg(long)]
    pub hash_only: bool,

    /// Marker inserted into the name of the tampered copy
    #[arg(long, default_value = "washed", value_name = "NAME")]
    pub marker: String,

    /// Output format for reports
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Verbose logging (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Paths to process, in order
    pub files: Vec<PathBuf>,
    /// Allow head/tail sampling of large files
    pub sampling: bool,
    /// Sampling thresholds
    pub policy: SamplingPolicy,
    /// Tamper copy settings
    pub tamper: TamperOptions,
    /// Skip the tamper step and only fingerprint
    pub fingerprint_only: bool,
    /// Report format
    pub output_format: OutputFormat,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            sampling: true,
            policy: SamplingPolicy::default(),
            tamper: TamperOptions::default(),
            fingerprint_only: false,
            output_format: OutputFormat::Text,
        }
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid size: {}", size));
    }

    Ok((num * multiplier as f64) as u64)
}

impl AuditConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let sample_size = parse_size(&args.sample_size)
            .map_err(|e| WashError::config(format!("Invalid sample size: {}", e)))?;
        let threshold = parse_size(&args.threshold)
            .map_err(|e| WashError::config(format!("Invalid threshold: {}", e)))?;

        if args.marker.is_empty() || args.marker.contains(std::path::is_separator) {
            return Err(WashError::config(format!("Invalid marker: {:?}", args.marker)));
        }

        Ok(Self {
            files: args.files.clone(),
            sampling: !args.no_sample,
            policy: SamplingPolicy::new(sample_size, threshold)?,
            tamper: TamperOptions {
                marker: args.marker.clone(),
                ..Default::default()
            },
            fingerprint_only: args.hash_only,
            output_format: args.output_format,
        })
    }

    /// Log filter directive implied by -v/-q
    pub fn log_level(verbose: u8, quiet: bool) -> &'static str {
        if quiet {
            return "error";
        }
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{DEFAULT_SAMPLE_SIZE, DEFAULT_THRESHOLD};

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("1M").unwrap(), DEFAULT_SAMPLE_SIZE);
        assert_eq!(parse_size("100M").unwrap(), DEFAULT_THRESHOLD);
        assert_eq!(parse_size("1.5G").unwrap(), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
        assert!(parse_size("-1M").is_err());
    }

    #[test]
    fn test_defaults_from_cli() {
        let args = CliArgs::parse_from(["washcheck", "a.bin", "b.bin"]);
        let config = AuditConfig::from_cli(&args).unwrap();

        assert_eq!(config.files, vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")]);
        assert!(config.sampling);
        assert!(!config.fingerprint_only);
        assert_eq!(config.policy, SamplingPolicy::default());
        assert_eq!(config.tamper.window, 5);
        assert_eq!(config.tamper.mask, 0xAA);
        assert_eq!(config.tamper.marker, "washed");
    }

    #[test]
    fn test_hash_only_flag() {
        let args = CliArgs::parse_from(["washcheck", "--hash-only", "--no-sample", "x.iso"]);
        let config = AuditConfig::from_cli(&args).unwrap();
        assert!(config.fingerprint_only);
        assert!(!config.sampling);
        assert_eq!(config.files, vec![PathBuf::from("x.iso")]);
    }

    #[test]
    fn test_file_named_hash_is_audited() {
        let args = CliArgs::parse_from(["washcheck", "hash", "data.bin"]);
        let config = AuditConfig::from_cli(&args).unwrap();
        assert!(!config.fingerprint_only);
        assert_eq!(config.files, vec![PathBuf::from("hash"), PathBuf::from("data.bin")]);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let args = CliArgs::parse_from([
            "washcheck",
            "--sample-size",
            "2M",
            "--threshold",
            "1M",
            "f",
        ]);
        assert!(matches!(AuditConfig::from_cli(&args), Err(WashError::Config(_))));
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let args = CliArgs::parse_from(["washcheck", "--marker", "a/b", "f"]);
        assert!(AuditConfig::from_cli(&args).is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(AuditConfig::log_level(0, false), "warn");
        assert_eq!(AuditConfig::log_level(2, false), "debug");
        assert_eq!(AuditConfig::log_level(3, true), "error");
    }
}
