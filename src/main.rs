//! washcheck CLI - fingerprint files and verify tamper sensitivity

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use washcheck::audit::AuditEngine;
use washcheck::config::{AuditConfig, CliArgs, OutputFormat};
use washcheck::report::{write_json, write_text};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Initialize logging; RUST_LOG overrides -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(AuditConfig::log_level(args.verbose, args.quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: &CliArgs) -> anyhow::Result<ExitCode> {
    let config = AuditConfig::from_cli(args)?;

    if config.files.is_empty() {
        eprintln!("Usage: washcheck [OPTIONS] <FILE>...");
        eprintln!("       washcheck --hash-only <FILE>...");
        eprintln!("       washcheck --help for more information");
        return Ok(ExitCode::from(2));
    }

    tracing::debug!(
        "Sampling {} (window {}, threshold {})",
        if config.sampling { "enabled" } else { "disabled" },
        humansize::format_size(config.policy.sample_size(), humansize::BINARY),
        humansize::format_size(config.policy.threshold(), humansize::BINARY)
    );

    let format = config.output_format;
    let engine = AuditEngine::new(config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;

    let result = engine.execute(|report| {
        if format == OutputFormat::Text && write_error.is_none() {
            if let Err(e) = write_text(&mut out, report).and_then(|_| out.flush()) {
                write_error = Some(e);
            }
        }
    });

    if let Some(e) = write_error {
        return Err(e).context("failed to write report");
    }

    if format == OutputFormat::Json {
        write_json(&mut out, &result).context("failed to write JSON report")?;
    }

    if result.summary.undetected > 0 {
        tracing::warn!(
            "{} file(s) kept identical fingerprints after tampering",
            result.summary.undetected
        );
    }

    if !result.any_valid_input() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
