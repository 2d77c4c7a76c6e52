//! # Validate Subcommand
//!
//! Checks the manifests under `stories/` and `detections/` against the
//! JSON schema of their `spec_version` and the semantic content rules.
//! Stories are checked first, then detections. Every finding is written to
//! stderr as it appears in the report, followed by a one-line verdict.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sctl_schema::{validate_family, ContentFamily, ManifestReport};

use crate::{EXIT_ERRORS, EXIT_OK};

/// Families in the order they are validated.
const FAMILIES: [ContentFamily; 2] = [ContentFamily::Story, ContentFamily::Detection];

/// Arguments for the `sctl validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Root of the content tree (holds `spec/`, `stories/` and `detections/`).
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when no errors were found, 1 otherwise. A schema
/// that cannot be loaded is returned as an error.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let reports = validate_tree(&args.path)?;
    let mut stderr = std::io::stderr().lock();
    write_reports(&reports, &mut stderr).context("failed to write validation report")
}

/// Write every finding, then the verdict, to `out` and return the exit code.
pub fn write_reports<W: Write>(reports: &[ManifestReport], out: &mut W) -> io::Result<u8> {
    let mut had_errors = false;
    for report in reports {
        for finding in &report.findings {
            writeln!(out, "{finding}")?;
        }
        had_errors |= report.has_errors();
    }

    if had_errors {
        writeln!(out, "Errors found")?;
        Ok(EXIT_ERRORS)
    } else {
        writeln!(out, "No Errors found")?;
        Ok(EXIT_OK)
    }
}

/// Validate every manifest family under `content_root`.
pub fn validate_tree(content_root: &Path) -> Result<Vec<ManifestReport>> {
    FAMILIES
        .iter()
        .map(|&family| {
            let report = validate_family(content_root, family)
                .with_context(|| format!("failed to validate {family} manifests"))?;
            tracing::info!(
                %family,
                files = report.files_checked,
                findings = report.findings.len(),
                "validated manifests"
            );
            Ok(report)
        })
        .collect()
}
