//! # Build Subcommand
//!
//! Runs the content factory over a content tree and reports the outcome.
//!
//! Every recorded failure and link error is printed to stderr, one per
//! line, followed by a summary line. The built collections are written as
//! JSON with `--emit` when the run succeeded.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sctl_build::{AttackEnrichment, Factory, FactoryInput, FactoryOutput, FactoryReport, Product};
use sctl_core::ContentType;

use crate::config::{BuildConfig, Overrides, WORKERS_ENV};
use crate::{EXIT_ERRORS, EXIT_OK};

/// Arguments for the `sctl build` subcommand.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Root of the content tree.
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Package to assemble: escu or ssa.
    #[arg(long)]
    pub product: Option<Product>,

    /// YAML or JSON file with ATT&CK enrichment data.
    #[arg(long, value_name = "FILE")]
    pub enrichment: Option<PathBuf>,

    /// Tolerate techniques missing from the enrichment data.
    #[arg(long, value_name = "BOOL")]
    pub force_cached_or_offline: Option<bool>,

    /// Construction threads per content type.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Write the built collections to this file as JSON.
    #[arg(long, value_name = "FILE")]
    pub emit: Option<PathBuf>,
}

impl BuildArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            content_root: self.path.clone(),
            product: self.product,
            enrichment: self.enrichment.clone(),
            force_cached_or_offline: self.force_cached_or_offline,
            workers: self.workers,
            emit: self.emit.clone(),
        }
    }
}

/// Execute the build subcommand.
///
/// Returns exit code: 0 on a clean run, 1 when anything was recorded.
/// Configuration and enrichment problems are returned as errors.
pub fn run_build(args: &BuildArgs, config_file: Option<&Path>) -> Result<u8> {
    let env_workers = std::env::var(WORKERS_ENV).ok();
    let config = BuildConfig::resolve(config_file, env_workers.as_deref(), args.overrides())
        .context("failed to resolve build configuration")?;
    build(&config)
}

/// Run one build with a resolved configuration.
pub fn build(config: &BuildConfig) -> Result<u8> {
    let attack_enrichment = match &config.enrichment {
        Some(path) => AttackEnrichment::load(path).context("failed to load ATT&CK enrichment")?,
        None => AttackEnrichment::empty(),
    };

    let input = FactoryInput {
        content_root: config.content_root.clone(),
        product: config.product,
        attack_enrichment,
        force_cached_or_offline: config.force_cached_or_offline,
        workers: config.workers,
    };
    let run = Factory::new(input).execute();

    for summary in &run.report.summaries {
        tracing::info!(
            content_type = %summary.content_type,
            discovered = summary.discovered,
            built = summary.built,
            failed = summary.failed,
            excluded = summary.excluded,
            "content type summary"
        );
    }

    let mut stderr = std::io::stderr().lock();
    for line in report_lines(&run.report) {
        writeln!(stderr, "{line}").context("failed to write report")?;
    }
    writeln!(stderr, "{}", summary_line(&run.output, &run.report)).context("failed to write report")?;

    if !run.succeeded() {
        if let Some(path) = &config.emit {
            tracing::warn!(path = %path.display(), "build failed, output not written");
        }
        return Ok(EXIT_ERRORS);
    }

    if let Some(path) = &config.emit {
        emit(&run.output, path)?;
    }
    Ok(EXIT_OK)
}

/// One line per build failure, then one per link error.
pub fn report_lines(report: &FactoryReport) -> Vec<String> {
    report
        .failures
        .iter()
        .map(|f| format!("ERROR: {f}"))
        .chain(report.link_errors.iter().map(|e| format!("ERROR: {e}")))
        .collect()
}

/// Final line of a build: object total or error counts.
pub fn summary_line(output: &FactoryOutput, report: &FactoryReport) -> String {
    if report.is_clean() {
        let kept: usize = ContentType::all().iter().map(|t| output.count(*t)).sum();
        format!("Build succeeded: {kept} object(s) built")
    } else {
        format!(
            "Build failed: {} error(s) ({} file(s) failed, {} link error(s))",
            report.error_count(),
            report.failures.len(),
            report.link_errors.len()
        )
    }
}

fn emit(output: &FactoryOutput, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, output)
        .with_context(|| format!("failed to serialize output to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote build output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sctl_build::{BuildError, BuildFailure, LinkError, LinkProblem};

    #[test]
    fn report_lines_list_failures_before_link_errors() {
        let report = FactoryReport {
            failures: vec![BuildFailure {
                content_type: ContentType::Macro,
                error: BuildError::NotAMapping {
                    path: PathBuf::from("macros/bad.yml"),
                },
            }],
            link_errors: vec![LinkError {
                content_type: ContentType::Playbook,
                name: "Block Login".into(),
                problem: LinkProblem::UnknownDetection("Gone".into()),
            }],
            summaries: Vec::new(),
        };
        let lines = report_lines(&report);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ERROR: [macro]"), "{}", lines[0]);
        assert!(lines[0].contains("macros/bad.yml"));
        assert_eq!(
            lines[1],
            "ERROR: playbook 'Block Login': detection 'Gone' does not exist"
        );
        assert_eq!(
            summary_line(&FactoryOutput::default(), &report),
            "Build failed: 2 error(s) (1 file(s) failed, 1 link error(s))"
        );
    }

    #[test]
    fn empty_report_succeeds() {
        let report = FactoryReport::default();
        assert!(report_lines(&report).is_empty());
        assert_eq!(
            summary_line(&FactoryOutput::default(), &report),
            "Build succeeded: 0 object(s) built"
        );
    }

    #[test]
    fn args_become_overrides() {
        let args = BuildArgs {
            path: Some(PathBuf::from("content")),
            product: Some(Product::Ssa),
            workers: Some(4),
            ..BuildArgs::default()
        };
        let overrides = args.overrides();
        assert_eq!(overrides.content_root, Some(PathBuf::from("content")));
        assert_eq!(overrides.product, Some(Product::Ssa));
        assert_eq!(overrides.workers, Some(4));
        assert_eq!(overrides.force_cached_or_offline, None);
    }
}
