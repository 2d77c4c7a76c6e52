//! # sctl CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sctl_cli::build::{run_build, BuildArgs};
use sctl_cli::validate::{run_validate, ValidateArgs};
use sctl_cli::EXIT_FATAL;

/// Security content toolkit.
///
/// Validates detection and story manifests and builds the typed content
/// collections that packaging consumes.
#[derive(Parser, Debug)]
#[command(name = "sctl", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML build configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check detection and story manifests against their schemas and content rules.
    Validate(ValidateArgs),

    /// Build every content object of a product and check the links between them.
    Build(BuildArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "sctl starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Build(args) => run_build(&args, cli.config.as_deref()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("fatal: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
