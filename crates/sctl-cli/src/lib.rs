//! # sctl-cli — Security Content Toolkit CLI
//!
//! Provides the `sctl` command-line interface.
//!
//! ## Subcommands
//!
//! - `sctl validate`: structural and semantic checks of detection and
//!   story manifests.
//! - `sctl build`: construct every content object of a product and run
//!   the link checks.
//!
//! ## Exit codes
//!
//! `0` when nothing was found, `1` when any manifest or content error was
//! reported, `2` on fatal configuration problems (missing schema,
//! unreadable config or enrichment file).
//!
//! ```bash
//! sctl validate --path security_content
//! sctl build --path security_content --product ssa --workers 4 --emit out.json
//! ```

pub mod build;
pub mod config;
pub mod validate;

/// Exit code for a clean run.
pub const EXIT_OK: u8 = 0;
/// Exit code when content errors were reported.
pub const EXIT_ERRORS: u8 = 1;
/// Exit code for fatal configuration errors.
pub const EXIT_FATAL: u8 = 2;
