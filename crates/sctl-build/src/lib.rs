//! # sctl-build — Content Construction
//!
//! Turns a content tree into typed, cross-linked collections.
//!
//! ```text
//! Factory ──► Director ──► Builder ──► typed object
//!    │                                     │
//!    └──── append (duplicate check) ◄──────┘
//!    │
//!    └──► links::validate_links (post-pass)
//! ```
//!
//! - [`factory`]: fixed-order orchestration over content types and the
//!   fail-at-end report.
//! - [`director`]: the builder steps each content type needs.
//! - [`builder`]: one file to one validated object.
//! - [`links`]: checks that need every object of the run.
//! - [`discovery`], [`parser`], [`enrichment`]: file discovery, YAML/JSON
//!   loading and ATT&CK data.

pub mod builder;
pub mod director;
pub mod discovery;
pub mod enrichment;
pub mod error;
pub mod factory;
pub mod links;
pub mod parser;

pub use builder::Builder;
pub use director::{DetectionDeps, Director};
pub use discovery::Product;
pub use enrichment::AttackEnrichment;
pub use error::{BuildError, BuildResult};
pub use factory::{
    BuildFailure, Factory, FactoryInput, FactoryOutput, FactoryReport, FactoryRun, TypeSummary,
};
pub use links::{LinkError, LinkProblem};
