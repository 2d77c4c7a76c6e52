#![deny(missing_docs)]

//! # sctl-core — Foundational Types for the Security Content Toolkit
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Single [`ContentType`] enum.** Discovery directory, build order and
//!    dependencies are data on the enum, so the construction pipeline has
//!    exactly one place to consult.
//!
//! 2. **One violation vocabulary.** [`ContentViolation`] is shared by the
//!    manifest validator (both spec versions) and the typed-object builders.
//!
//! 3. **Typed objects validate themselves.** Every object implements
//!    [`ContentObject::validate`]; builders refuse to hand out an object with
//!    a non-empty violation list.
//!
//! 4. **No `.unwrap()` outside tests.**

pub mod content_type;
pub mod ids;
pub mod objects;
pub mod text;
pub mod violation;

// Re-export primary types at crate root for ergonomic imports.
pub use content_type::{ContentType, UnknownContentType};
pub use ids::SeenIds;
pub use objects::{
    AnalyticType, Baseline, ContentObject, DataMetadata, Deployment, Detection, Investigation,
    Lookup, Macro, MitreAttackEnrichment, Playbook, Story, UnitTest,
};
pub use violation::ContentViolation;
