//! # Link Validation
//!
//! A post-pass over the fully built collections. Checks that need every
//! object of a run to exist (story names referenced by detections,
//! detection names referenced by baselines and playbooks) run here rather
//! than in the builders, together with the reference-URL syntax check and
//! the macros and lookups a detection's search could not resolve.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use url::Url;

use sctl_core::{ContentObject, ContentType};

use crate::discovery::Product;
use crate::factory::FactoryOutput;

/// What is wrong with one link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkProblem {
    /// A reference is not an absolute http(s) URL with a host.
    #[error("invalid reference URL '{url}': {reason}")]
    InvalidReference { url: String, reason: String },

    /// The search uses a macro no built macro answers to.
    #[error("search uses macro '{0}' which is not defined")]
    UnresolvedMacro(String),

    /// The search uses a lookup no built lookup answers to.
    #[error("search uses lookup '{0}' which is not defined")]
    UnresolvedLookup(String),

    /// A detection names a story that was not built.
    #[error("analytic story '{0}' does not exist")]
    UnknownStory(String),

    /// A baseline or playbook names a detection that was not built.
    #[error("detection '{0}' does not exist")]
    UnknownDetection(String),
}

/// A link problem attributed to the object that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkError {
    /// Type of the object carrying the link.
    pub content_type: ContentType,
    /// Name of that object.
    pub name: String,
    /// What is wrong.
    pub problem: LinkProblem,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.content_type, self.name, self.problem)
    }
}

impl std::error::Error for LinkError {}

/// Run every link check over `output`.
pub fn validate_links(output: &FactoryOutput, product: Product) -> Vec<LinkError> {
    let mut errors = Vec::new();

    check_references(&output.detections, &mut errors);
    check_references(&output.stories, &mut errors);
    check_references(&output.baselines, &mut errors);
    check_references(&output.investigations, &mut errors);
    check_references(&output.playbooks, &mut errors);

    let detection_names: HashSet<&str> = output.detections.iter().map(|d| d.name.as_str()).collect();
    let story_names: HashSet<&str> = output.stories.iter().map(|s| s.name.as_str()).collect();

    for det in &output.detections {
        let mut push = |problem| {
            errors.push(LinkError {
                content_type: ContentType::Detection,
                name: det.name.clone(),
                problem,
            })
        };
        // The SSA product ships no stories, macros or lookups.
        if product == Product::Escu {
            for m in &det.unresolved_macros {
                push(LinkProblem::UnresolvedMacro(m.clone()));
            }
            for l in &det.unresolved_lookups {
                push(LinkProblem::UnresolvedLookup(l.clone()));
            }
            for story in &det.tags.analytic_story {
                if !story_names.contains(story.as_str()) {
                    push(LinkProblem::UnknownStory(story.clone()));
                }
            }
        }
    }

    for baseline in &output.baselines {
        for name in &baseline.tags.detections {
            if !detection_names.contains(name.as_str()) {
                errors.push(LinkError {
                    content_type: ContentType::Baseline,
                    name: baseline.name.clone(),
                    problem: LinkProblem::UnknownDetection(name.clone()),
                });
            }
        }
    }

    for playbook in &output.playbooks {
        for name in &playbook.tags.detections {
            if !detection_names.contains(name.as_str()) {
                errors.push(LinkError {
                    content_type: ContentType::Playbook,
                    name: playbook.name.clone(),
                    problem: LinkProblem::UnknownDetection(name.clone()),
                });
            }
        }
    }

    for err in &errors {
        tracing::error!(content_type = %err.content_type, name = %err.name, "{}", err.problem);
    }
    errors
}

fn check_references<T: ContentObject>(objects: &[std::sync::Arc<T>], errors: &mut Vec<LinkError>) {
    for object in objects {
        for reference in object.references() {
            if let Err(reason) = check_url(reference) {
                errors.push(LinkError {
                    content_type: T::CONTENT_TYPE,
                    name: object.name().to_string(),
                    problem: LinkProblem::InvalidReference {
                        url: reference.clone(),
                        reason,
                    },
                });
            }
        }
    }
}

/// Absolute `http` or `https` URL with a host.
fn check_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        "http" | "https" => Err("missing host".to_string()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
