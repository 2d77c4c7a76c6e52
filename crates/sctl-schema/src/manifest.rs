//! # Manifest Family Validation
//!
//! Runs the structural and semantic checks over every manifest of one
//! content family and collects the results into a [`ManifestReport`].
//!
//! Manifests are the `.json`, `.yml` and `.yaml` files directly inside the
//! family directory (`detections/` or `stories/`), visited in sorted order
//! so that duplicate-ID findings always land on the same file. One
//! [`SeenIds`] accumulator spans the whole family and both spec versions.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use sctl_core::SeenIds;

use crate::semantic;
use crate::validate::{ContentFamily, ManifestSchemas, SchemaValidationError};

/// Stage that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// The file could not be read or parsed.
    Unreadable,
    /// Schema or `spec_version` problem.
    Structural,
    /// Business-rule problem.
    Semantic,
}

/// One problem found in one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFinding {
    /// File the finding belongs to.
    pub path: PathBuf,
    /// Which stage reported it.
    pub kind: FindingKind,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for ManifestFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR: {} at:\n\t{}", self.message, self.path.display())
    }
}

/// Result of validating one content family.
#[derive(Debug, Clone)]
pub struct ManifestReport {
    /// Family that was validated.
    pub family: ContentFamily,
    /// Number of manifest files visited.
    pub files_checked: usize,
    /// Every finding, in file order.
    pub findings: Vec<ManifestFinding>,
}

impl ManifestReport {
    fn new(family: ContentFamily) -> Self {
        Self {
            family,
            files_checked: 0,
            findings: Vec::new(),
        }
    }

    /// Whether any finding was recorded.
    pub fn has_errors(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Findings of one kind.
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &ManifestFinding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    fn push(&mut self, path: &Path, kind: FindingKind, message: impl Into<String>) {
        let finding = ManifestFinding {
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        };
        tracing::debug!(path = %finding.path.display(), ?kind, message = %finding.message, "manifest finding");
        self.findings.push(finding);
    }
}

/// Validates the manifests of one family against loaded schemas.
#[derive(Debug)]
pub struct ManifestValidator {
    schemas: ManifestSchemas,
}

impl ManifestValidator {
    /// Wrap already-loaded schemas.
    pub fn new(schemas: ManifestSchemas) -> Self {
        Self { schemas }
    }

    /// Load the family's schemas from `content_root`.
    pub fn load(content_root: &Path, family: ContentFamily) -> Result<Self, SchemaValidationError> {
        Ok(Self::new(ManifestSchemas::load(content_root, family)?))
    }

    /// Validate in-memory records. Each record is paired with the path used
    /// in its findings.
    pub fn validate_records<'a, I>(&self, records: I) -> ManifestReport
    where
        I: IntoIterator<Item = (&'a Path, &'a Value)>,
    {
        let family = self.schemas.family();
        let mut report = ManifestReport::new(family);
        let mut seen = SeenIds::new();
        for (path, record) in records {
            report.files_checked += 1;
            self.check_record(path, record, &mut seen, &mut report);
        }
        report
    }

    /// Validate every manifest under `content_root/<family dir>`.
    ///
    /// # Errors
    ///
    /// Only if the manifest directory exists but cannot be listed. Problems
    /// with individual files become findings.
    pub fn validate_dir(&self, content_root: &Path) -> Result<ManifestReport, SchemaValidationError> {
        let family = self.schemas.family();
        let dir = content_root.join(family.manifest_dir());
        let mut report = ManifestReport::new(family);
        let mut seen = SeenIds::new();

        for path in manifest_files(&dir)? {
            tracing::debug!(%family, path = %path.display(), "processing manifest");
            report.files_checked += 1;
            match read_manifest(&path) {
                Ok(record) => self.check_record(&path, &record, &mut seen, &mut report),
                Err(reason) => report.push(&path, FindingKind::Unreadable, reason),
            }
        }

        tracing::info!(
            %family,
            files = report.files_checked,
            findings = report.findings.len(),
            "manifest validation complete"
        );
        Ok(report)
    }

    fn check_record(
        &self,
        path: &Path,
        record: &Value,
        seen: &mut SeenIds,
        report: &mut ManifestReport,
    ) {
        let structural = self.schemas.check(record);
        for violation in &structural.violations {
            report.push(path, FindingKind::Structural, violation.to_string());
        }
        // Semantic rules need to know which field table applies.
        let Some(version) = structural.version else {
            return;
        };
        let violations = match self.schemas.family() {
            ContentFamily::Detection => semantic::validate_detection(record, version, seen),
            ContentFamily::Story => semantic::validate_story(record, version, seen),
        };
        for violation in violations {
            report.push(path, FindingKind::Semantic, violation.to_string());
        }
    }
}

/// Load the family's schemas and validate its manifest directory.
pub fn validate_family(
    content_root: &Path,
    family: ContentFamily,
) -> Result<ManifestReport, SchemaValidationError> {
    ManifestValidator::load(content_root, family)?.validate_dir(content_root)
}

fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaValidationError> {
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "manifest directory not found");
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| SchemaValidationError::ManifestDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && is_manifest(&path) {
                    files.push(path);
                }
            }
            Err(e) => tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable entry"),
        }
    }
    files.sort();
    Ok(files)
}

fn is_manifest(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "yml" | "yaml")
    )
}

fn read_manifest(path: &Path) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("reading manifest failed: {e}"))?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}"))
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))
    }
}
