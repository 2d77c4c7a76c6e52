//! Content file discovery and product partitioning.
//!
//! Each content type lives in its own directory under the content root
//! ([`ContentType::directory`]), except that ESCU deployments are read from
//! `deployments/ESCU` only ([`Product::content_dir`]). Files are found
//! recursively and returned in sorted order so that construction, duplicate
//! detection and the final output are reproducible across platforms.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sctl_core::ContentType;

use crate::error::{BuildError, BuildResult};

/// File-name marker of content that belongs to the SSA product.
pub const SSA_MARKER: &str = "ssa___";

/// Subdirectory of `deployments/` holding the ESCU deployments.
pub const ESCU_DEPLOYMENTS: &str = "ESCU";

/// Which content package a factory run assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// The full package: every content type, SSA files excluded.
    #[default]
    Escu,
    /// The streaming package: unit tests and detections from SSA files only.
    Ssa,
}

impl Product {
    /// Content types this product builds, in build order.
    pub fn content_types(&self) -> &'static [ContentType] {
        match self {
            Self::Escu => &ContentType::BUILD_ORDER,
            Self::Ssa => &[ContentType::UnitTest, ContentType::Detection],
        }
    }

    /// Directory, relative to the content root, searched for `content_type`.
    pub fn content_dir(&self, content_type: ContentType) -> PathBuf {
        let dir = Path::new(content_type.directory());
        match (self, content_type) {
            (Self::Escu, ContentType::Deployment) => dir.join(ESCU_DEPLOYMENTS),
            _ => dir.to_path_buf(),
        }
    }

    /// Whether a discovered file belongs to this product.
    pub fn admits(&self, path: &Path) -> bool {
        let is_ssa = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(SSA_MARKER));
        match self {
            Self::Escu => !is_ssa,
            Self::Ssa => is_ssa,
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Escu => f.write_str("escu"),
            Self::Ssa => f.write_str("ssa"),
        }
    }
}

impl std::str::FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "escu" => Ok(Self::Escu),
            "ssa" | "ba" => Ok(Self::Ssa),
            other => Err(format!("unknown product '{other}', expected escu or ssa")),
        }
    }
}

/// All `.yml` / `.yaml` files under the product's directory for
/// `content_type`, sorted.
///
/// A missing directory yields an empty list; a directory that exists but
/// cannot be read is a [`BuildError::Discovery`].
pub fn discover(
    content_root: &Path,
    product: Product,
    content_type: ContentType,
) -> BuildResult<Vec<PathBuf>> {
    let dir = content_root.join(product.content_dir(content_type));
    if !dir.is_dir() {
        tracing::warn!(%content_type, path = %dir.display(), "content directory not found");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    collect_yaml_files(&dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_yaml_files(dir: &Path, out: &mut Vec<PathBuf>) -> BuildResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| BuildError::Discovery {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| BuildError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_yaml_files(&path, out)?;
        } else if is_yaml(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("detections/network")).unwrap();
        fs::create_dir_all(root.join("detections/endpoint")).unwrap();
        fs::write(root.join("detections/network/b.yml"), "").unwrap();
        fs::write(root.join("detections/endpoint/a.yaml"), "").unwrap();
        fs::write(root.join("detections/endpoint/notes.md"), "").unwrap();

        let files = discover(root, Product::Escu, ContentType::Detection).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("detections/endpoint/a.yaml"),
                PathBuf::from("detections/network/b.yml"),
            ]
        );
    }

    #[test]
    fn unit_tests_live_in_tests_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/a.yml"), "").unwrap();
        assert_eq!(discover(dir.path(), Product::Escu, ContentType::UnitTest).unwrap().len(), 1);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), Product::Escu, ContentType::Story).unwrap().is_empty());
    }

    #[test]
    fn escu_deployments_come_from_escu_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("deployments/ESCU")).unwrap();
        fs::create_dir_all(root.join("deployments/SSA")).unwrap();
        fs::write(root.join("deployments/ESCU/ttp.yml"), "").unwrap();
        fs::write(root.join("deployments/SSA/ttp.yml"), "").unwrap();

        let files = discover(root, Product::Escu, ContentType::Deployment).unwrap();
        assert_eq!(files, vec![root.join("deployments/ESCU/ttp.yml")]);
        assert_eq!(
            Product::Ssa.content_dir(ContentType::Deployment),
            PathBuf::from("deployments")
        );
    }

    #[test]
    fn ssa_partition() {
        let ssa = Path::new("detections/endpoint/ssa___suspicious.yml");
        let escu = Path::new("detections/endpoint/suspicious.yml");
        assert!(Product::Ssa.admits(ssa));
        assert!(!Product::Ssa.admits(escu));
        assert!(Product::Escu.admits(escu));
        assert!(!Product::Escu.admits(ssa));
    }

    #[test]
    fn product_parse() {
        assert_eq!("SSA".parse::<Product>().unwrap(), Product::Ssa);
        assert!("splunk".parse::<Product>().is_err());
    }
}
