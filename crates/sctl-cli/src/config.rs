//! # Build Configuration
//!
//! Settings for `sctl build`, resolved from three layers. Later layers win:
//!
//! 1. a YAML file given with the global `--config` flag,
//! 2. the `SCTL_WORKERS` environment variable,
//! 3. explicit command-line flags.
//!
//! Anything left unset takes the [`BuildConfig::default`] value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sctl_build::Product;

/// Environment variable overriding the worker count.
pub const WORKERS_ENV: &str = "SCTL_WORKERS";

/// Errors resolving the build configuration. All are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("SCTL_WORKERS={value} is not a worker count")]
    InvalidWorkers { value: String },
}

/// Resolved settings of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Root of the content tree.
    pub content_root: PathBuf,
    /// Package to assemble.
    pub product: Product,
    /// YAML or JSON file with ATT&CK enrichment data.
    pub enrichment: Option<PathBuf>,
    /// Tolerate techniques missing from the enrichment data.
    pub force_cached_or_offline: bool,
    /// Construction threads per content type.
    pub workers: usize,
    /// Write the built collections here as JSON.
    pub emit: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("."),
            product: Product::Escu,
            enrichment: None,
            force_cached_or_offline: true,
            workers: 1,
            emit: None,
        }
    }
}

/// Command-line values that override the file and environment layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub content_root: Option<PathBuf>,
    pub product: Option<Product>,
    pub enrichment: Option<PathBuf>,
    pub force_cached_or_offline: Option<bool>,
    pub workers: Option<usize>,
    pub emit: Option<PathBuf>,
}

impl BuildConfig {
    /// Load a YAML configuration file. Missing keys take default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file is an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge the configuration file (if any), the worker-count environment
    /// value (if any) and the command-line overrides.
    pub fn resolve(
        config_file: Option<&Path>,
        env_workers: Option<&str>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(raw) = env_workers.map(str::trim).filter(|v| !v.is_empty()) {
            config.workers = raw.parse().map_err(|_| ConfigError::InvalidWorkers {
                value: raw.to_string(),
            })?;
        }

        let Overrides {
            content_root,
            product,
            enrichment,
            force_cached_or_offline,
            workers,
            emit,
        } = overrides;
        if let Some(root) = content_root {
            config.content_root = root;
        }
        if let Some(product) = product {
            config.product = product;
        }
        if enrichment.is_some() {
            config.enrichment = enrichment;
        }
        if let Some(force) = force_cached_or_offline {
            config.force_cached_or_offline = force;
        }
        if let Some(workers) = workers {
            config.workers = workers;
        }
        if emit.is_some() {
            config.emit = emit;
        }

        tracing::debug!(?config, "resolved build configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("sctl.yml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_without_any_layer() {
        let config = BuildConfig::resolve(None, None, Overrides::default()).unwrap();
        assert_eq!(config, BuildConfig::default());
        assert!(config.force_cached_or_offline);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "content_root: content\nproduct: ssa\nforce_cached_or_offline: false\nworkers: 3\n",
        );
        let config = BuildConfig::load(&path).unwrap();
        assert_eq!(config.content_root, PathBuf::from("content"));
        assert_eq!(config.product, Product::Ssa);
        assert!(!config.force_cached_or_offline);
        assert_eq!(config.workers, 3);
        assert_eq!(config.emit, None);
    }

    #[test]
    fn empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "\n");
        assert_eq!(BuildConfig::load(&path).unwrap(), BuildConfig::default());
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "workers: 2\n");

        let config = BuildConfig::resolve(Some(&path), Some("6"), Overrides::default()).unwrap();
        assert_eq!(config.workers, 6);

        let overrides = Overrides {
            workers: Some(8),
            ..Overrides::default()
        };
        let config = BuildConfig::resolve(Some(&path), Some("6"), overrides).unwrap();
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "wrokers: 2\n");
        assert!(matches!(
            BuildConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildConfig::load(&dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.yml"));
    }

    #[test]
    fn bad_env_workers() {
        let err = BuildConfig::resolve(None, Some("many"), Overrides::default()).unwrap_err();
        assert_eq!(err.to_string(), "SCTL_WORKERS=many is not a worker count");
        // Blank values are ignored.
        let config = BuildConfig::resolve(None, Some("  "), Overrides::default()).unwrap();
        assert_eq!(config.workers, 1);
    }
}
