//! Configuration for embedders.
//!
//! Loaded from a TOML file with per-field defaults. A missing or
//! unparsable file falls back to defaults with a warning rather than
//! failing startup; the error console must never be the reason the host
//! does not come up.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Storage file name inside the platform data directory.
pub const STORAGE_FILE: &str = "errors.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultlineConfig {
    /// Where the persisted record store lives.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Whether `init()` opens the overlay immediately.
    #[serde(default = "default_open_on_start")]
    pub open_on_start: bool,
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("faultline")
        .join(STORAGE_FILE)
}

fn default_open_on_start() -> bool {
    true
}

impl Default for FaultlineConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            open_on_start: default_open_on_start(),
        }
    }
}

impl FaultlineConfig {
    /// Load from `path`, falling back to defaults when the file is
    /// missing or unparsable.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "could not load config from {}: {err:#}, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).context("parsing config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FaultlineConfig::default();
        assert!(config.open_on_start);
        assert!(config.storage_path.ends_with("faultline/errors.json"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = FaultlineConfig::load(Path::new("/nonexistent/faultline.toml"));
        assert!(config.open_on_start);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faultline.toml");
        fs::write(&path, "open_on_start = false\n").unwrap();

        let config = FaultlineConfig::load(&path);
        assert!(!config.open_on_start);
        assert!(config.storage_path.ends_with("faultline/errors.json"));
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faultline.toml");
        fs::write(
            &path,
            "storage_path = \"/tmp/fl/errors.json\"\nopen_on_start = true\n",
        )
        .unwrap();

        let config = FaultlineConfig::load(&path);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/fl/errors.json"));
    }

    #[test]
    fn test_load_unparsable_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faultline.toml");
        fs::write(&path, "this is not toml = = =").unwrap();

        let config = FaultlineConfig::load(&path);
        assert!(config.open_on_start);
    }
}
