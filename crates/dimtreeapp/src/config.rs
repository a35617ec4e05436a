//! # Configuration
//!
//! dimtree configuration is loaded with [`confique`] from two layers:
//!
//! 1. **Environment variables**: `DIMTREE_ACTOR`, `DIMTREE_DEFAULT_MAX_DEPTH`.
//! 2. **Data directory config**: `<data_dir>/dimtree.toml`, optional.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! The data directory itself is not a config key: the file lives inside it.
//! See [`crate::init`] for how the directory is chosen.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `actor` | `system` | Name written to `created_by` / `updated_by` |
//! | `default_max_depth` | `6` | Max depth for `type create` when none is given |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DimError, Result};

pub const CONFIG_FILE: &str = "dimtree.toml";

/// Configuration for dimtree, stored in `dimtree.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DimtreeConfig {
    /// Name recorded as the author of every write.
    #[config(env = "DIMTREE_ACTOR", default = "system")]
    pub actor: String,

    /// Max depth used when a type is created without one.
    #[config(env = "DIMTREE_DEFAULT_MAX_DEPTH", default = 6)]
    pub default_max_depth: u32,
}

impl Default for DimtreeConfig {
    fn default() -> Self {
        Self {
            actor: crate::api::DEFAULT_ACTOR.to_string(),
            default_max_depth: 6,
        }
    }
}

impl DimtreeConfig {
    /// Load the config for a data directory. A missing file yields the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(data_dir.join(CONFIG_FILE))
            .load()
            .map_err(|e| DimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.actor.trim().is_empty() {
            return Err(DimError::Config("actor must not be blank".to_string()));
        }
        if self.default_max_depth == 0 {
            return Err(DimError::Config(
                "default_max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DimtreeConfig::default();
        assert_eq!(config.actor, "system");
        assert_eq!(config.default_max_depth, 6);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = DimtreeConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_max_depth, 6);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "default_max_depth = 3\n").unwrap();
        let config = DimtreeConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_max_depth, 3);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "default_max_depth = 0\n").unwrap();
        let err = DimtreeConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, DimError::Config(_)));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "actor = [").unwrap();
        assert!(matches!(
            DimtreeConfig::load(dir.path()),
            Err(DimError::Config(_))
        ));
    }
}
