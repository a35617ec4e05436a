//! # Data Directory Resolution
//!
//! All dimension data lives in one directory (see [`crate::store`] for its layout).
//! The directory is chosen during [`initialize`], first match wins:
//!
//! 1. An explicit override (the CLI's `--data` flag).
//! 2. The `DIMTREE_DATA` environment variable.
//! 3. The OS-appropriate data directory, via the `directories` crate
//!    (e.g. `~/.local/share/dimtree` on Linux).
//!
//! The directory does not have to exist yet: the first write creates it.
//! Configuration is then loaded from `<data_dir>/dimtree.toml`.

use crate::api::DimApi;
use crate::config::DimtreeConfig;
use crate::error::{DimError, Result};
use crate::store::fs::FileStore;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

pub const DATA_ENV: &str = "DIMTREE_DATA";

pub struct DimContext {
    pub api: DimApi<FileStore>,
    pub config: DimtreeConfig,
    pub data_dir: PathBuf,
}

/// Pick the data directory, given an optional explicit override.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_override {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "dimtree")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| DimError::Store("Could not determine a data directory".to_string()))
}

/// Build a file-backed API for the resolved data directory.
pub fn initialize(data_override: Option<PathBuf>) -> Result<DimContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = DimtreeConfig::load(&data_dir)?;
    debug!("Using data directory {}", data_dir.display());

    let api = DimApi::new(FileStore::new(data_dir.clone())).with_actor(config.actor.clone());
    Ok(DimContext {
        api,
        config,
        data_dir,
    })
}
