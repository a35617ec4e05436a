use super::backend::{NodeIndex, StorageBackend, TypeIndex};
use super::lock::StoreLock;
use crate::error::{DimError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const TYPES_FILE: &str = "types.json";
const NODES_FILE: &str = "nodes.json";

pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(DimError::Io)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned + Default>(&self, file_name: &str) -> Result<T> {
        let file = self.root.join(file_name);
        if !file.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(file).map_err(DimError::Io)?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(DimError::Serialization)
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;

        let target = self.root.join(file_name);
        let content = serde_json::to_string_pretty(value).map_err(DimError::Serialization)?;

        // Atomic write: readers see the old file or the new one, never a mix
        let tmp_file = self.root.join(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));
        let written = fs::write(&tmp_file, content).and_then(|_| fs::rename(&tmp_file, &target));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_file);
            return Err(DimError::Io(e));
        }

        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_types(&self) -> Result<TypeIndex> {
        self.read_json(TYPES_FILE)
    }

    fn save_types(&self, types: &TypeIndex) -> Result<()> {
        self.write_json(TYPES_FILE, types)
    }

    fn load_nodes(&self) -> Result<NodeIndex> {
        self.read_json(NODES_FILE)
    }

    fn save_nodes(&self, nodes: &NodeIndex) -> Result<()> {
        self.write_json(NODES_FILE, nodes)
    }

    fn write_lock(&self) -> Result<Option<StoreLock>> {
        StoreLock::acquire(&self.root).map(Some)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
