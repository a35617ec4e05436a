//! Exclusive writer lock for a file-backed store.
//!
//! Every committing operation holds this lock from the moment it reloads the
//! records until the new records are renamed into place, so two processes can
//! never interleave a read-check-write cycle on the same data directory.
//!
//! - `<data_dir>/.lock` - Lock file with OS-level exclusive lock
//!
//! Acquisition is non-blocking: a second writer fails fast with a conflict
//! instead of waiting. The lock is released on drop.

use crate::error::{DimError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".lock";

#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    file: Option<File>,
}

impl StoreLock {
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOCK_FILE);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(DimError::conflict(
                format!("Store at {} is locked by another writer", data_dir.display()),
            )),
            Err(e) => Err(DimError::Io(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
