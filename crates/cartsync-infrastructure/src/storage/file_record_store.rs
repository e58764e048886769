//! File-backed record store with atomic writes.
//!
//! The record lives at `<dir>/<key>.json`. Writes go to a temporary file in
//! the same directory, are fsynced, then renamed over the target while an
//! exclusive lock on `<key>.lock` is held. The lock file is never removed, so
//! every writer contends on the same inode.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use cartsync_core::CartRecordStore;
use cartsync_core::error::{CartError, Result};

use crate::paths::CartsyncPaths;

pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    /// Store for `key` inside `dir`.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Store for `key` in the platform data directory.
    pub fn in_data_dir(key: &str) -> Result<Self> {
        let dir = CartsyncPaths::data_dir().map_err(|e| CartError::storage(e.to_string()))?;
        Ok(Self::new(dir, key))
    }

    /// Store at an explicit file path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| CartError::storage("Record path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| CartError::storage("Record path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

impl CartRecordStore for FileRecordStore {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn write(&self, raw: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let _lock = FileLock::acquire(&self.path)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(raw.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!("Wrote cart record to {}", self.path.display());
        Ok(())
    }
}

/// Exclusive lock on `<record>.lock`, released when the handle is dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| CartError::storage(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}
