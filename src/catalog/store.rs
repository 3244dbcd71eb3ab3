//! Locked, atomic writes to the catalog file.
//!
//! Writers take an exclusive advisory lock on `<file>.lock` and replace the
//! catalog through a temp file in the same directory, so readers never see
//! a half-written document.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;

use super::resource::{Resource, ResourceFile};

/// Exclusive lock held for the lifetime of the guard
pub struct CatalogLock {
    file: File,
    path: PathBuf,
}

impl CatalogLock {
    /// Block until the lock for `target` is acquired
    pub fn acquire(target: &Path) -> Result<Self> {
        let path = lock_path(target);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire lock: {}", path.display()))?;

        Ok(Self { file, path })
    }
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

fn lock_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}

/// Write `content` to `path` atomically
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write temp file")?;
    tmp.flush().context("Failed to flush temp file")?;

    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

impl ResourceFile {
    /// Save the catalog under the write lock
    pub fn save(&self, path: &Path) -> Result<()> {
        let _lock = CatalogLock::acquire(path)?;
        write_atomic(path, &self.to_yaml()?)
    }
}

/// Append resources to the catalog, returning the new total.
///
/// The file is re-read under the lock so concurrent appends are not lost.
pub fn append_resources(path: &Path, new: Vec<Resource>) -> Result<usize> {
    let _lock = CatalogLock::acquire(path)?;

    let mut file = ResourceFile::load(path)?;
    file.resources.extend(new);
    write_atomic(path, &file.to_yaml()?)?;

    Ok(file.len())
}
