//! Scratch working copies.
//!
//! A [`StagingArea`] is removed when it is dropped, so every exit path of a
//! run releases it exactly once. Removal is best-effort: failures are logged
//! and swallowed.
//!
//! The fixed layout is guarded by an exclusive lock on a sibling
//! `<name>.lock` file, held for the life of the area. The lock is per open
//! file, so it serializes runs in separate processes and separate managers
//! alike.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use uuid::Uuid;

use crate::config::{StagingLayout, UNIQUE_SCRATCH_PREFIX};
use crate::error::{io_err, SyncError};

/// Hands out scratch directories according to a [`StagingLayout`].
#[derive(Debug, Clone)]
pub struct StagingManager {
    layout: StagingLayout,
}

impl StagingManager {
    pub fn new(layout: StagingLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StagingLayout {
        &self.layout
    }

    /// Create a fresh, empty scratch directory.
    ///
    /// With the fixed layout this blocks the calling thread until no other
    /// run holds the path, then removes whatever a crashed run left behind.
    pub fn acquire(&self) -> Result<StagingArea, SyncError> {
        match &self.layout {
            StagingLayout::Unique { root } => {
                let root = absolute(root)?;
                fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
                let path = root.join(format!("{UNIQUE_SCRATCH_PREFIX}{}", Uuid::new_v4().simple()));
                fs::create_dir(&path).map_err(|e| io_err(&path, e))?;
                Ok(StagingArea::new(path, None))
            }
            StagingLayout::Fixed { path } => {
                let path = absolute(path)?;
                let lease = lock_fixed(&path)?;
                if path.exists() {
                    tracing::info!(path = %path.display(), "removing stale scratch directory");
                    fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
                }
                fs::create_dir_all(&path).map_err(|e| io_err(&path, e))?;
                Ok(StagingArea::new(path, Some(lease)))
            }
        }
    }
}

/// Path of the lock file guarding the fixed scratch directory `path`.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

fn lock_fixed(path: &Path) -> Result<File, SyncError> {
    let lock = lock_path(path);
    if let Some(parent) = lock.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock)
        .map_err(|e| io_err(&lock, e))?;
    tracing::debug!(lock = %lock.display(), "waiting for scratch directory lock");
    FileExt::lock_exclusive(&file).map_err(|e| io_err(&lock, e))?;
    Ok(file)
}

/// An exclusively owned scratch directory, deleted on drop.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
    released: bool,
    // Closed, and so unlocked, after the directory is removed.
    _lease: Option<File>,
}

impl StagingArea {
    fn new(path: PathBuf, lease: Option<File>) -> Self {
        // Canonical so containment checks agree with canonicalized sources
        // (e.g. /var vs /private/var on macOS).
        let path = fs::canonicalize(&path).unwrap_or(path);
        tracing::debug!(path = %path.display(), "acquired scratch directory");
        Self {
            path,
            released: false,
            _lease: lease,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now instead of at end of scope.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "released scratch directory"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove scratch directory",
            ),
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        self.remove();
    }
}

fn absolute(path: &Path) -> Result<PathBuf, SyncError> {
    std::path::absolute(path).map_err(|e| io_err(path, e))
}
