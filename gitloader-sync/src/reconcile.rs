//! Content reconciliation — make the scratch checkout hold the source folder.
//!
//! ## Steps
//!
//! 1. Containment guard: refuse a source that lives inside the scratch
//!    directory.
//! 2. Replace mode only: delete every top-level entry except `.git`.
//! 3. Copy: merge the source tree over the checkout. Existing files are
//!    overwritten, files missing from the source are kept. Symlinks are
//!    recreated, not followed. File permissions and all timestamps are carried
//!    over. Directory modes are not: git does not track them, and a
//!    read-only directory would make the checkout undeletable.
//!
//! Nothing here is transactional. A failure leaves a partially populated
//! checkout behind, which the caller discards with its staging area.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use walkdir::WalkDir;

use gitloader_core::{SyncMode, SyncPhase};

use crate::error::{io_err, SyncError};

/// Name of the VCS metadata directory that is never deleted or copied.
pub const METADATA_DIR: &str = ".git";

/// Counts of what one reconciliation touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub removed: usize,
    pub files_copied: usize,
    pub links_copied: usize,
    pub dirs_created: usize,
}

/// Run all reconciliation steps for `mode`.
///
/// `enter` is called with [`SyncPhase::Replacing`] (replace mode only) and
/// [`SyncPhase::Copying`] as each step starts.
pub fn reconcile<F>(
    source: &Path,
    staging: &Path,
    mode: SyncMode,
    mut enter: F,
) -> Result<ReconcileReport, SyncError>
where
    F: FnMut(SyncPhase),
{
    let (source, staging) = check_containment(source, staging)?;
    let mut report = ReconcileReport::default();
    if mode == SyncMode::Replace {
        enter(SyncPhase::Replacing);
        report.removed = clear_tracked(&staging)?;
    }
    enter(SyncPhase::Copying);
    copy_contents(&source, &staging, &mut report)?;
    Ok(report)
}

/// Canonicalize both paths and fail if `source` is inside `staging`.
///
/// Returns the canonical `(source, staging)` pair for the later steps.
pub fn check_containment(source: &Path, staging: &Path) -> Result<(PathBuf, PathBuf), SyncError> {
    let source = fs::canonicalize(source).map_err(|e| io_err(source, e))?;
    let staging = fs::canonicalize(staging).map_err(|e| io_err(staging, e))?;
    if source.starts_with(&staging) {
        return Err(SyncError::NestedSource {
            source_dir: source,
            staging,
        });
    }
    Ok((source, staging))
}

/// Delete every top-level entry of `staging` except [`METADATA_DIR`].
///
/// Returns the number of entries removed.
pub fn clear_tracked(staging: &Path) -> Result<usize, SyncError> {
    let mut removed = 0;
    for entry in fs::read_dir(staging).map_err(|e| io_err(staging, e))? {
        let entry = entry.map_err(|e| io_err(staging, e))?;
        if entry.file_name() == METADATA_DIR {
            continue;
        }
        remove_entry(&entry.path())?;
        removed += 1;
    }
    tracing::debug!(removed, staging = %staging.display(), "cleared tracked entries");
    Ok(removed)
}

/// Merge the contents of `source` into `staging`.
///
/// `source`'s own `.git` directory is skipped, and so is `staging` itself
/// when it lives somewhere under `source`.
pub fn copy_contents(
    source: &Path,
    staging: &Path,
    report: &mut ReconcileReport,
) -> Result<(), SyncError> {
    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let top_level_metadata = entry.depth() == 1 && entry.file_name() == METADATA_DIR;
            !top_level_metadata && entry.path() != staging
        });

    // Directory times are applied after the walk; writing children would
    // bump them again.
    let mut copied_dirs = Vec::new();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
            io_err(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| SyncError::Unexpected(format!("walk escaped source root: {e}")))?;
        let dest = staging.join(relative);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest)?;
            report.links_copied += 1;
        } else if file_type.is_dir() {
            if ensure_dir(&dest)? {
                report.dirs_created += 1;
            }
            copied_dirs.push((entry.path().to_path_buf(), dest));
        } else {
            copy_file(entry.path(), &dest)?;
            report.files_copied += 1;
        }
    }

    for (src, dest) in copied_dirs.iter().rev() {
        copy_times(src, dest)?;
    }

    tracing::debug!(
        files = report.files_copied,
        links = report.links_copied,
        dirs = report.dirs_created,
        "copied source contents",
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Remove a file, symlink, or directory tree without following links.
fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let meta = fs::symlink_metadata(path).map_err(|e| io_err(path, e))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| io_err(path, e))
}

/// Clear whatever occupies `dest` unless it is a real directory.
fn clear_non_dir(dest: &Path) -> Result<(), SyncError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => fs::remove_file(dest).map_err(|e| io_err(dest, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(dest, e)),
    }
}

/// Clear whatever occupies `dest` so a file or link can be written there.
fn clear_slot(dest: &Path) -> Result<(), SyncError> {
    match fs::symlink_metadata(dest) {
        Ok(_) => remove_entry(dest),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(dest, e)),
    }
}

/// Make `dest` a directory. Returns `true` if it had to be created.
fn ensure_dir(dest: &Path) -> Result<bool, SyncError> {
    clear_non_dir(dest)?;
    if dest.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dest).map_err(|e| io_err(dest, e))?;
    Ok(true)
}

fn copy_file(src: &Path, dest: &Path) -> Result<(), SyncError> {
    // Never write through an existing link: it may point outside the checkout.
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => remove_entry(dest)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(dest, e)),
    }
    // fs::copy carries permission bits over.
    fs::copy(src, dest).map_err(|e| io_err(src, e))?;
    copy_times(src, dest)
}

fn copy_symlink(src: &Path, dest: &Path) -> Result<(), SyncError> {
    let target = fs::read_link(src).map_err(|e| io_err(src, e))?;
    clear_slot(dest)?;
    make_symlink(&target, src, dest)?;
    if let Ok(meta) = fs::symlink_metadata(src) {
        let mtime = FileTime::from_last_modification_time(&meta);
        let atime = FileTime::from_last_access_time(&meta);
        if let Err(err) = filetime::set_symlink_file_times(dest, atime, mtime) {
            tracing::debug!(path = %dest.display(), error = %err, "could not set link times");
        }
    }
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, _src: &Path, dest: &Path) -> Result<(), SyncError> {
    std::os::unix::fs::symlink(target, dest).map_err(|e| io_err(dest, e))
}

#[cfg(windows)]
fn make_symlink(target: &Path, src: &Path, dest: &Path) -> Result<(), SyncError> {
    let points_to_dir = fs::metadata(src).map(|m| m.is_dir()).unwrap_or(false);
    let result = if points_to_dir {
        std::os::windows::fs::symlink_dir(target, dest)
    } else {
        std::os::windows::fs::symlink_file(target, dest)
    };
    result.map_err(|e| io_err(dest, e))
}

fn copy_times(src: &Path, dest: &Path) -> Result<(), SyncError> {
    let meta = fs::metadata(src).map_err(|e| io_err(src, e))?;
    let mtime = FileTime::from_last_modification_time(&meta);
    let atime = FileTime::from_last_access_time(&meta);
    filetime::set_file_times(dest, atime, mtime).map_err(|e| io_err(dest, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
