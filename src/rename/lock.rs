//! Advisory path locks
//!
//! A lock on a path is a zero-byte marker file `.<name>.lock` created beside
//! it with exclusive-create semantics. Cooperating processes that take the
//! same markers never move the same file at the same time. Markers are
//! removed when the guard is dropped.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{trace, warn};

use crate::constants::{LOCK_RETRY_INTERVAL_MS, LOCK_SUFFIX};
use crate::errors::{Result, file_operation_error, lock_unavailable_error, path_operation_error};
use crate::utils::normalize_path;

/// A held lock on one path
#[derive(Debug)]
pub struct PathLock {
    path: PathBuf,
    marker: PathBuf,
}

impl PathLock {
    /// Marker file guarding `path`, derived from its absolute normalised form
    pub fn marker_for(path: &Path) -> Result<PathBuf> {
        let normalized = normalize_path(path);
        let name = normalized
            .file_name()
            .ok_or_else(|| path_operation_error(normalized.clone(), "lock"))?
            .to_string_lossy()
            .into_owned();
        Ok(normalized.with_file_name(format!(".{name}{LOCK_SUFFIX}")))
    }

    /// Takes the lock on `path`, retrying until `timeout` has passed.
    ///
    /// # Errors
    /// * `LockUnavailable` if another holder keeps the marker for the whole timeout
    /// * `FileOperation` if the marker cannot be created for any other reason
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let marker = PathLock::marker_for(path)?;
        let deadline = Instant::now() + timeout;
        let retry = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&marker) {
                Ok(_) => {
                    trace!("Locked {}", path.display());
                    return Ok(PathLock {
                        path: normalize_path(path),
                        marker,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(lock_unavailable_error(normalize_path(path), timeout));
                    }
                    sleep(retry.min(deadline - now));
                }
                Err(e) => return Err(file_operation_error(e, marker, "create lock marker")),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.marker) {
            warn!("Failed to release lock {}: {e}", self.marker.display());
        } else {
            trace!("Unlocked {}", self.path.display());
        }
    }
}

/// Locks on every path of one operation, released together
#[derive(Debug)]
pub struct LockSet {
    locks: Vec<PathLock>,
}

impl LockSet {
    /// Locks all `paths` in a fixed order. If any lock cannot be taken, the
    /// ones already held are released before the error is returned.
    pub fn acquire<P: AsRef<Path>>(paths: &[P], timeout: Duration) -> Result<Self> {
        let mut normalized: Vec<PathBuf> =
            paths.iter().map(|p| normalize_path(p.as_ref())).collect();
        normalized.sort();
        normalized.dedup();

        let mut locks = Vec::with_capacity(normalized.len());
        for path in &normalized {
            locks.push(PathLock::acquire(path, timeout)?);
        }
        Ok(LockSet { locks })
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
