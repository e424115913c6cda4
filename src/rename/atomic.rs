//! Atomic file moves
//!
//! A move is a plain rename when source and target share a filesystem. When
//! they do not, the file is copied into a temporary beside the target,
//! published under the final name with a no-clobber rename and only then
//! removed from its source. Either the original or the complete new file is
//! visible at every instant.

use std::fmt;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use fs_extra::file::{CopyOptions, copy};
use log::{debug, warn};
use tempfile::Builder;

use crate::constants::STAGING_SUFFIX;
use crate::errors::{Error, Result, file_operation_error};

#[cfg(unix)]
const CROSS_DEVICE_OS_ERROR: i32 = 18; // EXDEV
#[cfg(windows)]
const CROSS_DEVICE_OS_ERROR: i32 = 17; // ERROR_NOT_SAME_DEVICE
#[cfg(not(any(unix, windows)))]
const CROSS_DEVICE_OS_ERROR: i32 = -1;

/// The step of a single move that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStage {
    Lock,
    Verify,
    Rename,
    Copy,
    Publish,
    RemoveSource,
}

impl fmt::Display for MoveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            MoveStage::Lock => "locking",
            MoveStage::Verify => "verifying",
            MoveStage::Rename => "renaming",
            MoveStage::Copy => "copying across filesystems",
            MoveStage::Publish => "publishing the copy",
            MoveStage::RemoveSource => "removing the source",
        };
        f.write_str(stage)
    }
}

/// How a successful move was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Renamed,
    Copied,
}

pub(crate) fn move_failure(source: &Path, target: &Path, stage: MoveStage, cause: Error) -> Error {
    Error::MoveFailed {
        from: source.to_path_buf(),
        to: target.to_path_buf(),
        stage,
        completed: Vec::new(),
        cause: Box::new(cause),
    }
}

fn is_cross_device(error: &io::Error) -> bool {
    error.kind() == ErrorKind::CrossesDevices || error.raw_os_error() == Some(CROSS_DEVICE_OS_ERROR)
}

/// Moves `source` to `target` without ever exposing a partial target.
///
/// # Errors
/// * `MoveFailed` at `Verify` if `target` already exists
/// * `MoveFailed` at the stage that failed otherwise; the cause carries the OS error
pub fn atomic_move(source: &Path, target: &Path) -> Result<MoveOutcome> {
    atomic_move_with(source, target, |from, to| fs::rename(from, to))
}

/// [`atomic_move`] with a caller-supplied same-filesystem rename primitive
pub fn atomic_move_with<F>(source: &Path, target: &Path, mut rename: F) -> Result<MoveOutcome>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    if target.symlink_metadata().is_ok() {
        let err = io::Error::new(ErrorKind::AlreadyExists, "target already exists");
        return Err(move_failure(
            source,
            target,
            MoveStage::Verify,
            file_operation_error(err, target.to_path_buf(), "replace"),
        ));
    }

    match rename(source, target) {
        Ok(()) => Ok(MoveOutcome::Renamed),
        Err(e) if is_cross_device(&e) => {
            debug!(
                "{} and {} are on different filesystems, copying instead",
                source.display(),
                target.display()
            );
            copy_across(source, target)?;
            Ok(MoveOutcome::Copied)
        }
        Err(e) => Err(move_failure(
            source,
            target,
            MoveStage::Rename,
            file_operation_error(e, source.to_path_buf(), "rename"),
        )),
    }
}

fn copy_across(source: &Path, target: &Path) -> Result<()> {
    let directory: PathBuf = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Dropping the staged file before it is persisted deletes it.
    let staged = Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(STAGING_SUFFIX)
        .tempfile_in(&directory)
        .map_err(|e| {
            move_failure(
                source,
                target,
                MoveStage::Copy,
                file_operation_error(e, directory.clone(), "stage a copy in"),
            )
        })?;

    let mut options = CopyOptions::new();
    options.overwrite = true;
    copy(source, staged.path(), &options).map_err(|e| {
        move_failure(
            source,
            target,
            MoveStage::Copy,
            file_operation_error(io::Error::other(e), source.to_path_buf(), "copy"),
        )
    })?;
    staged.as_file().sync_all().map_err(|e| {
        move_failure(
            source,
            target,
            MoveStage::Copy,
            file_operation_error(e, staged.path().to_path_buf(), "sync"),
        )
    })?;

    staged.persist_noclobber(target).map_err(|e| {
        move_failure(
            source,
            target,
            MoveStage::Publish,
            file_operation_error(e.error, target.to_path_buf(), "publish"),
        )
    })?;

    fs::remove_file(source).map_err(|e| {
        warn!(
            "Copied {} to {} but could not remove the source",
            source.display(),
            target.display()
        );
        move_failure(
            source,
            target,
            MoveStage::RemoveSource,
            file_operation_error(e, source.to_path_buf(), "remove"),
        )
    })
}
