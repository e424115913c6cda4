//! Plan execution

use std::fs::create_dir_all;
use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};

use crate::discovery::MultifileGroup;
use crate::errors::{Error, Result, file_operation_error};

use super::atomic::{MoveOutcome, MoveStage, atomic_move, move_failure};
use super::lock::LockSet;
use super::plan::{RenameEntry, RenameOptions, RenamePlan, build_plan};

/// What a finished plan did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Completed moves in execution order
    pub completed: Vec<(PathBuf, PathBuf)>,
    /// How many of them had to copy across filesystems
    pub copied: usize,
}

impl ExecutionReport {
    pub fn moved(&self) -> usize {
        self.completed.len()
    }
}

/// Runs `plan`, one locked atomic move per file.
///
/// The plan is simulated first; a rejected simulation returns before any
/// file is touched. A failure part way through returns `MoveFailed` listing
/// the moves that had already completed.
pub fn execute_plan(plan: &RenamePlan, lock_timeout: Duration) -> Result<ExecutionReport> {
    let ordered = plan.simulate()?;
    let mut report = ExecutionReport::default();
    if ordered.is_empty() {
        info!("Nothing to rename for {}", plan.result());
        return Ok(report);
    }

    let directory = plan.result().directory();
    if !directory.exists() {
        create_dir_all(directory)
            .map_err(|e| file_operation_error(e, directory.to_path_buf(), "create directory"))?;
    }

    for entry in &ordered {
        match move_one(entry, lock_timeout) {
            Ok(outcome) => {
                info!("Renamed {entry}");
                if outcome == MoveOutcome::Copied {
                    report.copied += 1;
                }
                report
                    .completed
                    .push((entry.source.clone(), entry.target.clone()));
            }
            Err(err) => {
                error!("Stopped after {} of {} moves: {err}", report.moved(), ordered.len());
                for (from, to) in &report.completed {
                    error!("  completed: {} -> {}", from.display(), to.display());
                }
                return Err(with_completed(err, report.completed));
            }
        }
    }
    Ok(report)
}

fn move_one(entry: &RenameEntry, lock_timeout: Duration) -> Result<MoveOutcome> {
    let _locks = LockSet::acquire(&[&entry.source, &entry.target], lock_timeout).map_err(|e| {
        warn!("Could not lock {entry}: {e}");
        move_failure(&entry.source, &entry.target, MoveStage::Lock, e)
    })?;

    // Another process may have moved the file since the simulation ran.
    if let Err(e) = entry.source.symlink_metadata() {
        return Err(move_failure(
            &entry.source,
            &entry.target,
            MoveStage::Verify,
            file_operation_error(e, entry.source.clone(), "find"),
        ));
    }
    atomic_move(&entry.source, &entry.target)
}

fn with_completed(err: Error, done: Vec<(PathBuf, PathBuf)>) -> Error {
    match err {
        Error::MoveFailed {
            from,
            to,
            stage,
            cause,
            ..
        } => Error::MoveFailed {
            from,
            to,
            stage,
            completed: done,
            cause,
        },
        other => other,
    }
}

/// Plans, simulates and executes the renaming of `group`, returning the renamed group
pub fn rename_group(
    group: &MultifileGroup,
    options: &RenameOptions,
    lock_timeout: Duration,
) -> Result<MultifileGroup> {
    let plan = build_plan(group, options)?;
    execute_plan(&plan, lock_timeout)?;
    Ok(plan.into_result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::LazyIndexableView;
    use crate::rename::PathLock;
    use std::fs::{read_dir, write};
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_millis(50);

    fn names_in(directory: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = read_dir(directory)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn group_of(directory: &std::path::Path, tokens: &[&str]) -> MultifileGroup {
        for token in tokens {
            write(directory.join(format!("part{token}.txt")), token).unwrap();
        }
        MultifileGroup::new(
            directory,
            "part",
            "",
            LazyIndexableView::from_values(tokens.iter().copied()),
            "",
            ".txt",
        )
    }

    #[test]
    fn test_shift_by_one_within_the_same_numbers() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let group = group_of(temp_dir.path(), &["1", "2", "3"]);
        let naming = LazyIndexableView::from_values(["2", "3", "4"]);

        let renamed = rename_group(&group, &RenameOptions::builder(naming).build(), TIMEOUT)
            .unwrap();

        assert_eq!(names_in(temp_dir.path()), vec!["part2.txt", "part3.txt", "part4.txt"]);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("part4.txt")).unwrap(),
            "3"
        );
        assert_eq!(renamed.tokens().unwrap(), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_shift_down_runs_forward() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let group = group_of(temp_dir.path(), &["2", "3", "4"]);
        let naming = LazyIndexableView::from_values(["1", "2", "3"]);

        rename_group(&group, &RenameOptions::builder(naming).build(), TIMEOUT).unwrap();
        assert_eq!(names_in(temp_dir.path()), vec!["part1.txt", "part2.txt", "part3.txt"]);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("part1.txt")).unwrap(),
            "2"
        );
    }

    #[test]
    fn test_lock_contention_reports_completed_moves() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let group = group_of(temp_dir.path(), &["1", "2"]);
        let naming = LazyIndexableView::from_values(["a", "b"]);
        let _held = PathLock::acquire(&temp_dir.path().join("part2.txt"), TIMEOUT).unwrap();

        let err = rename_group(&group, &RenameOptions::builder(naming).build(), TIMEOUT)
            .unwrap_err();
        match err {
            Error::MoveFailed {
                stage, completed, ..
            } => {
                assert_eq!(stage, MoveStage::Lock);
                assert_eq!(completed.len(), 1);
                assert!(completed[0].1.ends_with("parta.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(temp_dir.path().join("part2.txt").exists());
    }

    #[test]
    fn test_identity_plan_does_nothing() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let group = group_of(temp_dir.path(), &["1", "2"]);
        let naming = LazyIndexableView::from_values(["1", "2"]);

        let plan = build_plan(&group, &RenameOptions::builder(naming).build()).unwrap();
        let report = execute_plan(&plan, TIMEOUT).unwrap();
        assert_eq!(report.moved(), 0);
        assert_eq!(names_in(temp_dir.path()), vec!["part1.txt", "part2.txt"]);
    }
}
