//! Workflow engine
//!
//! This module contains the engine that walks directories, discovers groups
//! and drives one rename session per group.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::config::Config;
use crate::discovery::{MultifileMatcher, collect_directories, scan_directory};
use crate::errors::Error;
use crate::naming::NamingCatalog;

use super::context::{PlannedOperation, WorkflowContext};
use super::session::{Command, RenameSession, SessionState};

/// Options for processing directories
#[derive(Debug, Clone, Default)]
pub struct ProcessingOptions {
    /// Directories to look for groups in
    pub directories: Vec<PathBuf>,
    /// Whether subdirectories are processed too
    pub recursive: bool,
    /// Whether plans are only simulated (true) or carried out (false)
    pub dry_run: bool,
}

/// Supplies the decision for each proposed rename
pub trait CommandSource {
    /// Returns the next command for `session`, which is still `Proposed`
    fn next_command(&mut self, session: &RenameSession<'_>) -> Result<Command>;
}

/// Confirms every valid proposal and skips the rest
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl CommandSource for AutoConfirm {
    fn next_command(&mut self, session: &RenameSession<'_>) -> Result<Command> {
        Ok(if session.plan().is_some() {
            Command::Confirm
        } else {
            Command::Skip
        })
    }
}

/// Processes the directories of `options`
///
/// This function orchestrates the workflow steps:
/// 1. List every directory and keep the files that pass the filter
/// 2. Find the multifile groups of each directory
/// 3. Propose a rename for each group and ask `commands` for a decision
/// 4. Carry out confirmed renames, or only simulate them in dry-run mode
///
/// # Errors
/// * Returns an error if the configuration cannot be applied, a directory
///   cannot be listed or `commands` fails. Failed renames are logged and
///   counted instead.
pub fn process_directories(
    config: &Config,
    options: &ProcessingOptions,
    commands: &mut dyn CommandSource,
) -> Result<WorkflowContext> {
    let catalog = NamingCatalog::standard();
    let matcher = MultifileMatcher::with_window(&catalog, config.window()?).affixes(config.affixes()?);
    let filter = config.file_filter()?;
    let defaults = config.rename_options(&catalog)?;
    let lock_timeout = config.lock_timeout();

    let mut context = WorkflowContext::new(options.dry_run);

    let mut directories = Vec::new();
    for root in &options.directories {
        directories.extend(collect_directories(root, options.recursive)?);
    }

    'directories: for directory in directories {
        context.increment_directories_scanned();
        let files = scan_directory(&directory, &filter)
            .with_context(|| format!("Failed to list {}", directory.display()))?;
        let groups = matcher
            .find_groups(&directory, &files)
            .with_context(|| format!("Failed to search {}", directory.display()))?;
        debug!(
            "Found {} groups among {} files in {}",
            groups.len(),
            files.len(),
            directory.display()
        );
        context.add_groups_found(groups.len());

        for group in groups {
            info!("Found {group}");
            let mut session = RenameSession::new(&catalog, group, defaults.clone());
            while !session.state().is_terminal() {
                let command = commands.next_command(&session)?;
                session.apply(command);
            }

            match session.state() {
                SessionState::Aborted => {
                    info!("Stopping at the user's request");
                    context.aborted = true;
                    break 'directories;
                }
                SessionState::Skipped => {
                    info!("Skipped {}", session.group());
                    context.increment_groups_skipped();
                }
                SessionState::Confirmed if options.dry_run => simulate(&session, &mut context),
                SessionState::Confirmed => {
                    let name = session.group().to_string();
                    match session.finish(lock_timeout) {
                        Ok(Some(renamed)) => {
                            info!("Renamed {name} to {}", renamed.group);
                            context.increment_groups_renamed();
                            context.add_files_moved(renamed.report.moved(), renamed.report.copied);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            if let Error::MoveFailed { completed, .. } = &e {
                                context.add_files_moved(completed.len(), 0);
                            }
                            error!("Failed to rename {name}: {e}");
                            context.increment_errors();
                        }
                    }
                }
                SessionState::Proposed => {}
            }
        }
    }

    info!(
        "Finished: {} groups found, {} renamed, {} skipped, {} files moved",
        context.stats.groups_found,
        context.stats.groups_renamed,
        context.stats.groups_skipped,
        context.stats.files_moved
    );
    Ok(context)
}

fn simulate(session: &RenameSession<'_>, context: &mut WorkflowContext) {
    let Some(plan) = session.plan() else {
        return;
    };
    match plan.simulate() {
        Ok(entries) => {
            for entry in entries {
                info!("Would rename {entry}");
                context.add_planned_operation(PlannedOperation {
                    source: entry.source,
                    destination: entry.target,
                    group: session.group().to_string(),
                });
            }
            context.increment_groups_renamed();
        }
        Err(e) => {
            warn!("Plan for {} would fail: {e}", session.group());
            context.increment_errors();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs::write;
    use tempfile::tempdir;

    struct Scripted(VecDeque<Command>);

    impl CommandSource for Scripted {
        fn next_command(&mut self, _session: &RenameSession<'_>) -> Result<Command> {
            Ok(self.0.pop_front().unwrap_or(Command::Skip))
        }
    }

    fn populate(directory: &std::path::Path, names: &[&str]) {
        for name in names {
            write(directory.join(name), name).unwrap();
        }
    }

    #[test]
    fn test_auto_confirm_renames_every_group() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        populate(temp_dir.path(), &["clip-1.mp4", "clip-2.mp4", "clip-3.mp4", "notes.txt"]);

        let options = ProcessingOptions {
            directories: vec![temp_dir.path().to_path_buf()],
            ..ProcessingOptions::default()
        };
        let context = process_directories(&Config::default(), &options, &mut AutoConfirm).unwrap();

        assert_eq!(context.stats.groups_found, 1);
        assert_eq!(context.stats.groups_renamed, 1);
        assert_eq!(context.stats.files_moved, 3);
        assert!(temp_dir.path().join("clip02.mp4").exists());
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        populate(temp_dir.path(), &["clip-1.mp4", "clip-2.mp4"]);

        let options = ProcessingOptions {
            directories: vec![temp_dir.path().to_path_buf()],
            dry_run: true,
            ..ProcessingOptions::default()
        };
        let context = process_directories(&Config::default(), &options, &mut AutoConfirm).unwrap();

        assert_eq!(context.planned_operations.len(), 2);
        assert!(context.planned_operations[0].destination.ends_with("clip01.mp4"));
        assert!(temp_dir.path().join("clip-1.mp4").exists());
        assert!(!temp_dir.path().join("clip01.mp4").exists());
    }

    #[test]
    fn test_quit_stops_the_run() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        populate(temp_dir.path(), &["a-1.txt", "a-2.txt", "b_x1.dat", "b_x2.dat"]);

        let options = ProcessingOptions {
            directories: vec![temp_dir.path().to_path_buf()],
            ..ProcessingOptions::default()
        };
        let mut commands = Scripted(VecDeque::from([Command::Quit]));
        let context = process_directories(&Config::default(), &options, &mut commands).unwrap();

        assert!(context.aborted);
        assert_eq!(context.stats.groups_found, 2);
        assert_eq!(context.stats.groups_renamed, 0);
        assert!(temp_dir.path().join("a-1.txt").exists());
    }
}
