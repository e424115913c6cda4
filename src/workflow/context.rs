//! Workflow context
//!
//! This module defines the state collected while the engine walks directories.

use std::path::PathBuf;

/// Represents a planned move for dry-run mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    /// The current path of the file
    pub source: PathBuf,
    /// The path the file would be moved to
    pub destination: PathBuf,
    /// The group the file belongs to, as displayed to the user
    pub group: String,
}

/// Context for the workflow
///
/// This struct contains the state shared across all directories of one run.
#[derive(Debug, Clone, Default)]
pub struct WorkflowContext {
    /// Whether plans are only simulated
    pub dry_run: bool,
    /// Statistics about the processing
    pub stats: WorkflowStats,
    /// Planned operations for dry-run mode
    pub planned_operations: Vec<PlannedOperation>,
    /// Set when the user quit before every group was handled
    pub aborted: bool,
}

/// Statistics about the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowStats {
    /// Number of directories listed
    pub directories_scanned: usize,
    /// Number of multifile groups discovered
    pub groups_found: usize,
    /// Number of groups renamed (or planned, in dry-run mode)
    pub groups_renamed: usize,
    /// Number of groups the user skipped
    pub groups_skipped: usize,
    /// Number of files moved
    pub files_moved: usize,
    /// Number of moves that had to copy across filesystems
    pub files_copied: usize,
    /// Number of errors
    pub errors: usize,
}

impl WorkflowContext {
    /// Creates a new workflow context
    ///
    /// # Arguments
    /// * `dry_run` - Whether to only simulate the renames (true) or carry them out (false)
    pub fn new(dry_run: bool) -> Self {
        WorkflowContext {
            dry_run,
            ..WorkflowContext::default()
        }
    }

    /// Adds a planned operation to the context
    pub fn add_planned_operation(&mut self, operation: PlannedOperation) {
        self.planned_operations.push(operation);
    }

    pub fn increment_directories_scanned(&mut self) {
        self.stats.directories_scanned += 1;
    }

    pub fn add_groups_found(&mut self, count: usize) {
        self.stats.groups_found += count;
    }

    pub fn increment_groups_renamed(&mut self) {
        self.stats.groups_renamed += 1;
    }

    pub fn increment_groups_skipped(&mut self) {
        self.stats.groups_skipped += 1;
    }

    pub fn add_files_moved(&mut self, moved: usize, copied: usize) {
        self.stats.files_moved += moved;
        self.stats.files_copied += copied;
    }

    /// Increments the number of errors
    pub fn increment_errors(&mut self) {
        self.stats.errors += 1;
    }
}
