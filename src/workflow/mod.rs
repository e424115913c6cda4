//! Workflow module
//!
//! This module contains the rename session state machine and the engine driving it.

mod context;
mod engine;
mod session;

pub use context::{PlannedOperation, WorkflowContext, WorkflowStats};
pub use engine::{AutoConfirm, CommandSource, ProcessingOptions, process_directories};
pub use session::{Command, RenameSession, RenamedGroup, SessionState};
