//! Renaming module
//!
//! This module contains rename planning, simulation, advisory locking and atomic moves.

mod atomic;
mod executor;
mod lock;
mod plan;

pub use atomic::{MoveOutcome, MoveStage, atomic_move, atomic_move_with};
pub use executor::{ExecutionReport, execute_plan, rename_group};
pub use lock::{LockSet, PathLock};
pub use plan::{
    PartialRange, RenameEntry, RenameMode, RenameOptions, RenameOptionsBuilder, RenamePlan,
    build_plan,
};
