//! Renumbering of numbered file series
//!
//! Finds runs of files in a directory that differ only by a consecutive
//! number (`clip-1.mp4`, `clip-2.mp4`, ...) and renames them to a new
//! numbering convention with locked, atomic moves.

pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod naming;
pub mod range;
pub mod rename;
mod utils;
pub mod workflow;

pub mod prelude {
    pub use crate::discovery::{MultifileGroup, MultifileMatcher, SearchWindow, scan_directory};
    pub use crate::errors::{
        directory_not_found_error, file_operation_error, generic_error, glob_pattern_error,
        index_out_of_range_error, invalid_filename_error, invalid_search_window_error,
        lock_unavailable_error, no_matching_convention_error, partial_range_mismatch_error,
        path_operation_error, pattern_matching_error, simulation_failed_error,
    };
    pub use crate::errors::{Error, OutOfRangeReason, Result};
    pub use crate::logging::{LogLevel, format_message, init_logger};
    pub use crate::naming::NamingCatalog;
    pub use crate::range::{LazyIndexableView, RangeDescriptor};
    pub use crate::rename::{RenameOptions, atomic_move, build_plan, execute_plan, rename_group};
}
