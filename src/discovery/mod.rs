//! File discovery module
//!
//! This module contains components for listing directories and finding multifile groups.

mod affix;
mod group;
mod matcher;
mod scanner;

pub use affix::{AffixGrammar, DEFAULT_KEYWORDS};
pub use group::MultifileGroup;
pub use matcher::{MultifileMatcher, SearchWindow};
pub use scanner::{FileFilter, collect_directories, scan_directory};
