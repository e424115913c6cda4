//! Constants used throughout the application
//!
//! This module centralises the constants of the application to make
//! them easier to manage and update.

/// Qualifier string used for application identification
pub const QUALIFIER: &str = "com";

/// Organisation name used for application identification
pub const ORGANIZATION: &str = "Ondřej Vágner";

/// Application name used for identification
///
/// This names the per-user configuration directory.
pub const APPLICATION: &str = "renumber";

/// Default name of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "renumber.yaml";

/// Default output numbering example: two-digit, zero-padded, starting at one
pub const DEFAULT_OUTPUT_EXAMPLE: &str = "01";

/// Default time to wait for an advisory lock, in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2000;

/// Pause between two attempts to take an advisory lock, in milliseconds
pub const LOCK_RETRY_INTERVAL_MS: u64 = 25;

/// Suffix of advisory lock marker files
pub const LOCK_SUFFIX: &str = ".lock";

/// Suffix of temporary files staged during cross-filesystem moves
pub const STAGING_SUFFIX: &str = ".partial";

/// Help text for the config command-line option
pub const CONFIG_HELP: &str = "Read from a specific config file";

/// Help text for the dry-run command-line option
pub const DRY_RUN_HELP: &str = "Show the rename plans without moving any files";

/// Help text for the yes command-line option
pub const YES_HELP: &str = "Confirm every proposed rename without asking";

/// Help text for the verbose command-line option
pub const VERBOSE_HELP: &str = "Increase verbosity level (can be used multiple times)";

/// Help text for the quiet command-line option
pub const QUIET_HELP: &str = "Only print warnings and errors";

/// Help text for the log file command-line option
pub const LOG_FILE_HELP: &str = "Also write the log to this file";

/// Help text for the local logging command-line option
pub const LOCAL_LOGGING_HELP: &str =
    "Write the log file relative to the current directory instead of the config directory";

/// Help text for the recursive command-line option
pub const RECURSIVE_HELP: &str = "Also process every subdirectory";

/// Help text for the example command-line option
pub const EXAMPLE_HELP: &str = "First token of the output numbering, e.g. 01, 1, a or 001";

/// Help text for the output directory command-line option
pub const OUTPUT_DIR_HELP: &str = "Move renamed files into this directory";

/// Help text for the append command-line option
pub const APPEND_HELP: &str = "Place the new number at the end of the name";

/// Help text for the glob command-line option
pub const GLOB_HELP: &str = "Only consider files matching this glob pattern";

/// Help text for the search window options
pub const WINDOW_HELP: &str = "Catalog positions a group may start at";

/// Help text for the pause command-line option
pub const PAUSE_HELP: &str = "Wait for Enter before exiting when run in a console window";
