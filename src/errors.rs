use glob::PatternError;
use regex::Error as RegexError;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::rename::MoveStage;

/// Why an index could not be resolved by a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRangeReason {
    /// The position was never a member of the selected range
    NotAMember,
    /// The position is inside the declared length, but the producer cannot render it
    OverPromised,
}

/// Custom error type for the renumber library
#[derive(Debug)]
pub enum Error {
    /// A range descriptor with a zero step
    InvalidStep,
    /// A position that does not resolve to an element
    IndexOutOfRange {
        index: i64,
        length: i64,
        reason: OutOfRangeReason,
    },
    /// A search window whose lower bound exceeds its upper bound
    InvalidSearchWindow { min: i64, max: i64 },
    /// No catalog entry renders the token at any position
    NoMatchingConvention { token: String },
    /// A partial selector that does not fit the group it is applied to
    PartialRangeMismatch { requested: String, available: String },
    /// Pre-flight simulation rejected the plan; nothing was touched
    SimulationFailed { path: PathBuf, reason: String },
    /// An advisory lock could not be taken in time
    LockUnavailable { path: PathBuf, timeout: Duration },
    /// A move failed part way through a batch
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        stage: MoveStage,
        completed: Vec<(PathBuf, PathBuf)>,
        cause: Box<Error>,
    },
    /// Error related to file operations
    FileOperation {
        source: io::Error,
        path: PathBuf,
        operation: String,
    },
    /// Error related to path operations
    PathOperation { path: PathBuf, operation: String },
    /// Error related to pattern matching
    PatternMatching { source: RegexError, pattern: String },
    /// Error related to glob pattern matching
    GlobPattern {
        source: PatternError,
        pattern: String,
    },
    /// Error related to configuration parsing
    ConfigParsing {
        source: Box<dyn StdError + Send + Sync>,
        detail: String,
    },
    /// Error when a filename is not valid Unicode
    InvalidFilename { path: PathBuf },
    /// Error when a directory is not found
    DirectoryNotFound { path: PathBuf },
    /// Generic error with a message
    Generic { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidStep => write!(f, "Range step cannot be zero"),
            Error::IndexOutOfRange {
                index,
                length,
                reason: OutOfRangeReason::NotAMember,
            } => write!(
                f,
                "Index {index} is out of range for a sequence of length {length}"
            ),
            Error::IndexOutOfRange {
                index,
                length,
                reason: OutOfRangeReason::OverPromised,
            } => write!(
                f,
                "Index {index} lies within the declared length {length}, but the sequence cannot produce it"
            ),
            Error::InvalidSearchWindow { min, max } => {
                write!(f, "Invalid search window: minimum {min} is greater than maximum {max}")
            }
            Error::NoMatchingConvention { token } => {
                write!(f, "No naming convention renders '{token}'")
            }
            Error::PartialRangeMismatch {
                requested,
                available,
            } => write!(
                f,
                "Partial range {requested} does not fit the group numbered {available}"
            ),
            Error::SimulationFailed { path, reason } => {
                write!(f, "Simulation failed for {}: {reason}", path.display())
            }
            Error::LockUnavailable { path, timeout } => write!(
                f,
                "Could not lock {} within {} ms",
                path.display(),
                timeout.as_millis()
            ),
            Error::MoveFailed {
                from,
                to,
                stage,
                completed,
                ..
            } => write!(
                f,
                "Failed to move {} to {} while {stage} ({} earlier moves completed)",
                from.display(),
                to.display(),
                completed.len()
            ),
            Error::FileOperation {
                path, operation, ..
            } => {
                write!(f, "Failed to {} file: {}", operation, path.display())
            }
            Error::PathOperation { path, operation } => {
                write!(f, "Failed to {} path: {}", operation, path.display())
            }
            Error::PatternMatching { pattern, .. } => {
                write!(f, "Invalid pattern: {pattern}")
            }
            Error::GlobPattern { pattern, .. } => {
                write!(f, "Invalid glob pattern: {pattern}")
            }
            Error::ConfigParsing { detail, .. } => {
                write!(f, "Configuration parsing error: {detail}")
            }
            Error::InvalidFilename { path } => {
                write!(f, "Filename is not valid unicode: {}", path.display())
            }
            Error::DirectoryNotFound { path } => {
                write!(f, "Directory not found: {}", path.display())
            }
            Error::Generic { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::MoveFailed { cause, .. } => Some(cause.as_ref()),
            Error::FileOperation { source, .. } => Some(source),
            Error::PatternMatching { source, .. } => Some(source),
            Error::GlobPattern { source, .. } => Some(source),
            Error::ConfigParsing { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl Error {
    /// The OS error kind behind this error, if it wraps one
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::FileOperation { source, .. } => Some(source.kind()),
            Error::MoveFailed { cause, .. } => cause.io_kind(),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::FileOperation {
            source: err,
            path: PathBuf::new(),
            operation: "perform operation on".to_string(),
        }
    }
}

impl From<RegexError> for Error {
    fn from(err: RegexError) -> Self {
        Error::PatternMatching {
            source: err,
            pattern: String::new(),
        }
    }
}

impl From<PatternError> for Error {
    fn from(err: PatternError) -> Self {
        Error::GlobPattern {
            source: err,
            pattern: String::new(),
        }
    }
}

/// Custom Result type for the renumber library
///
/// # Examples
/// ```
/// use renumber::prelude::{Result, generic_error};
///
/// fn example_function(ready: bool) -> Result<String> {
///     if ready {
///         Ok("success".to_string())
///     } else {
///         Err(generic_error("Something went wrong"))
///     }
/// }
/// # assert!(example_function(true).is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

pub fn invalid_step_error() -> Error {
    Error::InvalidStep
}

pub fn index_out_of_range_error(index: i64, length: i64, reason: OutOfRangeReason) -> Error {
    Error::IndexOutOfRange {
        index,
        length,
        reason,
    }
}

pub fn invalid_search_window_error(min: i64, max: i64) -> Error {
    Error::InvalidSearchWindow { min, max }
}

pub fn no_matching_convention_error(token: &str) -> Error {
    Error::NoMatchingConvention {
        token: token.to_string(),
    }
}

pub fn partial_range_mismatch_error(requested: &str, available: &str) -> Error {
    Error::PartialRangeMismatch {
        requested: requested.to_string(),
        available: available.to_string(),
    }
}

pub fn simulation_failed_error(path: PathBuf, reason: &str) -> Error {
    Error::SimulationFailed {
        path,
        reason: reason.to_string(),
    }
}

pub fn lock_unavailable_error(path: PathBuf, timeout: Duration) -> Error {
    Error::LockUnavailable { path, timeout }
}

/// Helper function to create a file operation error
pub fn file_operation_error(err: io::Error, path: PathBuf, operation: &str) -> Error {
    Error::FileOperation {
        source: err,
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create a path operation error
pub fn path_operation_error(path: PathBuf, operation: &str) -> Error {
    Error::PathOperation {
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create a pattern matching error
pub fn pattern_matching_error(err: RegexError, pattern: &str) -> Error {
    Error::PatternMatching {
        source: err,
        pattern: pattern.to_string(),
    }
}

/// Helper function to create a glob pattern error
pub fn glob_pattern_error(err: PatternError, pattern: &str) -> Error {
    Error::GlobPattern {
        source: err,
        pattern: pattern.to_string(),
    }
}

/// Helper function to create a config parsing error
pub fn config_parsing_error<E: StdError + Send + Sync + 'static>(err: E, detail: &str) -> Error {
    Error::ConfigParsing {
        source: Box::new(err),
        detail: detail.to_string(),
    }
}

/// Helper function to create an invalid filename error
pub fn invalid_filename_error(path: PathBuf) -> Error {
    Error::InvalidFilename { path }
}

/// Helper function to create a directory not found error
pub fn directory_not_found_error(path: PathBuf) -> Error {
    Error::DirectoryNotFound { path }
}

/// Helper function to create a generic error
pub fn generic_error(message: &str) -> Error {
    Error::Generic {
        message: message.to_string(),
    }
}
