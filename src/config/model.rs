//! Configuration data structures
//!
//! This module contains the data structures for configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use shellexpand::full;

use crate::constants::{DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_OUTPUT_EXAMPLE};
use crate::discovery::{AffixGrammar, DEFAULT_KEYWORDS, FileFilter, SearchWindow};
use crate::naming::NamingCatalog;
use crate::rename::{RenameMode, RenameOptions};

/// Configuration of the renumbering tool
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Catalog positions a group's first file may have
    pub search_window: WindowConfig,
    /// How long to wait for an advisory lock before giving up
    pub lock_timeout_ms: u64,
    /// Words recognised between a base name and its number, such as `ep` or `part`
    pub keywords: Vec<String>,
    pub output: OutputConfig,
    pub filter: FilterConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub min: i64,
    pub max: i64,
}

/// How new names are produced
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// First token of the new numbering; its style is continued for the whole group
    pub example: String,
    /// Text placed in front of the new number
    pub separator: String,
    pub mode: RenameMode,
    /// Directory receiving the renamed files, the group's own directory if unset
    pub directory: Option<String>,
}

/// Which files of a directory are considered
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub glob: Option<String>,
    pub include_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search_window: WindowConfig::default(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            output: OutputConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        let window = SearchWindow::default();
        WindowConfig {
            min: window.min(),
            max: window.max(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            example: DEFAULT_OUTPUT_EXAMPLE.to_string(),
            separator: String::new(),
            mode: RenameMode::default(),
            directory: None,
        }
    }
}

/// Expands `~` and environment variables in a configured path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    full(path)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| anyhow!("Failed to expand path '{}': {}", path, e))
}

impl Config {
    /// Validates the configuration
    ///
    /// # Errors
    /// Returns an error with a detailed message if
    /// - the search window is inverted or negative
    /// - the lock timeout is zero
    /// - no keywords are given, or one of them is empty
    /// - the output example is not rendered by any naming convention
    /// - the glob pattern or the output directory cannot be used
    pub fn validate(&self) -> Result<()> {
        self.window()?;

        if self.lock_timeout_ms == 0 {
            return Err(anyhow!(
                "lock_timeout_ms must be greater than zero. Locks are never waited for indefinitely."
            ));
        }

        if self.keywords.is_empty() {
            return Err(anyhow!(
                "No keywords specified in configuration. Remove the field to use the defaults."
            ));
        }
        if let Some(index) = self.keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(anyhow!("Keyword at index {} is empty", index));
        }
        self.affixes()?;

        NamingCatalog::standard()
            .select_by_example(&self.output.example)
            .map_err(|e| anyhow!("Invalid output example: {}", e))?;

        self.file_filter()?;
        self.output_directory()?;
        Ok(())
    }

    pub fn window(&self) -> Result<SearchWindow> {
        SearchWindow::new(self.search_window.min, self.search_window.max)
            .map_err(|e| anyhow!("Invalid search_window: {}", e))
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn affixes(&self) -> Result<AffixGrammar> {
        AffixGrammar::new(self.keywords.iter().map(|k| k.trim()))
            .map_err(|e| anyhow!("Invalid keywords: {}", e))
    }

    pub fn file_filter(&self) -> Result<FileFilter> {
        FileFilter::new(self.filter.glob.as_deref(), self.filter.include_hidden)
            .map_err(|e| anyhow!("Invalid filter: {}", e))
    }

    /// The output directory with `~` and variables expanded
    pub fn output_directory(&self) -> Result<Option<PathBuf>> {
        self.output.directory.as_deref().map(expand_path).transpose()
    }

    /// The rename options every new session starts from
    pub fn rename_options(&self, catalog: &NamingCatalog) -> Result<RenameOptions> {
        let naming = catalog
            .continue_from_example(&self.output.example)
            .map_err(|e| anyhow!("Invalid output example: {}", e))?;
        Ok(RenameOptions::builder(naming)
            .pre_part(self.output.separator.clone())
            .output_dir(self.output_directory()?)
            .mode(self.output.mode)
            .build())
    }
}
