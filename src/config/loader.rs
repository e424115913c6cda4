//! Configuration loading functionality
//!
//! This module contains functions for locating, loading and validating configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::{debug, info};
use serde_yaml::from_str;

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::errors::config_parsing_error;
use crate::utils::find_project_folder;

use super::model::Config;

/// Loads a configuration from a file
///
/// # Errors
/// Returns an error if the file cannot be read or if the configuration is invalid
pub fn load_config(file: &Path) -> Result<Config> {
    let file_content = fs::read(file).map_err(|e| {
        anyhow!(
            "Failed to read configuration file {}: {}",
            file.display(),
            e
        )
    })?;

    let content_str = String::from_utf8(file_content).map_err(|e| {
        anyhow!(
            "Configuration file {} contains invalid UTF-8 characters: {}",
            file.display(),
            e
        )
    })?;

    let config = load_config_from_str(&content_str)
        .map_err(|e| anyhow!("Configuration file {}: {}", file.display(), e))?;
    debug!("Loaded configuration from {}", file.display());
    Ok(config)
}

/// Parses and validates a configuration held in memory
///
/// An empty document yields the defaults.
pub fn load_config_from_str(content: &str) -> Result<Config> {
    let config: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        from_str(content).map_err(|e| {
            let detail = format!("{e}\nPlease check the YAML syntax.");
            config_parsing_error(e, &detail)
        })?
    };

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Path of the configuration file in the standard configuration directory
///
/// # Errors
/// * Returns an error if the configuration directory cannot be determined or created
pub fn default_config_path() -> Result<PathBuf> {
    let folder = find_project_folder()?;
    Ok(folder.config_dir().join(DEFAULT_CONFIG_FILE))
}

/// Loads the configuration from `config`, or from the standard location if
/// no path is given. A file that does not exist yields the defaults.
///
/// # Errors
/// Returns an error if an existing file cannot be read or is invalid
pub fn read_or_default(config: Option<&Path>) -> Result<Config> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if path.exists() {
        load_config(&path)
    } else {
        info!(
            "No configuration found at {}, using the defaults",
            path.display()
        );
        Ok(Config::default())
    }
}
