//! Configuration module
//!
//! This module contains components for loading and validating configuration.

mod loader;
mod model;

pub use loader::{default_config_path, load_config, load_config_from_str, read_or_default};
pub use model::{Config, FilterConfig, OutputConfig, WindowConfig, expand_path};
