//! Configuration module - Engine settings and user keymap
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.hotkey-engine/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, KeymapEntry)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_CONFIG_PATH, DEFAULT_SEQUENCE_TIMEOUT_MS};

pub use types::{Config, KeymapEntry};

pub use loader::{load_config, load_config_from};

#[cfg(test)]
pub use defaults::{DEFAULT_ENABLED, DEFAULT_INITIAL_SCOPE};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
