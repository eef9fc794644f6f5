//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Inter-key window for multi-key sequences, in milliseconds
pub const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 800;

/// Scope active when an engine is created
pub const DEFAULT_INITIAL_SCOPE: &str = crate::hotkeys::GLOBAL_SCOPE;

/// Engines start accepting events unless the config says otherwise
pub const DEFAULT_ENABLED: bool = true;

/// Config file read by `load_config`
pub const DEFAULT_CONFIG_PATH: &str = "~/.hotkey-engine/config.json";
