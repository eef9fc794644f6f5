//! Configuration loading from file system

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;
use crate::error::ResultExt;

/// Load configuration from ~/.hotkey-engine/config.json
///
/// Returns Config::default() if the file is missing or unreadable.
pub fn load_config() -> Config {
    let config_path = PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref());
    load_config_from(&config_path)
}

/// Load configuration from an explicit path, falling back to defaults.
#[instrument(name = "load_config", skip(path), fields(path = %path.display()))]
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let Some(contents) = fs::read_to_string(path).warn_on_err() else {
        return Config::default();
    };

    match serde_json::from_str::<Config>(&contents) {
        Ok(config) => {
            info!(entries = config.keymap.len(), "Successfully loaded config");
            config
        }
        Err(e) => {
            let hint = if e.to_string().contains("missing field `action`") {
                "\n\nHint: every keymap entry needs an 'action' naming an application callback, e.g.\n\
                { \"preset\": \"save\", \"action\": \"saveDocument\" }"
            } else {
                ""
            };
            warn!(error = %e, hint = %hint, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}
