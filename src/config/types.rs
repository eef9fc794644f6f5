//! Configuration type definitions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

// ============================================
// KEYMAP
// ============================================

/// One user keymap entry.
///
/// Either `preset` (dotted path such as `"vim.deleteLine"`) or `combo` must
/// be set. `action` names a callback the application provides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeymapEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo: Option<String>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Disabled entries stay registered but their action is skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<bool>,
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Inter-key window for sequences (default: 800)
    #[serde(default = "default_sequence_timeout_ms")]
    pub sequence_timeout_ms: u64,
    #[serde(default = "default_initial_scope")]
    pub initial_scope: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub keymap: Vec<KeymapEntry>,
}

fn default_sequence_timeout_ms() -> u64 {
    DEFAULT_SEQUENCE_TIMEOUT_MS
}
fn default_initial_scope() -> String {
    DEFAULT_INITIAL_SCOPE.to_string()
}
fn default_enabled() -> bool {
    DEFAULT_ENABLED
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sequence_timeout_ms: DEFAULT_SEQUENCE_TIMEOUT_MS,
            initial_scope: DEFAULT_INITIAL_SCOPE.to_string(),
            enabled: DEFAULT_ENABLED,
            keymap: Vec::new(),
        }
    }
}

impl Config {
    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }
}
