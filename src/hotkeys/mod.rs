//! Keyboard shortcut dispatch.
//!
//! This module provides:
//! - Combo parsing and canonical formatting (`ctrl+shift+k`)
//! - Priority- and scope-aware matching of live key events
//! - Multi-key sequences with an inter-key timeout (`g g`, `: w q`)
//! - A middleware chain that can veto handlers
//! - Named groups, a preset catalog and declarative mounting
//!
//! # Architecture
//!
//! [`HotkeyEngine`] owns everything. Parsing, matching and the sequence
//! buffer are plain functions over values, so the engine itself is a thin
//! orchestrator. The host delivers events through [`HotkeyEngine::dispatch`]
//! and passes the current [`Instant`](std::time::Instant) explicitly.
//!
//! # Example
//!
//! ```ignore
//! use hotkey_engine::hotkeys::{HotkeyEngine, KeyEvent, VimPreset, Handler};
//!
//! let mut engine = HotkeyEngine::new();
//! engine.on("ctrl+s").describe("Save").run(|| save()).register(&mut engine)?;
//! engine.register_preset(VimPreset::DeleteLine, Handler::from_action(|| delete_line()))?;
//!
//! let mut event = KeyEvent::new("s").with_ctrl();
//! engine.dispatch_keydown(&mut event, Instant::now())?;
//! assert!(event.default_prevented());
//! ```

mod adapter;
mod binding;
mod builder;
mod combo;
mod engine;
mod event;
mod matcher;
mod presets;
mod registry;
mod sequence;


#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;

pub use adapter::{Action, ActionTable, HotkeySpec, MountedHotkeys};
pub use binding::{
    Binding, BindingId, Condition, Handled, Handler, HotkeyContext, HotkeyInfo, IntoHandled,
    Metadata, PreventDefault, GLOBAL_SCOPE, GROUP_METADATA_KEY,
};
pub use builder::HotkeyBuilder;
pub use combo::{event_token, normalize_key, normalize_sequence, Combo, Modifiers};
pub use engine::{BatchRegistration, Dispatch, HotkeyEngine, MiddlewareId, Triggered};
pub use event::{ElementId, EventHost, EventType, KeyEvent, ListenerTarget, NullHost};
pub use matcher::{find_matches, top_match};
pub use presets::{AppPreset, Preset, PresetSpec, VimPreset};
pub use registry::{Group, HotkeyStats};
pub use sequence::{effective_window, find_sequence_match, sequence_matches, SequenceState};
