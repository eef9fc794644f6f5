//! hotkey-engine - keyboard shortcut dispatch for interactive applications
//!
//! This library parses key combos, matches live key events against
//! registered bindings by priority and scope, tracks multi-key sequences,
//! and runs handlers through a vetoing middleware chain.

pub mod config;
pub mod error;
pub mod hotkeys;
pub mod logging;
pub mod replay;
