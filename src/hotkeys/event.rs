//! Live keyboard events and the listener surface they arrive through.
//!
//! The engine never talks to a windowing system directly. A host (browser
//! bridge, terminal, test harness) implements [`EventHost`] to attach native
//! listeners and then forwards each native event into
//! [`HotkeyEngine::dispatch`](super::HotkeyEngine::dispatch) as a [`KeyEvent`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::combo::{normalize_key, Combo};

/// Keyboard event phase a binding listens to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    KeyDown,
    KeyUp,
    KeyPress,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::KeyPress => "keypress",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle for a host element a binding can be attached to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a native listener lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerTarget {
    /// The window-level listener.
    Global,
    Element(ElementId),
}

impl ListenerTarget {
    pub fn for_element(element: Option<&ElementId>) -> Self {
        match element {
            Some(id) => Self::Element(id.clone()),
            None => Self::Global,
        }
    }
}

impl fmt::Display for ListenerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("window"),
            Self::Element(id) => write!(f, "element:{}", id),
        }
    }
}

/// Native listener management, implemented by whatever delivers key events.
///
/// The engine guarantees `attach` is called at most once per
/// `(target, event_type)` pair until the matching `detach`.
pub trait EventHost {
    fn attach(&mut self, target: &ListenerTarget, event_type: EventType);
    fn detach(&mut self, target: &ListenerTarget, event_type: EventType);
}

/// Host with no native surface; events are fed to `dispatch` by the caller.
#[derive(Debug, Default)]
pub struct NullHost;

impl EventHost for NullHost {
    fn attach(&mut self, _target: &ListenerTarget, _event_type: EventType) {}
    fn detach(&mut self, _target: &ListenerTarget, _event_type: EventType) {}
}

/// A single keyboard event as seen by the engine.
///
/// `key` is the raw key name reported by the host (`"g"`, `"G"`, `"Escape"`,
/// `" "`); matching always goes through [`normalize_key`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(skip)]
    default_prevented: bool,
    #[serde(skip)]
    propagation_stopped: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Build the event a host would report for a combo such as `ctrl+s`.
    ///
    /// Shifted letters are reported upper-case, mirroring browsers.
    pub fn from_combo(combo: &str) -> Self {
        let parsed = Combo::parse(combo);
        let key = match parsed.key.as_str() {
            "space" => " ".to_string(),
            k if parsed.modifiers.shift && k.chars().count() == 1 => k.to_uppercase(),
            k => k.to_string(),
        };
        Self {
            key,
            ctrl: parsed.modifiers.ctrl,
            shift: parsed.modifiers.shift,
            alt: parsed.modifiers.alt,
            meta: parsed.modifiers.meta,
            ..Default::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn normalized_key(&self) -> String {
        normalize_key(&self.key)
    }

    /// True when the key itself is a modifier (`Control`, `Shift`, ...).
    pub fn is_modifier_key(&self) -> bool {
        matches!(
            self.key.to_lowercase().as_str(),
            "control" | "ctrl" | "shift" | "alt" | "meta" | "os" | "altgraph"
        )
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_combo_reports_upper_case_for_shifted_letters() {
        let event = KeyEvent::from_combo("shift+g");
        assert_eq!(event.key, "G");
        assert!(event.shift);
        assert_eq!(event.normalized_key(), "g");
    }

    #[test]
    fn from_combo_space_uses_literal_space() {
        let event = KeyEvent::from_combo("space");
        assert_eq!(event.key, " ");
        assert_eq!(event.normalized_key(), "space");
    }

    #[test]
    fn event_flags_start_cleared() {
        let mut event = KeyEvent::new("a");
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());
        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn modifier_keys_are_detected() {
        assert!(KeyEvent::new("Control").is_modifier_key());
        assert!(KeyEvent::new("Shift").is_modifier_key());
        assert!(!KeyEvent::new("s").is_modifier_key());
    }

    #[test]
    fn event_type_serializes_lowercase() {
        let json = serde_json::to_string(&EventType::KeyUp).unwrap();
        assert_eq!(json, "\"keyup\"");
    }
}
