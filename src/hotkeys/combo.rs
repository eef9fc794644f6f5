//! Key-combo parsing and key-name normalization.
//!
//! This module provides:
//! - `Combo` - modifier flags plus a primary key, parsed from `ctrl+shift+k`
//! - `Modifiers` - ctrl/shift/alt/meta flags
//! - `normalize_key` - the single mapping used for combo text and live events
//! - `normalize_sequence` - canonical token form of a `g g` style sequence

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::event::KeyEvent;

/// Modifier keys held for a combo or an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn of_event(event: &KeyEvent) -> Self {
        Self {
            ctrl: event.ctrl,
            shift: event.shift,
            alt: event.alt,
            meta: event.meta,
        }
    }

    pub fn any(&self) -> bool {
        self.ctrl || self.shift || self.alt || self.meta
    }

    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// A parsed key combination.
///
/// `key` is empty when the text named only modifiers; such a combo never
/// matches anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combo {
    pub modifiers: Modifiers,
    pub key: String,
}

impl Combo {
    /// Parse combo text. Never fails: unknown tokens become the key.
    pub fn parse(s: &str) -> Self {
        let lowered = s.trim().to_lowercase();
        let mut modifiers = Modifiers::default();
        let mut key: Option<&str> = None;

        for part in lowered.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" => modifiers.alt = true,
                "meta" | "cmd" | "command" => modifiers.meta = true,
                other => {
                    // First non-modifier wins, like the listener tables in hosts.
                    if key.is_none() {
                        key = Some(other);
                    }
                }
            }
        }

        Self {
            modifiers,
            key: key.map(normalize_key).unwrap_or_default(),
        }
    }

    pub fn of_event(event: &KeyEvent) -> Self {
        Self {
            modifiers: Modifiers::of_event(event),
            key: event.normalized_key(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Exact chord comparison: every modifier flag and the key must agree.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.has_key()
            && self.modifiers == Modifiers::of_event(event)
            && self.key == event.normalized_key()
    }

    /// Serialize in the fixed order `ctrl+shift+alt+meta+key`.
    pub fn to_canonical_string(&self) -> String {
        self.join_parts(self.modifiers.shift)
    }

    /// Token for one step of a key sequence.
    ///
    /// Shift is kept only for letters, digits and named keys. For symbols
    /// the shifted character already carries it, so `(` typed as
    /// shift+9 stays `(`.
    pub fn chord_token(&self) -> String {
        let explicit_shift = self.modifiers.shift && shift_is_explicit(&self.key);
        self.join_parts(explicit_shift)
    }

    fn join_parts(&self, include_shift: bool) -> String {
        let mut parts: SmallVec<[&str; 5]> = SmallVec::new();
        if self.modifiers.ctrl {
            parts.push("ctrl");
        }
        if include_shift {
            parts.push("shift");
        }
        if self.modifiers.alt {
            parts.push("alt");
        }
        if self.modifiers.meta {
            parts.push("meta");
        }
        if self.has_key() {
            parts.push(&self.key);
        }
        parts.join("+")
    }

    /// Human label, e.g. `Ctrl+Shift+K`.
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.shift {
            parts.push("Shift".to_string());
        }
        if self.modifiers.alt {
            parts.push("Alt".to_string());
        }
        if self.modifiers.meta {
            parts.push("Meta".to_string());
        }
        if self.has_key() {
            parts.push(key_display_text(&self.key));
        }
        parts.join("+")
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn shift_is_explicit(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_alphanumeric(),
        (Some(_), Some(_)) => true,
        _ => false,
    }
}

fn key_display_text(key: &str) -> String {
    match key {
        "esc" => "Esc",
        "enter" => "Enter",
        "tab" => "Tab",
        "space" => "Space",
        "backspace" => "Backspace",
        "del" => "Delete",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "home" => "Home",
        "end" => "End",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        k => return k.to_uppercase(),
    }
    .to_string()
}

/// Normalize a key name so combo text and host key names compare equal.
pub fn normalize_key(key: &str) -> String {
    let lowered = key.to_lowercase();
    match lowered.as_str() {
        " " | "spacebar" => "space",
        "escape" => "esc",
        "delete" => "del",
        "arrowup" => "up",
        "arrowdown" => "down",
        "arrowleft" => "left",
        "arrowright" => "right",
        _ => return lowered,
    }
    .to_string()
}

/// Canonical form of a whitespace-separated sequence (`"Z Shift+R"` -> `"z shift+r"`).
pub fn normalize_sequence(combo: &str) -> String {
    combo
        .split_whitespace()
        .map(|step| Combo::parse(step).chord_token())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sequence token for a live keystroke.
pub fn event_token(event: &KeyEvent) -> String {
    Combo::of_event(event).chord_token()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifiers_and_key() {
        let combo = Combo::parse("ctrl+shift+k");
        assert!(combo.modifiers.ctrl);
        assert!(combo.modifiers.shift);
        assert!(!combo.modifiers.alt);
        assert!(!combo.modifiers.meta);
        assert_eq!(combo.key, "k");
    }

    #[test]
    fn parse_aliases() {
        assert_eq!(Combo::parse("control+a").modifiers, Modifiers::ctrl());
        assert!(Combo::parse("cmd+a").modifiers.meta);
        assert!(Combo::parse("Command+A").modifiers.meta);
        assert_eq!(Combo::parse("Command+A").key, "a");
    }

    #[test]
    fn parse_tolerates_whitespace_around_plus() {
        assert_eq!(Combo::parse(" ctrl + s "), Combo::parse("ctrl+s"));
    }

    #[test]
    fn parse_without_key_is_dead() {
        let combo = Combo::parse("ctrl+shift");
        assert!(!combo.has_key());
        let event = KeyEvent::new("Shift").with_ctrl().with_shift();
        assert!(!combo.matches(&event));
    }

    #[test]
    fn parse_normalizes_key_names() {
        assert_eq!(Combo::parse("escape").key, "esc");
        assert_eq!(Combo::parse("ArrowUp").key, "up");
        assert_eq!(Combo::parse("delete").key, "del");
    }

    #[test]
    fn normalize_key_maps_host_names() {
        assert_eq!(normalize_key(" "), "space");
        assert_eq!(normalize_key("Escape"), "esc");
        assert_eq!(normalize_key("ArrowRight"), "right");
        assert_eq!(normalize_key("K"), "k");
    }

    #[test]
    fn canonical_string_is_idempotent() {
        for text in ["shift+ctrl+k", "meta+alt+ArrowUp", "escape", "cmd+shift+p", "ctrl"] {
            let once = Combo::parse(text).to_canonical_string();
            let twice = Combo::parse(&once).to_canonical_string();
            assert_eq!(once, twice, "canonical form of {text} drifted");
        }
        assert_eq!(Combo::parse("shift+ctrl+k").to_canonical_string(), "ctrl+shift+k");
    }

    #[test]
    fn matches_requires_exact_modifiers() {
        let combo = Combo::parse("ctrl+s");
        assert!(combo.matches(&KeyEvent::new("s").with_ctrl()));
        assert!(!combo.matches(&KeyEvent::new("s")));
        assert!(!combo.matches(&KeyEvent::new("s").with_ctrl().with_shift()));
    }

    #[test]
    fn shifted_letter_matches_upper_case_event() {
        let combo = Combo::parse("shift+g");
        assert!(combo.matches(&KeyEvent::new("G").with_shift()));
    }

    #[test]
    fn sequence_normalization() {
        assert_eq!(normalize_sequence("g g"), "g g");
        assert_eq!(normalize_sequence("Z  Shift+R"), "z shift+r");
        assert_eq!(normalize_sequence("ctrl+w s"), "ctrl+w s");
        assert_eq!(normalize_sequence("i ("), "i (");
    }

    #[test]
    fn event_token_drops_shift_for_symbols() {
        assert_eq!(event_token(&KeyEvent::new("(").with_shift()), "(");
        assert_eq!(event_token(&KeyEvent::new("R").with_shift()), "shift+r");
        assert_eq!(event_token(&KeyEvent::new("w").with_ctrl()), "ctrl+w");
        assert_eq!(event_token(&KeyEvent::new(" ")), "space");
    }

    #[test]
    fn display_labels() {
        assert_eq!(Combo::parse("ctrl+shift+k").display(), "Ctrl+Shift+K");
        assert_eq!(Combo::parse("escape").display(), "Esc");
    }
}
