//! Rolling keystroke buffer for multi-key sequences (`g g`, `: w q`).
//!
//! The buffer is a plain value owned by the engine. Time is always passed
//! in, so the whole state machine is deterministic under test.
//!
//! The pending timeout is a deadline rather than a scheduled callback: each
//! keystroke cancels it, an unmatched keystroke re-arms it, and
//! [`SequenceState::expire`] fires it when the host ticks the engine.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use super::binding::Binding;
use super::event::{EventType, KeyEvent};

#[derive(Clone, Debug, Default)]
pub struct SequenceState {
    keys: SmallVec<[String; 8]>,
    last_keystroke: Option<Instant>,
    deadline: Option<Instant>,
}

impl SequenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keystroke token.
    ///
    /// Clears the buffer first when the gap since the previous keystroke
    /// exceeds `window`, and cancels any pending timeout.
    pub fn advance(&mut self, token: String, now: Instant, window: Duration) {
        if let Some(last) = self.last_keystroke {
            if now.saturating_duration_since(last) > window {
                self.keys.clear();
            }
        }
        self.keys.push(token);
        self.last_keystroke = Some(now);
        self.deadline = None;
    }

    /// Arm the auto-clear timeout, replacing any earlier one.
    pub fn schedule_timeout(&mut self, now: Instant, window: Duration) {
        self.deadline = Some(now + window);
    }

    /// Fire the pending timeout once `now` is past it. Returns true when it
    /// fired. A keystroke landing exactly on the deadline still continues the
    /// sequence, matching the `> window` gap rule in [`advance`](Self::advance).
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now > deadline => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.keys.clear();
        self.last_keystroke = None;
        self.deadline = None;
    }

    pub fn joined(&self) -> String {
        self.keys.join(" ")
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn has_pending_timeout(&self) -> bool {
        self.deadline.is_some()
    }
}

/// True when the buffer equals the sequence or ends with it as whole tokens.
pub fn sequence_matches(buffer: &str, sequence: &str) -> bool {
    if sequence.is_empty() {
        return false;
    }
    buffer == sequence
        || buffer
            .strip_suffix(sequence)
            .is_some_and(|prefix| prefix.ends_with(' '))
}

/// Highest-priority sequence binding completed by `buffer`.
///
/// Ties go to the earliest registered binding.
pub fn find_sequence_match<'a, I>(
    bindings: I,
    event: &KeyEvent,
    event_type: EventType,
    scope: &str,
    buffer: &str,
) -> Option<Binding>
where
    I: IntoIterator<Item = &'a Binding>,
{
    let mut best: Option<&Binding> = None;
    for binding in bindings {
        if !binding.sequence || !binding.enabled || binding.event_type != event_type {
            continue;
        }
        if !binding.matches_scope(scope) || !binding.condition_holds(event) {
            continue;
        }
        if !sequence_matches(buffer, &binding.sequence_tokens()) {
            continue;
        }
        if best.map_or(true, |b| binding.priority > b.priority) {
            best = Some(binding);
        }
    }
    best.cloned()
}

/// Inter-key window: the longest timeout any enabled sequence binding asks
/// for, or `default` when none set one.
pub fn effective_window<'a, I>(bindings: I, default: Duration) -> Duration
where
    I: IntoIterator<Item = &'a Binding>,
{
    bindings
        .into_iter()
        .filter(|b| b.sequence && b.enabled)
        .filter_map(|b| b.sequence_timeout)
        .max()
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::binding::Handler;

    const WINDOW: Duration = Duration::from_millis(800);

    fn seq(combo: &str, priority: i32) -> Binding {
        Binding::sequence(combo, Handler::from_action(|| ())).with_priority(priority)
    }

    #[test]
    fn suffix_matching_respects_token_boundaries() {
        assert!(sequence_matches("g g", "g g"));
        assert!(sequence_matches("x g g", "g g"));
        assert!(!sequence_matches("xg g", "g g"));
        assert!(!sequence_matches("g", "g g"));
        assert!(!sequence_matches("g", ""));
    }

    #[test]
    fn buffer_resets_after_window_gap() {
        let start = Instant::now();
        let mut state = SequenceState::new();
        state.advance("g".into(), start, WINDOW);
        state.advance("g".into(), start + Duration::from_millis(801), WINDOW);
        assert_eq!(state.joined(), "g");
    }

    #[test]
    fn gap_of_exactly_the_window_keeps_the_buffer() {
        let start = Instant::now();
        let mut state = SequenceState::new();
        state.advance("g".into(), start, WINDOW);
        state.schedule_timeout(start, WINDOW);
        assert!(!state.expire(start + WINDOW));
        state.advance("g".into(), start + WINDOW, WINDOW);
        assert_eq!(state.joined(), "g g");
    }

    #[test]
    fn buffer_accumulates_within_window() {
        let start = Instant::now();
        let mut state = SequenceState::new();
        state.advance("d".into(), start, WINDOW);
        state.advance("w".into(), start + Duration::from_millis(100), WINDOW);
        assert_eq!(state.keys(), ["d", "w"]);
    }

    #[test]
    fn timeout_fires_once_due_and_keystroke_cancels_it() {
        let start = Instant::now();
        let mut state = SequenceState::new();
        state.advance("g".into(), start, WINDOW);
        state.schedule_timeout(start, WINDOW);
        assert!(!state.expire(start + WINDOW));
        assert!(state.expire(start + Duration::from_millis(801)));
        assert!(state.is_empty());
        assert!(!state.has_pending_timeout());

        state.advance("g".into(), start, WINDOW);
        state.schedule_timeout(start, WINDOW);
        state.advance("g".into(), start + Duration::from_millis(10), WINDOW);
        assert!(!state.has_pending_timeout());
    }

    #[test]
    fn picks_highest_priority_and_first_on_ties() {
        let bindings = vec![seq("g g", 1), seq("x g g", 5), seq("g g", 5).with_scope("editor")];
        let event = KeyEvent::new("g");
        let found = find_sequence_match(&bindings, &event, EventType::KeyDown, "editor", "x g g").unwrap();
        assert_eq!(found.combo, "x g g");
    }

    #[test]
    fn window_uses_longest_binding_timeout() {
        let mut slow = seq("g g", 0);
        slow.sequence_timeout = Some(Duration::from_millis(1500));
        let bindings = vec![seq("d d", 0), slow];
        assert_eq!(effective_window(&bindings, WINDOW), Duration::from_millis(1500));
        assert_eq!(effective_window(&bindings[..1], WINDOW), WINDOW);
    }
}
