//! Single-chord matching over a snapshot of bindings.

use super::binding::Binding;
use super::event::{EventType, KeyEvent};

/// Find every chord binding matching `event`, highest priority first.
///
/// The sort is stable, so bindings of equal priority keep registration order.
/// Returned bindings are clones sharing their handlers, which lets the caller
/// run them while the registry is mutated.
pub fn find_matches<'a, I>(
    bindings: I,
    event: &KeyEvent,
    event_type: EventType,
    scope: &str,
) -> Vec<Binding>
where
    I: IntoIterator<Item = &'a Binding>,
{
    let mut matches: Vec<Binding> = bindings
        .into_iter()
        .filter(|b| !b.sequence && b.enabled)
        .filter(|b| b.event_type == event_type)
        .filter(|b| b.matches_scope(scope))
        .filter(|b| b.condition_holds(event))
        .filter(|b| b.parsed_combo().matches(event))
        .cloned()
        .collect();

    matches.sort_by(|a, b| b.priority.cmp(&a.priority));
    matches
}

/// The binding that runs for `event`, if any.
pub fn top_match<'a, I>(
    bindings: I,
    event: &KeyEvent,
    event_type: EventType,
    scope: &str,
) -> Option<Binding>
where
    I: IntoIterator<Item = &'a Binding>,
{
    find_matches(bindings, event, event_type, scope).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::binding::{Condition, Handler};

    fn binding(combo: &str, priority: i32) -> Binding {
        Binding::new(combo, Handler::from_action(|| ())).with_priority(priority)
    }

    #[test]
    fn orders_by_descending_priority() {
        let bindings = vec![binding("ctrl+k", 5), binding("ctrl+k", 10), binding("ctrl+j", 50)];
        let event = KeyEvent::new("k").with_ctrl();
        let found = find_matches(&bindings, &event, EventType::KeyDown, "global");
        let priorities: Vec<i32> = found.iter().map(|b| b.priority).collect();
        assert_eq!(priorities, vec![10, 5]);
    }

    #[test]
    fn equal_priority_keeps_storage_order() {
        let first = binding("a", 1).with_scope("editor");
        let second = binding("a", 1);
        let bindings = vec![first, second];
        let found = find_matches(&bindings, &KeyEvent::new("a"), EventType::KeyDown, "editor");
        assert_eq!(found[0].scope, "editor");
        assert_eq!(found[1].scope, "global");
    }

    #[test]
    fn skips_disabled_sequence_and_wrong_phase() {
        let mut disabled = binding("a", 0);
        disabled.enabled = false;
        let mut seq = binding("a", 0);
        seq.sequence = true;
        let keyup = binding("a", 0).with_event_type(EventType::KeyUp);
        let bindings = vec![disabled, seq, keyup];
        assert!(find_matches(&bindings, &KeyEvent::new("a"), EventType::KeyDown, "global").is_empty());
        assert_eq!(find_matches(&bindings, &KeyEvent::new("a"), EventType::KeyUp, "global").len(), 1);
    }

    #[test]
    fn respects_scope_and_condition() {
        let scoped = binding("x", 0).with_scope("editor");
        let bindings = vec![scoped];
        assert!(top_match(&bindings, &KeyEvent::new("x"), EventType::KeyDown, "settings").is_none());
        assert!(top_match(&bindings, &KeyEvent::new("x"), EventType::KeyDown, "editor").is_some());

        let mut gated = binding("y", 0);
        gated.condition = Some(Condition::new(|e| e.key == "y"));
        let bindings = vec![gated];
        assert!(top_match(&bindings, &KeyEvent::new("y"), EventType::KeyDown, "global").is_some());
        assert!(top_match(&bindings, &KeyEvent::new("Y"), EventType::KeyDown, "global").is_none());
    }
}
