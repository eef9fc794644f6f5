use super::binding::{Binding, Handler, GROUP_METADATA_KEY};
use super::registry::{validate, Registry};
use crate::error::HotkeyError;

fn noop() -> Handler {
    Handler::from_action(|| ())
}

fn grouped(combo: &str, group: &str) -> Binding {
    let mut binding = Binding::new(combo, noop());
    binding
        .metadata
        .insert(GROUP_METADATA_KEY.to_string(), serde_json::json!(group));
    binding
}

#[test]
fn test_insert_and_lookup() {
    let mut registry = Registry::new();
    let (id, replaced) = registry.insert(Binding::new("ctrl+s", noop()));
    assert!(!replaced);
    assert!(registry.contains(&id));
    assert_eq!(registry.get(&id).map(|b| b.combo.as_str()), Some("ctrl+s"));
    assert_eq!(registry.stats().total_registered, 1);
}

#[test]
fn test_replacement_keeps_slot_and_count() {
    let mut registry = Registry::new();
    registry.insert(Binding::new("a", noop()));
    registry.insert(Binding::new("b", noop()));
    let (_, replaced) = registry.insert(Binding::new("a", noop()).with_priority(9));

    assert!(replaced);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.stats().total_registered, 2);
    assert_eq!(registry.bindings()[0].combo, "a");
    assert_eq!(registry.bindings()[0].priority, 9);
}

#[test]
fn test_remove_reindexes_and_never_goes_negative() {
    let mut registry = Registry::new();
    let (a, _) = registry.insert(Binding::new("a", noop()));
    let (b, _) = registry.insert(Binding::new("b", noop()));
    let (c, _) = registry.insert(Binding::new("c", noop()));

    assert!(registry.remove(&a));
    assert!(!registry.remove(&a));
    assert_eq!(registry.stats().total_registered, 2);
    assert_eq!(registry.get(&b).map(|x| x.combo.as_str()), Some("b"));
    assert_eq!(registry.get(&c).map(|x| x.combo.as_str()), Some("c"));

    registry.remove(&b);
    registry.remove(&c);
    registry.remove(&c);
    assert_eq!(registry.stats().total_registered, 0);
    assert!(registry.is_empty());
}

#[test]
fn test_validate_rejects_blank_combo() {
    assert_eq!(validate(&Binding::new("", noop())), Err(HotkeyError::InvalidCombo));
    assert_eq!(validate(&Binding::new(" \t", noop())), Err(HotkeyError::InvalidCombo));
    assert_eq!(validate(&Binding::new("esc", noop())), Ok(()));
}

#[test]
fn test_infos_sorted_by_priority_and_filtered_by_scope() {
    let mut registry = Registry::new();
    registry.insert(Binding::new("a", noop()).with_priority(1));
    registry.insert(Binding::new("b", noop()).with_priority(5).with_scope("editor"));
    registry.insert(Binding::new("c", noop()).with_priority(3));

    let all: Vec<String> = registry.infos(None).into_iter().map(|i| i.combo).collect();
    assert_eq!(all, vec!["b", "c", "a"]);

    let editor = registry.infos(Some("editor"));
    assert_eq!(editor.len(), 1);
    assert_eq!(editor[0].combo, "b");
}

#[test]
fn test_is_combo_registered() {
    let mut registry = Registry::new();
    registry.insert(Binding::new("ctrl+k", noop()).with_scope("search"));
    assert!(registry.is_combo_registered("ctrl+k", None));
    assert!(registry.is_combo_registered("ctrl+k", Some("search")));
    assert!(!registry.is_combo_registered("ctrl+k", Some("global")));
    assert!(!registry.is_combo_registered("ctrl+j", None));
}

#[test]
fn test_toggle_group_flips_tagged_bindings() {
    let mut registry = Registry::new();
    let (nav, _) = registry.insert(grouped("j", "nav"));
    let (other, _) = registry.insert(Binding::new("x", noop()));
    registry.insert_group("nav", vec![nav.clone()]);

    assert_eq!(registry.toggle_group("nav", None), Ok(false));
    assert!(!registry.get(&nav).map_or(true, |b| b.enabled));
    assert!(registry.get(&other).map_or(false, |b| b.enabled));

    assert_eq!(registry.toggle_group("nav", Some(true)), Ok(true));
    assert!(registry.get(&nav).map_or(false, |b| b.enabled));
    assert_eq!(registry.group("nav").map(|g| g.enabled), Some(true));
}

#[test]
fn test_toggle_unknown_group() {
    let mut registry = Registry::new();
    assert_eq!(
        registry.toggle_group("missing", None),
        Err(HotkeyError::GroupNotFound("missing".into()))
    );
}

#[test]
fn test_clear_keeps_trigger_history_reset_drops_it() {
    let mut registry = Registry::new();
    registry.insert(Binding::new("a", noop()));
    registry.insert_group("g", Vec::new());
    registry.record_trigger("global");
    registry.record_trigger("editor");

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.group("g").is_none());
    assert_eq!(registry.stats().total_registered, 0);
    assert_eq!(registry.stats().total_triggered, 2);
    assert_eq!(registry.stats().scope_stats.get("editor"), Some(&1));
    assert!(registry.stats().last_triggered.is_some());

    registry.reset();
    assert_eq!(registry.stats().total_triggered, 0);
    assert!(registry.stats().scope_stats.is_empty());
    assert!(registry.stats().last_triggered.is_none());
}
