//! Declarative registration for UI components and user keymaps.
//!
//! A component describes its shortcuts as [`HotkeySpec`]s, mounts them when
//! it appears and unmounts them when it goes away. Keymap entries from the
//! config file go through the same path once their action names are resolved
//! against an [`ActionTable`].

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use super::binding::{Binding, BindingId, Handled, Handler};
use super::engine::HotkeyEngine;
use super::presets::Preset;
use crate::config::KeymapEntry;
use crate::error::{HotkeyError, Result};

pub type Action = Rc<dyn Fn()>;

/// One declarative shortcut: a preset or a raw combo plus an action.
#[derive(Clone)]
pub struct HotkeySpec {
    pub preset: Option<Preset>,
    pub combo: Option<String>,
    pub action: Action,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub scope: Option<String>,
    pub enabled: bool,
    pub sequence: bool,
}

impl fmt::Debug for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeySpec")
            .field("preset", &self.preset)
            .field("combo", &self.combo)
            .field("description", &self.description)
            .field("priority", &self.priority)
            .field("scope", &self.scope)
            .field("enabled", &self.enabled)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl HotkeySpec {
    fn empty(action: Action) -> Self {
        Self {
            preset: None,
            combo: None,
            action,
            description: None,
            priority: None,
            scope: None,
            enabled: true,
            sequence: false,
        }
    }

    pub fn combo(combo: impl Into<String>, action: impl Fn() + 'static) -> Self {
        Self {
            combo: Some(combo.into()),
            ..Self::empty(Rc::new(action))
        }
    }

    pub fn preset(preset: impl Into<Preset>, action: impl Fn() + 'static) -> Self {
        Self {
            preset: Some(preset.into()),
            ..Self::empty(Rc::new(action))
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Only meaningful for raw combos; presets carry their own flag.
    pub fn sequence(mut self, sequence: bool) -> Self {
        self.sequence = sequence;
        self
    }

    /// Resolve a config entry, looking its action up by name.
    pub fn from_entry(entry: &KeymapEntry, actions: &ActionTable) -> Result<Self> {
        let action = actions
            .get(&entry.action)
            .ok_or_else(|| HotkeyError::UnknownAction(entry.action.clone()))?;

        let mut spec = Self::empty(action);
        spec.preset = entry.preset.as_deref().map(Preset::from_path).transpose()?;
        spec.combo = entry.combo.clone();
        spec.description = entry.description.clone();
        spec.priority = entry.priority;
        spec.scope = entry.scope.clone();
        spec.enabled = entry.enabled.unwrap_or(true);
        spec.sequence = entry.sequence.unwrap_or(false);
        Ok(spec)
    }

    /// The binding this spec registers.
    ///
    /// Preset fields are the base; description, priority and scope given on
    /// the spec win. A disabled spec yields a disabled binding whose action
    /// is skipped even if the binding is later re-enabled through a group.
    pub fn to_binding(&self) -> Result<Binding> {
        let handler = self.handler();
        let mut binding = match (&self.preset, &self.combo) {
            (Some(preset), _) => preset.binding(handler),
            (None, Some(combo)) if self.sequence => Binding::sequence(combo.clone(), handler),
            (None, Some(combo)) => Binding::new(combo.clone(), handler),
            (None, None) => return Err(HotkeyError::MissingCombo),
        };

        if let Some(description) = &self.description {
            binding.description = Some(description.clone());
        }
        if let Some(priority) = self.priority {
            binding.priority = priority;
        }
        if let Some(scope) = &self.scope {
            binding.scope = scope.clone();
        }
        binding.enabled = self.enabled;
        Ok(binding)
    }

    fn handler(&self) -> Handler {
        let action = Rc::clone(&self.action);
        let enabled = self.enabled;
        Handler::from_action(move || {
            if enabled {
                action();
                Handled::Yes
            } else {
                Handled::No
            }
        })
    }
}

/// Named application callbacks that keymap entries refer to.
#[derive(Clone, Default)]
pub struct ActionTable {
    actions: BTreeMap<String, Action>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, action: impl Fn() + 'static) {
        self.actions.insert(name.into(), Rc::new(action));
    }

    pub fn with(mut self, name: impl Into<String>, action: impl Fn() + 'static) -> Self {
        self.insert(name, action);
        self
    }

    pub fn get(&self, name: &str) -> Option<Action> {
        self.actions.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.actions.keys()).finish()
    }
}

/// Registrations owned by one component.
///
/// Dropping a still-mounted set only warns: the engine is not reachable from
/// here, so call [`unmount`](Self::unmount) explicitly.
#[derive(Debug, Default)]
pub struct MountedHotkeys {
    ids: Vec<BindingId>,
    failures: Vec<HotkeyError>,
    mounted: bool,
}

impl MountedHotkeys {
    /// Register every spec. A spec that fails is logged and skipped.
    pub fn mount(engine: &mut HotkeyEngine, specs: impl IntoIterator<Item = HotkeySpec>) -> Self {
        let mut mounted = Self {
            ids: Vec::new(),
            failures: Vec::new(),
            mounted: true,
        };
        for spec in specs {
            match spec.to_binding().and_then(|binding| engine.register(binding)) {
                Ok(id) => mounted.ids.push(id),
                Err(e) => {
                    let subject = spec
                        .preset
                        .map(Preset::path)
                        .or_else(|| spec.combo.clone())
                        .unwrap_or_default();
                    e.log_skipped(&subject);
                    mounted.failures.push(e);
                }
            }
        }
        debug!(registered = mounted.ids.len(), failed = mounted.failures.len(), "Hotkeys mounted");
        mounted
    }

    /// Resolve config entries against `actions`, then mount the ones that resolve.
    pub fn mount_keymap(
        engine: &mut HotkeyEngine,
        entries: &[KeymapEntry],
        actions: &ActionTable,
    ) -> Self {
        let mut failures = Vec::new();
        let specs: Vec<HotkeySpec> = entries
            .iter()
            .filter_map(|entry| match HotkeySpec::from_entry(entry, actions) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    e.log_skipped(&entry.action);
                    failures.push(e);
                    None
                }
            })
            .collect();

        let mut mounted = Self::mount(engine, specs);
        failures.append(&mut mounted.failures);
        mounted.failures = failures;
        mounted
    }

    /// Unregister everything this set registered. Safe to call twice.
    pub fn unmount(&mut self, engine: &mut HotkeyEngine) {
        if !self.mounted {
            return;
        }
        for id in self.ids.drain(..) {
            engine.unregister(&id);
        }
        self.mounted = false;
        debug!("Hotkeys unmounted");
    }

    pub fn ids(&self) -> &[BindingId] {
        &self.ids
    }

    pub fn failures(&self) -> &[HotkeyError] {
        &self.failures
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl Drop for MountedHotkeys {
    fn drop(&mut self) {
        if self.mounted && !self.ids.is_empty() {
            warn!(bindings = self.ids.len(), "Mounted hotkeys dropped without unmount");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::event::KeyEvent;
    use crate::hotkeys::presets::{AppPreset, VimPreset};
    use std::cell::Cell;
    use std::time::Instant;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn preset_fields_are_overridden_by_spec() {
        let spec = HotkeySpec::preset(AppPreset::Save, || ())
            .describe("Save draft")
            .priority(4)
            .scope("editor");
        let binding = spec.to_binding().unwrap();
        assert_eq!(binding.combo, "ctrl+s");
        assert_eq!(binding.description.as_deref(), Some("Save draft"));
        assert_eq!(binding.priority, 4);
        assert_eq!(binding.scope, "editor");
    }

    #[test]
    fn preset_keeps_its_own_description_and_sequence_flag() {
        let binding = HotkeySpec::preset(VimPreset::YankLine, || ()).to_binding().unwrap();
        assert_eq!(binding.description.as_deref(), Some("Yank line"));
        assert!(binding.sequence);
    }

    #[test]
    fn spec_without_preset_or_combo_is_rejected() {
        let mut spec = HotkeySpec::combo("x", || ());
        spec.combo = None;
        assert_eq!(spec.to_binding().unwrap_err(), HotkeyError::MissingCombo);
    }

    #[test]
    fn mount_isolates_failures_and_unmount_is_idempotent() {
        let mut engine = HotkeyEngine::new();
        let mut mounted = MountedHotkeys::mount(
            &mut engine,
            vec![
                HotkeySpec::combo("ctrl+k", || ()),
                HotkeySpec::combo("   ", || ()),
                HotkeySpec::preset(AppPreset::Undo, || ()),
            ],
        );
        assert_eq!(mounted.ids().len(), 2);
        assert_eq!(mounted.failures(), [HotkeyError::InvalidCombo]);
        assert_eq!(engine.stats().total_registered, 2);

        mounted.unmount(&mut engine);
        mounted.unmount(&mut engine);
        assert!(!mounted.is_mounted());
        assert_eq!(engine.stats().total_registered, 0);
    }

    #[test]
    fn disabled_spec_skips_its_action() {
        let (count, action) = counter();
        let mut engine = HotkeyEngine::new();
        let mut mounted = MountedHotkeys::mount(
            &mut engine,
            vec![HotkeySpec::combo("ctrl+k", action).enabled(false)],
        );

        let mut event = KeyEvent::new("k").with_ctrl();
        engine.dispatch_keydown(&mut event, Instant::now()).unwrap();
        assert_eq!(count.get(), 0);
        mounted.unmount(&mut engine);
    }

    #[test]
    fn keymap_entries_resolve_actions_by_name() {
        let (count, action) = counter();
        let actions = ActionTable::new().with("deleteLine", action);
        let entries = vec![
            KeymapEntry {
                preset: Some("vim.deleteLine".into()),
                action: "deleteLine".into(),
                ..Default::default()
            },
            KeymapEntry {
                combo: Some("ctrl+q".into()),
                action: "quitEverything".into(),
                ..Default::default()
            },
            KeymapEntry {
                preset: Some("vim.nonexistent".into()),
                action: "deleteLine".into(),
                ..Default::default()
            },
        ];

        let mut engine = HotkeyEngine::new();
        let mut mounted = MountedHotkeys::mount_keymap(&mut engine, &entries, &actions);
        assert_eq!(mounted.ids().len(), 1);
        assert_eq!(
            mounted.failures(),
            [
                HotkeyError::UnknownAction("quitEverything".into()),
                HotkeyError::UnknownPreset("vim.nonexistent".into()),
            ]
        );

        let start = Instant::now();
        engine.dispatch_keydown(&mut KeyEvent::new("d"), start).unwrap();
        engine
            .dispatch_keydown(&mut KeyEvent::new("d"), start + std::time::Duration::from_millis(50))
            .unwrap();
        assert_eq!(count.get(), 1);
        mounted.unmount(&mut engine);
    }
}
