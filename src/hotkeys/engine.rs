//! The dispatcher: owns the registry, listener set, middleware chain, active
//! scope and sequence buffer, and turns host key events into handler calls.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tracing::{debug, info, warn};

use super::binding::{
    Binding, BindingId, Handled, Handler, HotkeyContext, HotkeyInfo, PreventDefault, GLOBAL_SCOPE,
    GROUP_METADATA_KEY,
};
use super::builder::HotkeyBuilder;
use super::combo::event_token;
use super::event::{EventHost, EventType, KeyEvent, ListenerTarget, NullHost};
use super::matcher::top_match;
use super::presets::Preset;
use super::registry::{self, Group, HotkeyStats, Registry};
use super::sequence::{effective_window, find_sequence_match, SequenceState};
use crate::config::{Config, DEFAULT_SEQUENCE_TIMEOUT_MS};
use crate::error::{HotkeyError, Result};

type MiddlewareFn = dyn Fn(&KeyEvent, &HotkeyContext) -> bool;

/// Handle for removing a middleware added with [`HotkeyEngine::use_middleware`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MiddlewareId(u64);

/// Result of one registration batch. Failed entries are logged and skipped.
#[derive(Debug, Default)]
pub struct BatchRegistration {
    pub ids: Vec<BindingId>,
    pub failures: Vec<HotkeyError>,
}

/// Binding that ran for an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triggered {
    pub id: BindingId,
    pub combo: String,
    pub scope: String,
    pub sequence: bool,
    pub handled: Handled,
}

/// What the engine did with an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// No listener for this target/phase, or the engine is disabled.
    Ignored,
    Unmatched,
    /// A middleware refused the matched binding.
    Vetoed { id: BindingId },
    Triggered(Triggered),
}

impl Dispatch {
    pub fn triggered(&self) -> Option<&Triggered> {
        match self {
            Self::Triggered(t) => Some(t),
            _ => None,
        }
    }
}

pub struct HotkeyEngine {
    registry: Registry,
    host: Box<dyn EventHost>,
    listeners: BTreeSet<(ListenerTarget, EventType)>,
    middleware: Vec<(MiddlewareId, Rc<MiddlewareFn>)>,
    next_middleware_id: u64,
    initial_scope: String,
    scope: String,
    enabled: bool,
    sequences: BTreeMap<EventType, SequenceState>,
    sequence_timeout: Duration,
}

impl Default for HotkeyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HotkeyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeyEngine")
            .field("bindings", &self.registry.len())
            .field("listeners", &self.listeners)
            .field("scope", &self.scope)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl HotkeyEngine {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            host: Box::new(NullHost),
            listeners: BTreeSet::new(),
            middleware: Vec::new(),
            next_middleware_id: 0,
            initial_scope: GLOBAL_SCOPE.to_string(),
            scope: GLOBAL_SCOPE.to_string(),
            enabled: true,
            sequences: BTreeMap::new(),
            sequence_timeout: Duration::from_millis(DEFAULT_SEQUENCE_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut engine = Self::new();
        engine.sequence_timeout = config.sequence_timeout();
        engine.initial_scope = config.initial_scope.clone();
        engine.scope = config.initial_scope.clone();
        engine.enabled = config.enabled;
        engine
    }

    /// Route listener attachment through `host`. Call before registering.
    pub fn with_host(mut self, host: impl EventHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a binding, replacing any binding with the same identity.
    pub fn register(&mut self, binding: Binding) -> Result<BindingId> {
        registry::validate(&binding)?;
        if !binding.sequence && !binding.parsed_combo().has_key() {
            warn!(combo = %binding.combo, "Combo names no key; binding will never match");
        }

        let target = ListenerTarget::for_element(binding.element.as_ref());
        let event_type = binding.event_type;
        let scope = binding.scope.clone();
        let (id, replaced) = self.registry.insert(binding);
        self.bind_event_type(target, event_type);

        debug!(binding_id = %id, scope = %scope, replaced, "Hotkey registered");
        Ok(id)
    }

    /// Register every binding; a failure only skips that entry.
    pub fn register_many(
        &mut self,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> BatchRegistration {
        let mut batch = BatchRegistration::default();
        for binding in bindings {
            let combo = binding.combo.clone();
            match self.register(binding) {
                Ok(id) => batch.ids.push(id),
                Err(e) => {
                    e.log_skipped(&combo);
                    batch.failures.push(e);
                }
            }
        }
        batch
    }

    pub fn register_preset(
        &mut self,
        preset: impl Into<Preset>,
        handler: Handler,
    ) -> Result<BindingId> {
        self.register(preset.into().binding(handler))
    }

    /// Start a fluent builder for `combo`; finish with [`HotkeyBuilder::register`].
    pub fn on(&self, combo: impl Into<String>) -> HotkeyBuilder {
        HotkeyBuilder::new(combo)
    }

    /// Remove one binding. Returns false if `id` was not registered.
    pub fn unregister(&mut self, id: &BindingId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            self.sequences.clear();
            debug!(binding_id = %id, "Hotkey unregistered");
        }
        removed
    }

    fn bind_event_type(&mut self, target: ListenerTarget, event_type: EventType) {
        if self.listeners.contains(&(target.clone(), event_type)) {
            return;
        }
        self.host.attach(&target, event_type);
        info!(target = %target, event_type = %event_type, "Listener attached");
        self.listeners.insert((target, event_type));
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Register `bindings` tagged with group `name` and track them together.
    pub fn create_group(
        &mut self,
        name: &str,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> &Group {
        let tagged: Vec<Binding> = bindings
            .into_iter()
            .map(|mut binding| {
                binding.metadata.insert(
                    GROUP_METADATA_KEY.to_string(),
                    serde_json::Value::String(name.to_string()),
                );
                binding
            })
            .collect();
        let batch = self.register_many(tagged);
        info!(group = name, members = batch.ids.len(), "Hotkey group created");
        self.registry.insert_group(name, batch.ids)
    }

    /// Enable/disable every binding of a group; `None` flips the current state.
    pub fn toggle_group(&mut self, name: &str, enabled: Option<bool>) -> Result<bool> {
        let state = self.registry.toggle_group(name, enabled)?;
        debug!(group = name, enabled = state, "Hotkey group toggled");
        Ok(state)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.registry.group(name)
    }

    // ------------------------------------------------------------------
    // Scope
    // ------------------------------------------------------------------

    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
        debug!(scope = %self.scope, "Hotkey scope changed");
    }

    pub fn current_scope(&self) -> &str {
        &self.scope
    }

    /// Run `f` with `scope` active, restoring the previous scope afterward,
    /// including when `f` changes the scope itself or panics.
    pub fn with_scope<T>(
        &mut self,
        scope: impl Into<String>,
        f: impl FnOnce(&mut HotkeyEngine) -> T,
    ) -> T {
        let previous = std::mem::replace(&mut self.scope, scope.into());
        let mut guard = ScopeGuard {
            engine: self,
            previous,
        };
        let out = f(&mut *guard.engine);
        drop(guard);
        out
    }

    // ------------------------------------------------------------------
    // Middleware
    // ------------------------------------------------------------------

    /// Add an interceptor run before every handler; returning false vetoes it.
    pub fn use_middleware(
        &mut self,
        middleware: impl Fn(&KeyEvent, &HotkeyContext) -> bool + 'static,
    ) -> MiddlewareId {
        let id = MiddlewareId(self.next_middleware_id);
        self.next_middleware_id += 1;
        self.middleware.push((id, Rc::new(middleware)));
        id
    }

    pub fn remove_middleware(&mut self, id: MiddlewareId) -> bool {
        let before = self.middleware.len();
        self.middleware.retain(|(mid, _)| *mid != id);
        self.middleware.len() != before
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Feed one host event through the engine.
    ///
    /// Sequence bindings get the first look at the event; if one completes,
    /// the event goes no further. Otherwise the single highest-priority chord
    /// binding runs. Handler errors propagate.
    ///
    /// Each phase keeps its own keystroke buffer. Keydown always feeds one;
    /// keyup and keypress only do while a sequence binding listens on them.
    pub fn dispatch(
        &mut self,
        target: &ListenerTarget,
        event_type: EventType,
        event: &mut KeyEvent,
        now: Instant,
    ) -> anyhow::Result<Dispatch> {
        if !self.enabled || !self.listeners.contains(&(target.clone(), event_type)) {
            return Ok(Dispatch::Ignored);
        }

        self.expire_sequences(now);

        if !event.is_modifier_key() && self.tracks_sequences(event_type) {
            if let Some(outcome) = self.handle_sequence(event, event_type, now)? {
                return Ok(outcome);
            }
        }

        let scope = self.scope.clone();
        let Some(binding) = top_match(self.registry.bindings(), event, event_type, &scope) else {
            return Ok(Dispatch::Unmatched);
        };
        self.execute_handler(event, &binding)
    }

    /// Convenience for the window-level keydown listener.
    pub fn dispatch_keydown(
        &mut self,
        event: &mut KeyEvent,
        now: Instant,
    ) -> anyhow::Result<Dispatch> {
        self.dispatch(&ListenerTarget::Global, EventType::KeyDown, event, now)
    }

    fn tracks_sequences(&self, event_type: EventType) -> bool {
        event_type == EventType::KeyDown
            || self
                .registry
                .bindings()
                .iter()
                .any(|b| b.sequence && b.enabled && b.event_type == event_type)
    }

    fn handle_sequence(
        &mut self,
        event: &mut KeyEvent,
        event_type: EventType,
        now: Instant,
    ) -> anyhow::Result<Option<Dispatch>> {
        let window = effective_window(self.registry.bindings(), self.sequence_timeout);
        let state = self.sequences.entry(event_type).or_default();
        state.advance(event_token(event), now, window);
        let buffer = state.joined();

        let found = find_sequence_match(
            self.registry.bindings(),
            event,
            event_type,
            &self.scope,
            &buffer,
        );
        match found {
            Some(binding) => {
                event.prevent_default();
                event.stop_propagation();
                debug!(buffer = %buffer, combo = %binding.combo, "Sequence completed");
                let outcome = self.execute_handler(event, &binding);
                self.sequences.remove(&event_type);
                outcome.map(Some)
            }
            None => {
                self.sequences
                    .entry(event_type)
                    .or_default()
                    .schedule_timeout(now, window);
                Ok(None)
            }
        }
    }

    fn execute_handler(
        &mut self,
        event: &mut KeyEvent,
        binding: &Binding,
    ) -> anyhow::Result<Dispatch> {
        let ctx = binding.context();
        let id = binding.id();

        for (_, middleware) in &self.middleware {
            if !middleware(event, &ctx) {
                debug!(binding_id = %id, "Hotkey vetoed by middleware");
                return Ok(Dispatch::Vetoed { id });
            }
        }

        match binding.prevent_default {
            PreventDefault::Always => event.prevent_default(),
            PreventDefault::Never | PreventDefault::Conditional => {}
        }
        if binding.stop_propagation {
            event.stop_propagation();
        }

        let handled = binding
            .handler
            .call(event, &ctx)
            .with_context(|| format!("hotkey handler for '{}' failed", binding.combo))?;

        self.registry.record_trigger(&binding.scope);
        debug!(
            binding_id = %id,
            scope = %binding.scope,
            priority = binding.priority,
            handled = handled.is_handled(),
            "Hotkey triggered"
        );

        Ok(Dispatch::Triggered(Triggered {
            id,
            combo: binding.combo.clone(),
            scope: binding.scope.clone(),
            sequence: binding.sequence,
            handled,
        }))
    }

    /// Fire every pending sequence timeout that is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        let fired = self.expire_sequences(now);
        if fired {
            debug!("Sequence buffer timed out");
        }
        fired
    }

    fn expire_sequences(&mut self, now: Instant) -> bool {
        let mut fired = false;
        for state in self.sequences.values_mut() {
            fired |= state.expire(now);
        }
        fired
    }

    /// Keystrokes buffered for keydown sequences.
    pub fn pending_sequence(&self) -> &[String] {
        self.pending_sequence_on(EventType::KeyDown)
    }

    pub fn pending_sequence_on(&self, event_type: EventType) -> &[String] {
        self.sequences
            .get(&event_type)
            .map_or(&[][..], SequenceState::keys)
    }

    pub fn has_pending_timeout(&self) -> bool {
        self.sequences.values().any(SequenceState::has_pending_timeout)
    }

    // ------------------------------------------------------------------
    // Lifecycle and queries
    // ------------------------------------------------------------------

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Remove all bindings and groups. Listeners and middleware stay.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.sequences.clear();
        info!("Hotkeys cleared");
    }

    /// Detach every listener and reset the engine to its freshly built state.
    pub fn destroy(&mut self) {
        for (target, event_type) in std::mem::take(&mut self.listeners) {
            self.host.detach(&target, event_type);
        }
        self.registry.reset();
        self.sequences.clear();
        self.middleware.clear();
        self.scope = self.initial_scope.clone();
        self.enabled = true;
        info!("Hotkey engine destroyed");
    }

    pub fn stats(&self) -> HotkeyStats {
        self.registry.stats().clone()
    }

    pub fn binding(&self, id: &BindingId) -> Option<&Binding> {
        self.registry.get(id)
    }

    /// Registered bindings for display, optionally limited to one scope.
    pub fn bindings(&self, scope: Option<&str>) -> Vec<HotkeyInfo> {
        self.registry.infos(scope)
    }

    pub fn is_combo_registered(&self, combo: &str, scope: Option<&str>) -> bool {
        self.registry.is_combo_registered(combo, scope)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listener(&self, target: &ListenerTarget, event_type: EventType) -> bool {
        self.listeners.contains(&(target.clone(), event_type))
    }
}

struct ScopeGuard<'a> {
    engine: &'a mut HotkeyEngine,
    previous: String,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.engine.scope = std::mem::take(&mut self.previous);
    }
}
