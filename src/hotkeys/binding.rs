//! Binding descriptors: what to match and what to run.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::combo::{normalize_sequence, Combo};
use super::event::{ElementId, EventType, KeyEvent};

/// Scope every binding falls back to; always eligible.
pub const GLOBAL_SCOPE: &str = "global";

/// Metadata key used to tag group membership.
pub const GROUP_METADATA_KEY: &str = "group";

pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Whether the engine calls `prevent_default` before running the handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreventDefault {
    #[default]
    Always,
    Never,
    /// Left to the handler, which receives the event mutably.
    Conditional,
}

/// What a handler reports back after running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
    Yes,
    /// The handler ran but declined the key; prevention and propagation
    /// effects have already been applied.
    No,
}

impl Handled {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Conversion for handler return values.
pub trait IntoHandled {
    fn into_handled(self) -> anyhow::Result<Handled>;
}

impl IntoHandled for () {
    fn into_handled(self) -> anyhow::Result<Handled> {
        Ok(Handled::Yes)
    }
}

impl IntoHandled for bool {
    fn into_handled(self) -> anyhow::Result<Handled> {
        Ok(if self { Handled::Yes } else { Handled::No })
    }
}

impl IntoHandled for Handled {
    fn into_handled(self) -> anyhow::Result<Handled> {
        Ok(self)
    }
}

impl<T, E> IntoHandled for Result<T, E>
where
    T: IntoHandled,
    E: Into<anyhow::Error>,
{
    fn into_handled(self) -> anyhow::Result<Handled> {
        self.map_err(Into::into)?.into_handled()
    }
}

/// Context handed to middleware and handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct HotkeyContext {
    pub combo: String,
    pub scope: String,
    pub priority: i32,
    pub metadata: Metadata,
}

type HandlerFn = dyn Fn(&mut KeyEvent, &HotkeyContext) -> anyhow::Result<Handled>;

/// Shared, type-erased handler.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&mut KeyEvent, &HotkeyContext) -> R + 'static,
        R: IntoHandled,
    {
        Self(Rc::new(move |event: &mut KeyEvent, ctx: &HotkeyContext| {
            f(event, ctx).into_handled()
        }))
    }

    /// Handler that ignores the event and context.
    pub fn from_action<F, R>(f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoHandled,
    {
        Self::new(move |_, _| f())
    }

    pub fn call(&self, event: &mut KeyEvent, ctx: &HotkeyContext) -> anyhow::Result<Handled> {
        (self.0)(event, ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Predicate gating a binding per event.
#[derive(Clone)]
pub struct Condition(Rc<dyn Fn(&KeyEvent) -> bool>);

impl Condition {
    pub fn new(f: impl Fn(&KeyEvent) -> bool + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn check(&self, event: &KeyEvent) -> bool {
        (self.0)(event)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// Stable identity of a registered binding.
///
/// Derived from `(combo, scope, event type, sequence flag)`, so registering
/// the same quadruple again replaces the earlier entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingId(String);

impl BindingId {
    pub fn derive(combo: &str, scope: &str, event_type: EventType, sequence: bool) -> Self {
        let suffix = if sequence { "-seq" } else { "" };
        Self(format!("{combo}-{scope}-{event_type}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registrable hotkey.
#[derive(Clone, Debug)]
pub struct Binding {
    pub combo: String,
    pub handler: Handler,
    pub priority: i32,
    pub scope: String,
    pub event_type: EventType,
    pub prevent_default: PreventDefault,
    pub stop_propagation: bool,
    pub enabled: bool,
    pub sequence: bool,
    pub sequence_timeout: Option<Duration>,
    pub condition: Option<Condition>,
    pub element: Option<ElementId>,
    pub description: Option<String>,
    pub metadata: Metadata,
}

impl Binding {
    pub fn new(combo: impl Into<String>, handler: Handler) -> Self {
        Self {
            combo: combo.into(),
            handler,
            priority: 0,
            scope: GLOBAL_SCOPE.to_string(),
            event_type: EventType::KeyDown,
            prevent_default: PreventDefault::Always,
            stop_propagation: true,
            enabled: true,
            sequence: false,
            sequence_timeout: None,
            condition: None,
            element: None,
            description: None,
            metadata: Metadata::new(),
        }
    }

    pub fn sequence(combo: impl Into<String>, handler: Handler) -> Self {
        Self {
            sequence: true,
            ..Self::new(combo, handler)
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> BindingId {
        BindingId::derive(&self.combo, &self.scope, self.event_type, self.sequence)
    }

    pub fn group(&self) -> Option<&str> {
        self.metadata.get(GROUP_METADATA_KEY).and_then(|v| v.as_str())
    }

    /// Eligible under `current` scope: exact match or the binding is global.
    pub fn matches_scope(&self, current: &str) -> bool {
        self.scope == current || self.scope == GLOBAL_SCOPE
    }

    pub fn condition_holds(&self, event: &KeyEvent) -> bool {
        self.condition.as_ref().map_or(true, |c| c.check(event))
    }

    pub fn parsed_combo(&self) -> Combo {
        Combo::parse(&self.combo)
    }

    /// Canonical token string for sequence matching.
    pub fn sequence_tokens(&self) -> String {
        normalize_sequence(&self.combo)
    }

    pub fn context(&self) -> HotkeyContext {
        HotkeyContext {
            combo: self.combo.clone(),
            scope: self.scope.clone(),
            priority: self.priority,
            metadata: self.metadata.clone(),
        }
    }

    pub fn info(&self) -> HotkeyInfo {
        HotkeyInfo {
            id: self.id(),
            combo: self.combo.clone(),
            description: self.description.clone(),
            priority: self.priority,
            scope: self.scope.clone(),
            enabled: self.enabled,
            sequence: self.sequence,
        }
    }
}

/// Display row for listing registered bindings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotkeyInfo {
    pub id: BindingId,
    pub combo: String,
    pub description: Option<String>,
    pub priority: i32,
    pub scope: String,
    pub enabled: bool,
    pub sequence: bool,
}
