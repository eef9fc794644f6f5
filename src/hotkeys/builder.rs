//! Fluent construction of a [`Binding`].
//!
//! ```ignore
//! engine
//!     .on("ctrl+shift+p")
//!     .describe("Command palette")
//!     .priority(10)
//!     .run(|| open_palette())
//!     .register(&mut engine)?;
//! ```

use std::time::Duration;

use super::binding::{
    Binding, BindingId, Condition, Handler, HotkeyContext, IntoHandled, Metadata, PreventDefault,
};
use super::engine::HotkeyEngine;
use super::event::{ElementId, EventType, KeyEvent};
use crate::error::{HotkeyError, Result};

/// Accumulates binding options; nothing is validated until [`build`](Self::build).
#[derive(Debug)]
#[must_use = "a builder does nothing until build() or register() is called"]
pub struct HotkeyBuilder {
    combo: String,
    handler: Option<Handler>,
    priority: i32,
    scope: Option<String>,
    event_type: EventType,
    prevent_default: PreventDefault,
    stop_propagation: bool,
    sequence: bool,
    sequence_timeout: Option<Duration>,
    condition: Option<Condition>,
    element: Option<ElementId>,
    description: Option<String>,
    metadata: Metadata,
}

impl HotkeyBuilder {
    pub fn new(combo: impl Into<String>) -> Self {
        Self {
            combo: combo.into(),
            handler: None,
            priority: 0,
            scope: None,
            event_type: EventType::KeyDown,
            prevent_default: PreventDefault::Always,
            stop_propagation: true,
            sequence: false,
            sequence_timeout: None,
            condition: None,
            element: None,
            description: None,
            metadata: Metadata::new(),
        }
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Handler receiving the event and context.
    pub fn run_with<F, R>(self, f: F) -> Self
    where
        F: Fn(&mut KeyEvent, &HotkeyContext) -> R + 'static,
        R: IntoHandled,
    {
        self.handler(Handler::new(f))
    }

    /// Handler that only needs to know it fired.
    pub fn run<F, R>(self, f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoHandled,
    {
        self.handler(Handler::from_action(f))
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn on_key_up(mut self) -> Self {
        self.event_type = EventType::KeyUp;
        self
    }

    pub fn on_key_down(mut self) -> Self {
        self.event_type = EventType::KeyDown;
        self
    }

    pub fn on_key_press(mut self) -> Self {
        self.event_type = EventType::KeyPress;
        self
    }

    pub fn prevent_default(mut self, mode: PreventDefault) -> Self {
        self.prevent_default = mode;
        self
    }

    pub fn stop_propagation(mut self, stop: bool) -> Self {
        self.stop_propagation = stop;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Only fire while `condition` holds for the event.
    pub fn when(mut self, condition: impl Fn(&KeyEvent) -> bool + 'static) -> Self {
        self.condition = Some(Condition::new(condition));
        self
    }

    /// Merge `metadata` into what was set so far.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub fn on_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    /// Treat the combo as a space-separated key sequence.
    pub fn as_sequence(mut self, timeout: Option<Duration>) -> Self {
        self.sequence = true;
        self.sequence_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Binding> {
        let Some(handler) = self.handler else {
            return Err(HotkeyError::MissingHandler { combo: self.combo });
        };

        let mut binding = Binding::new(self.combo, handler);
        binding.priority = self.priority;
        if let Some(scope) = self.scope {
            binding.scope = scope;
        }
        binding.event_type = self.event_type;
        binding.prevent_default = self.prevent_default;
        binding.stop_propagation = self.stop_propagation;
        binding.sequence = self.sequence;
        binding.sequence_timeout = self.sequence_timeout;
        binding.condition = self.condition;
        binding.element = self.element;
        binding.description = self.description;
        binding.metadata = self.metadata;
        Ok(binding)
    }

    pub fn register(self, engine: &mut HotkeyEngine) -> Result<BindingId> {
        let binding = self.build()?;
        engine.register(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::binding::GLOBAL_SCOPE;

    #[test]
    fn build_without_handler_fails() {
        let err = HotkeyBuilder::new("ctrl+k").describe("Search").build().unwrap_err();
        assert_eq!(
            err,
            HotkeyError::MissingHandler {
                combo: "ctrl+k".into()
            }
        );
        assert_eq!(err.code(), "MISSING_HANDLER");
    }

    #[test]
    fn build_carries_every_option() {
        let binding = HotkeyBuilder::new("g g")
            .run(|| ())
            .priority(7)
            .scope("editor")
            .on_key_up()
            .prevent_default(PreventDefault::Conditional)
            .stop_propagation(false)
            .describe("Top")
            .when(|e| !e.meta)
            .on_element(ElementId::new("buffer"))
            .as_sequence(Some(Duration::from_millis(500)))
            .build()
            .unwrap();

        assert_eq!(binding.priority, 7);
        assert_eq!(binding.scope, "editor");
        assert_eq!(binding.event_type, EventType::KeyUp);
        assert_eq!(binding.prevent_default, PreventDefault::Conditional);
        assert!(!binding.stop_propagation);
        assert_eq!(binding.description.as_deref(), Some("Top"));
        assert!(binding.condition.is_some());
        assert_eq!(binding.element, Some(ElementId::new("buffer")));
        assert!(binding.sequence);
        assert_eq!(binding.sequence_timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn defaults_match_plain_binding() {
        let binding = HotkeyBuilder::new("esc").run(|| ()).build().unwrap();
        assert_eq!(binding.scope, GLOBAL_SCOPE);
        assert_eq!(binding.event_type, EventType::KeyDown);
        assert_eq!(binding.prevent_default, PreventDefault::Always);
        assert!(binding.stop_propagation);
        assert!(!binding.sequence);
    }

    #[test]
    fn metadata_merges() {
        let mut first = Metadata::new();
        first.insert("a".into(), serde_json::json!(1));
        let mut second = Metadata::new();
        second.insert("b".into(), serde_json::json!(2));

        let binding = HotkeyBuilder::new("x")
            .with_metadata(first)
            .with_metadata(second)
            .run(|| ())
            .build()
            .unwrap();
        assert_eq!(binding.metadata.len(), 2);
    }

    #[test]
    fn register_goes_through_engine_validation() {
        let mut engine = HotkeyEngine::new();
        let err = HotkeyBuilder::new("  ").run(|| ()).register(&mut engine).unwrap_err();
        assert_eq!(err, HotkeyError::InvalidCombo);

        let id = engine.on("ctrl+s").run(|| ()).register(&mut engine).unwrap();
        assert!(engine.binding(&id).is_some());
    }
}
