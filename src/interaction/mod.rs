use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{KpiError, KpiResult};

/// Pointer events the label reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoverEvent {
    MouseMove,
    MouseOut,
}

impl HoverEvent {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MouseMove => "onMouseMove",
            Self::MouseOut => "onMouseOut",
        }
    }
}

/// What a listener does to its visibility flag when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoverReaction {
    Hide,
    Show,
}

/// Registration capability supplied by the host's event dispatch.
pub trait HoverEventRegistry {
    fn on(&mut self, event: HoverEvent, listener: &str, reaction: HoverReaction) -> KpiResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverBinding {
    pub event: HoverEvent,
    pub listener: String,
    pub reaction: HoverReaction,
}

impl HoverBinding {
    /// Namespaced key in the `event.listener` form.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.event.name(), self.listener)
    }
}

/// In-process dispatcher keeping bindings in registration order.
#[derive(Debug, Clone, Default)]
pub struct HoverDispatcher {
    bindings: Vec<HoverBinding>,
}

impl HoverEventRegistry for HoverDispatcher {
    fn on(&mut self, event: HoverEvent, listener: &str, reaction: HoverReaction) -> KpiResult<()> {
        if listener.is_empty() {
            return Err(KpiError::InvalidConfig(
                "hover listener name must not be empty".to_owned(),
            ));
        }
        if self
            .bindings
            .iter()
            .any(|binding| binding.event == event && binding.listener == listener)
        {
            return Err(KpiError::InvalidConfig(format!(
                "hover listener `{}.{listener}` is already registered",
                event.name()
            )));
        }
        self.bindings.push(HoverBinding {
            event,
            listener: listener.to_owned(),
            reaction,
        });
        Ok(())
    }
}

impl HoverDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every binding of `listener`. Returns `true` when any was removed.
    pub fn unregister(&mut self, listener: &str) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|binding| binding.listener != listener);
        before != self.bindings.len()
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Bindings triggered by `event`, in registration order.
    pub fn dispatch(&self, event: HoverEvent) -> impl Iterator<Item = &HoverBinding> {
        trace!(event = event.name(), "dispatch hover event");
        self.bindings
            .iter()
            .filter(move |binding| binding.event == event)
    }
}

/// Visibility flag of one label instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelHoverState {
    listener: String,
    visible: bool,
}

impl LabelHoverState {
    /// Registers "hide on move" and "show on out" for `listener`.
    ///
    /// With `toggle_on_hover` off nothing is registered and the label stays visible.
    pub fn bind(
        listener: impl Into<String>,
        registry: &mut dyn HoverEventRegistry,
        toggle_on_hover: bool,
    ) -> KpiResult<Self> {
        let listener = listener.into();
        if toggle_on_hover {
            registry.on(HoverEvent::MouseMove, &listener, HoverReaction::Hide)?;
            registry.on(HoverEvent::MouseOut, &listener, HoverReaction::Show)?;
        }
        Ok(Self {
            listener,
            visible: true,
        })
    }

    #[must_use]
    pub fn listener(&self) -> &str {
        &self.listener
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn apply(&mut self, reaction: HoverReaction) {
        self.visible = reaction == HoverReaction::Show;
    }

    /// Applies the reactions `dispatcher` holds for this listener and `event`.
    pub fn handle(&mut self, dispatcher: &HoverDispatcher, event: HoverEvent) {
        let reaction = dispatcher
            .dispatch(event)
            .filter(|binding| binding.listener == self.listener)
            .map(|binding| binding.reaction)
            .last();
        if let Some(reaction) = reaction {
            self.apply(reaction);
        }
    }
}
