//! Event objects dispatched through the document tree.

use std::collections::BTreeMap;

use super::element::ElementId;
use crate::keyboard::{Key, KeyboardModifiers};

/// The kind of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Change,
    Focus,
    Blur,
    KeyDown,
    Resize,
    Scroll,
    Wheel,
    TouchMove,
    /// An application-defined event, identified by name.
    Custom(String),
}

impl EventType {
    /// Create a custom event type.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// The DOM-style event name.
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Change => "change",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::KeyDown => "keydown",
            Self::Resize => "resize",
            Self::Scroll => "scroll",
            Self::Wheel => "wheel",
            Self::TouchMove => "touchmove",
            Self::Custom(name) => name,
        }
    }
}

/// Where an event is dispatched or a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The global window, above the document element in every propagation path.
    Window,
    Element(ElementId),
}

impl EventTarget {
    /// The element, if this target is one.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Element(id) => Some(*id),
            Self::Window => None,
        }
    }
}

impl From<ElementId> for EventTarget {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

/// Dispatch phase an event is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// A set of attribute changes; `None` removes the attribute.
pub type AttributeChanges = BTreeMap<String, Option<String>>;

/// Event payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventDetail {
    #[default]
    None,
    /// Key press payload of `keydown` events.
    Key {
        key: Key,
        modifiers: KeyboardModifiers,
    },
    /// Attribute changes carried by a custom notification.
    Attributes(AttributeChanges),
}

/// An event travelling through the document.
#[derive(Debug, Clone)]
pub struct Event {
    event_type: EventType,
    pub(crate) target: EventTarget,
    pub(crate) current_target: EventTarget,
    pub(crate) phase: EventPhase,
    bubbles: bool,
    cancelable: bool,
    default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    detail: EventDetail,
}

impl Event {
    /// Create an event. The target is assigned at dispatch.
    pub fn new(event_type: EventType, bubbles: bool, cancelable: bool) -> Self {
        Self {
            event_type,
            target: EventTarget::Window,
            current_target: EventTarget::Window,
            phase: EventPhase::None,
            bubbles,
            cancelable,
            default_prevented: false,
            propagation_stopped: false,
            detail: EventDetail::None,
        }
    }

    /// A bubbling, cancelable click.
    pub fn click() -> Self {
        Self::new(EventType::Click, true, true)
    }

    /// A bubbling, cancelable change notification.
    pub fn change() -> Self {
        Self::new(EventType::Change, true, true)
    }

    /// A non-bubbling focus notification.
    pub fn focus() -> Self {
        Self::new(EventType::Focus, false, false)
    }

    /// A non-bubbling blur notification.
    pub fn blur() -> Self {
        Self::new(EventType::Blur, false, false)
    }

    /// A bubbling, cancelable key press.
    pub fn key_down(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self::new(EventType::KeyDown, true, true).with_detail(EventDetail::Key { key, modifiers })
    }

    /// A bubbling, cancelable custom notification carrying attribute changes.
    pub fn custom(name: impl Into<String>, attributes: AttributeChanges) -> Self {
        Self::new(EventType::custom(name), true, true)
            .with_detail(EventDetail::Attributes(attributes))
    }

    /// Attach a payload.
    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// The target the event was dispatched to.
    pub fn target(&self) -> EventTarget {
        self.target
    }

    /// The target whose listener is currently running.
    pub fn current_target(&self) -> EventTarget {
        self.current_target
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Suppress the default action. Ignored for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop propagation to further targets. Listeners on the current target
    /// still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut EventDetail {
        &mut self.detail
    }

    /// The pressed key of a `keydown` event.
    pub fn key(&self) -> Option<Key> {
        match self.detail {
            EventDetail::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Modifier state of a `keydown` event; no modifiers for other events.
    pub fn modifiers(&self) -> KeyboardModifiers {
        match self.detail {
            EventDetail::Key { modifiers, .. } => modifiers,
            _ => KeyboardModifiers::NONE,
        }
    }

    /// Attribute payload of a custom notification.
    pub fn attributes(&self) -> Option<&AttributeChanges> {
        match &self.detail {
            EventDetail::Attributes(attributes) => Some(attributes),
            _ => None,
        }
    }

    /// Mutable attribute payload, letting a listener rewrite the change set.
    pub fn attributes_mut(&mut self) -> Option<&mut AttributeChanges> {
        match &mut self.detail {
            EventDetail::Attributes(attributes) => Some(attributes),
            _ => None,
        }
    }
}
