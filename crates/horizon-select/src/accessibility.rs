//! Pluggable accessibility behaviour.
//!
//! A [`Select`](crate::Select) forwards a fixed set of lifecycle and input
//! notifications to its [`AccessibilityStrategy`]. The strategy is chosen
//! when the widget is built; [`NoAccessibility`] ignores everything.

use horizon_select_core::{AttributeChanges, Event};

/// Hooks a select widget calls into.
///
/// Every method has a no-op default, so implementations only override what
/// they need. Hooks run while the widget is mid-update and must not call
/// back into the [`Select`](crate::Select) synchronously.
pub trait AccessibilityStrategy: Send + Sync {
    /// The dropdown opened or closed.
    fn set_open(&self, _open: bool) {}

    /// Adjust the attributes applied to the root once the UI is built.
    fn generate_meta_attributes(&self, base: AttributeChanges) -> AttributeChanges {
        base
    }

    fn on_mount(&self) {}

    fn on_unmount(&self) {}

    /// The UI container received a click, before the widget handles it.
    fn on_ui_clicked(&self, _event: &Event) {}

    /// The native control reported a change.
    fn on_change(&self) {}
}

/// The default strategy: no accessibility augmentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccessibility;

impl AccessibilityStrategy for NoAccessibility {}
