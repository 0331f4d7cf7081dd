//! Input arbitration between the native control and the overlay.

use horizon_select_core::logging::targets;
use horizon_select_core::{ElementId, Event, EventTarget, EventType, Key};

use super::SelectInner;
use crate::config::PickerStyle;
use crate::error::Result;
use crate::names;

/// Window events that can move the UI container relative to the viewport.
const VIEWPORT_EVENTS: [EventType; 4] = [
    EventType::Resize,
    EventType::Scroll,
    EventType::Wheel,
    EventType::TouchMove,
];

impl SelectInner {
    /// Outside-click closing and viewport tracking.
    pub(crate) fn attach_window_listeners(&self) {
        let mut subscriptions = Vec::with_capacity(1 + VIEWPORT_EVENTS.len());
        subscriptions.push(self.doc.listen(
            EventTarget::Window,
            EventType::Click,
            self.handler(|inner, _| {
                inner.close_dropdown();
                Ok(())
            }),
        ));
        for event_type in VIEWPORT_EVENTS {
            subscriptions.push(self.doc.listen(
                EventTarget::Window,
                event_type,
                self.handler(|inner, _| {
                    inner.on_viewport_changed();
                    Ok(())
                }),
            ));
        }
        self.state.lock().window_subscriptions.extend(subscriptions);
    }

    /// Listeners on the UI container and the native control. Does nothing
    /// until both are resolved.
    pub(crate) fn attach_element_listeners(&self) {
        let (native, container) = {
            let state = self.state.lock();
            match (state.native.clone(), state.ui_container) {
                (Some(native), Some(container)) => (native.element(), container),
                _ => return,
            }
        };

        let subscriptions = [
            self.doc.listen(container, EventType::Click, self.handler(Self::on_ui_click)),
            self.doc.listen(native, EventType::Change, self.handler(Self::on_change)),
            self.doc.listen(native, EventType::Focus, self.handler(Self::on_focus)),
            self.doc.listen(native, EventType::Blur, self.handler(Self::on_blur)),
            self.doc.listen(native, EventType::KeyDown, self.handler(Self::on_key_down)),
        ];
        let mut state = self.state.lock();
        state.element_subscriptions.clear();
        state.element_subscriptions.extend(subscriptions);
    }

    fn on_ui_click(&self, event: &mut Event) -> Result<()> {
        self.accessibility.on_ui_clicked(event);
        self.toggle_dropdown(Some(event));
        Ok(())
    }

    fn on_change(&self, _event: &mut Event) -> Result<()> {
        self.accessibility.on_change();
        let Some(native) = self.native() else {
            return Ok(());
        };
        if native.is_multiple() || native.has_focus() {
            return Ok(());
        }
        native.focus()
    }

    fn on_focus(&self, _event: &mut Event) -> Result<()> {
        let timer = self.state.lock().blur_timer.take();
        if let Some(timer) = timer {
            self.cancel_timer(timer);
        }
        if let Some(marker) = self.active_marker_target() {
            self.doc.set_attribute(marker, names::ACTIVE, "")?;
        }
        Ok(())
    }

    fn on_blur(&self, _event: &mut Event) -> Result<()> {
        let this = self.this.clone();
        let timer = self.doc.set_timeout(self.config.blur_debounce(), move || {
            let Some(inner) = this.upgrade() else {
                return;
            };
            inner.state.lock().blur_timer = None;
            if let Some(marker) = inner.active_marker_target()
                && let Err(err) = inner.doc.remove_attribute(marker, names::ACTIVE)
            {
                tracing::warn!(target: targets::INPUT, %err, "clearing active marker failed");
            }
        });
        let previous = self.state.lock().blur_timer.replace(timer);
        if let Some(previous) = previous {
            self.cancel_timer(previous);
        }
        tracing::trace!(target: targets::INPUT, "blur debounce started");
        Ok(())
    }

    /// The button in single mode, the inline list's first element in
    /// multiple mode.
    fn active_marker_target(&self) -> Option<ElementId> {
        let (native, container, button) = {
            let state = self.state.lock();
            (
                state.native.clone()?,
                state.ui_container?,
                state.button.as_ref().map(|button| button.element()),
            )
        };
        if native.is_multiple() {
            self.doc.first_element_child(container)
        } else {
            button
        }
    }

    fn on_key_down(&self, event: &mut Event) -> Result<()> {
        let Some(key) = event.key() else {
            return Ok(());
        };
        let Some(native) = self.native() else {
            return Ok(());
        };

        let should_toggle = match key {
            Key::Escape => self.is_dropdown_attached(),
            Key::ArrowUp | Key::ArrowDown => {
                let modifier_held = self.config.open_modifier.is_held(event.modifiers());
                if !modifier_held
                    && !native.is_multiple()
                    && self.config.picker == PickerStyle::OsPopup
                {
                    event.prevent_default();
                    let delta = if key == Key::ArrowUp { -1 } else { 1 };
                    if let Some(index) = native.step_selection(delta) {
                        native.set_selected_index(Some(index))?;
                        tracing::trace!(target: targets::INPUT, index, "arrow key selection");
                        native.dispatch_change();
                    }
                    return Ok(());
                }
                modifier_held
            }
            Key::Space => {
                let exists = self.state.lock().dropdown.is_some();
                let attached = self.is_dropdown_attached();
                if attached {
                    event.prevent_default();
                }
                exists && !attached
            }
            Key::Enter => true,
            _ => false,
        };

        if should_toggle {
            event.prevent_default();
            self.toggle_dropdown(Some(event));
        }
        Ok(())
    }

    fn on_viewport_changed(&self) {
        if !self.is_dropdown_attached() {
            return;
        }
        if let Some(dropdown) = self.ready_dropdown() {
            dropdown.update_position();
        }
        self.update_dropdown_size();
    }
}
