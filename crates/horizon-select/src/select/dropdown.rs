//! Dropdown lifecycle: open, close, the readiness join and alignment
//! tracking.

use horizon_select_core::logging::targets;
use horizon_select_core::{Event, JoinBarrier};

use super::SelectInner;
use crate::config::validate_min_bottom_space;
use crate::error::Result;
use crate::widgets::{OpeningPosition, VerticalAlignment};

impl SelectInner {
    /// Open the dropdown if detached, close it if attached.
    ///
    /// The native control receives focus first. Disabled controls ignore
    /// the request, and multiple mode stops after focusing. An unmounted
    /// widget has no listeners to close the panel again, so it never opens.
    pub(crate) fn toggle_dropdown(&self, event: Option<&mut Event>) {
        if !self.state.lock().mounted {
            tracing::trace!(target: targets::DROPDOWN, "toggle ignored while unmounted");
            return;
        }
        let Some(native) = self.native() else {
            return;
        };
        if native.is_disabled() {
            return;
        }
        if let Err(err) = native.focus() {
            tracing::warn!(target: targets::DROPDOWN, %err, "focusing native control failed");
        }
        if native.is_multiple() {
            return;
        }

        if let Some(event) = event {
            event.stop_propagation();
        }
        let result = if self.is_dropdown_attached() {
            self.detach_dropdown();
            Ok(())
        } else {
            self.open_dropdown()
        };
        if let Err(err) = result {
            tracing::warn!(target: targets::DROPDOWN, %err, "dropdown toggle failed");
        }
    }

    fn open_dropdown(&self) -> Result<()> {
        let (dropdown, options) = {
            let state = self.state.lock();
            match (state.dropdown.clone(), state.options.clone()) {
                (Some(dropdown), Some(options)) => (dropdown, options),
                _ => return Ok(()),
            }
        };

        if let Some(button) = self.ready_button() {
            button.set_open(true);
        }
        self.accessibility.set_open(true);
        self.doc
            .append_child(self.dropdown_container, dropdown.element())?;

        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.generation
        };
        tracing::debug!(target: targets::DROPDOWN, generation, "dropdown opening");

        let this = self.this.clone();
        let join = JoinBarrier::new(2, move || {
            if let Some(inner) = this.upgrade() {
                inner.init_dropdown(generation);
            }
        });
        let arrival = join.clone();
        self.doc
            .await_ready(dropdown.element(), move || arrival.arrive())?;
        self.doc
            .await_ready(options.element(), move || join.arrive())?;
        Ok(())
    }

    /// Second half of opening, once the panel and options list are ready.
    fn init_dropdown(&self, generation: u64) {
        let (dropdown, options, native, container, min_bottom_space) = {
            let state = self.state.lock();
            if state.generation != generation {
                tracing::trace!(target: targets::DROPDOWN, generation, "discarding stale dropdown init");
                return;
            }
            match (
                state.dropdown.clone(),
                state.options.clone(),
                state.native.clone(),
                state.ui_container,
            ) {
                (Some(dropdown), Some(options), Some(native), Some(container)) => {
                    (dropdown, options, native, container, state.min_bottom_space)
                }
                _ => return,
            }
        };
        if !self.is_dropdown_attached() {
            return;
        }

        dropdown.set_tether(container);
        options.set_options(&native);
        dropdown.set_min_bottom_space(min_bottom_space);

        let this = self.this.clone();
        let doc = self.doc.downgrade();
        let connection = dropdown
            .vertical_alignment_changed()
            .connect_scoped(move |&alignment| {
                let this = this.clone();
                let Some(doc) = doc.upgrade() else {
                    return;
                };
                doc.post_task(move || {
                    if let Some(inner) = this.upgrade() {
                        inner.on_dropdown_position_change(alignment);
                    }
                });
                // Emitted by a host call outside any task.
                if !doc.is_busy() {
                    doc.flush();
                }
            });
        {
            let mut state = self.state.lock();
            state.alignment_connection = Some(connection);
            state.initialized = Some(generation);
        }
        tracing::debug!(target: targets::DROPDOWN, generation, "dropdown open");

        self.on_dropdown_position_change(dropdown.vertical_alignment());
    }

    /// Close the dropdown. Multiple mode and a detached panel ignore it.
    pub(crate) fn close_dropdown(&self) {
        if self.is_multiple() || !self.is_dropdown_attached() {
            return;
        }
        self.detach_dropdown();
    }

    pub(crate) fn detach_dropdown(&self) {
        let dropdown = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.initialized = None;
            state.alignment_connection = None;
            state.dropdown.clone()
        };
        let Some(dropdown) = dropdown else {
            return;
        };

        if let Some(button) = self.ready_button() {
            button.set_open(false);
        }
        self.accessibility.set_open(false);
        if let Err(err) = self.doc.remove(dropdown.element()) {
            tracing::warn!(target: targets::DROPDOWN, %err, "detaching dropdown failed");
        }
        tracing::debug!(target: targets::DROPDOWN, "dropdown closed");
    }

    /// React to the panel opening on a different side of its anchor.
    pub(crate) fn on_dropdown_position_change(&self, alignment: VerticalAlignment) {
        self.state.lock().dropdown_position = Some(alignment);
        if let Some(button) = self.ready_button() {
            button.set_opening_position(OpeningPosition::from(alignment));
        }
        self.update_dropdown_size();
    }

    pub(crate) fn set_min_bottom_space(&self, pixels: f32) -> Result<()> {
        validate_min_bottom_space(pixels)?;
        self.state.lock().min_bottom_space = pixels;
        if let Some(dropdown) = self.ready_dropdown() {
            dropdown.set_min_bottom_space(pixels);
        }
        Ok(())
    }
}
