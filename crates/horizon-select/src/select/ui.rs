//! UI construction: resolve the bound elements and (re)build the overlay.

use std::sync::Arc;

use horizon_select_core::logging::{DocumentTreeDebug, TreeFormatOptions, targets};
use horizon_select_core::{AttributeChanges, ElementId, Event};

use super::SelectInner;
use crate::error::Result;
use crate::names;
use crate::native::NativeSelect;

impl SelectInner {
    /// Look up the native control and UI container under the root, keeping
    /// whichever is already known. Returns whether anything new was found
    /// and both are now resolved.
    pub(crate) fn resolve(&self) -> bool {
        let (has_native, has_container) = {
            let state = self.state.lock();
            (state.native.is_some(), state.ui_container.is_some())
        };
        let native = (!has_native)
            .then(|| {
                self.doc.find_descendant(self.root, |element| {
                    element.tag() == "select"
                })
            })
            .flatten();
        let container = (!has_container)
            .then(|| {
                self.doc.find_descendant(self.root, |element| {
                    element.has_attribute(names::UI_CONTAINER)
                })
            })
            .flatten();

        let mut state = self.state.lock();
        let found = native.is_some() || container.is_some();
        if let Some(native) = native {
            state.native = Some(NativeSelect::new(self.doc.clone(), native));
        }
        if let Some(container) = container {
            state.ui_container = Some(container);
        }
        let resolved = state.native.is_some() && state.ui_container.is_some();
        if found {
            tracing::debug!(
                target: targets::SELECT,
                root = ?self.root,
                resolved,
                "select elements resolved"
            );
        }
        found && resolved
    }

    /// Tear down the overlay and build it again for the current mode.
    ///
    /// Does nothing until both the native control and the UI container are
    /// resolved.
    #[tracing::instrument(skip_all, target = "horizon_select::select", level = "debug")]
    pub(crate) fn rebuild(&self) -> Result<()> {
        let (native, container) = {
            let state = self.state.lock();
            match (state.native.clone(), state.ui_container) {
                (Some(native), Some(container)) => (native, container),
                _ => return Ok(()),
            }
        };

        self.clear_ui(container)?;
        if native.is_multiple() {
            self.create_multi_ui(&native, container)?;
        } else {
            self.create_single_ui(container)?;
        }
        self.finish_initialization(&native)?;

        if tracing::enabled!(target: targets::SELECT, tracing::Level::TRACE) {
            let tree = DocumentTreeDebug::with_options(TreeFormatOptions::minimal())
                .format_subtree(&self.doc, self.root);
            tracing::trace!(target: targets::SELECT, "ui rebuilt\n{tree}");
        }
        Ok(())
    }

    fn clear_ui(&self, container: ElementId) -> Result<()> {
        if self.is_dropdown_attached() {
            self.detach_dropdown();
        }
        for child in self.doc.children(container) {
            self.doc.destroy(child)?;
        }
        for child in self.doc.children(self.dropdown_content) {
            self.doc.destroy(child)?;
        }

        let (dropdown, previous) = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.initialized = None;
            state.dropdown_position = None;
            let previous = (
                state.button.take(),
                state.options.take(),
                state.alignment_connection.take(),
            );
            (state.dropdown.take(), previous)
        };
        if let Some(dropdown) = dropdown {
            let panel = dropdown.element();
            if self.doc.parent(panel).is_some() {
                self.doc.remove(panel)?;
            }
            if self.doc.parent(self.dropdown_content) == Some(panel) {
                self.doc.remove(self.dropdown_content)?;
            }
            self.doc.destroy(panel)?;
        }
        drop(previous);
        Ok(())
    }

    fn create_single_ui(&self, container: ElementId) -> Result<()> {
        let button = self.factory.create_button(&self.doc);
        let button_element = button.element();
        self.state.lock().button = Some(button);
        self.doc.append_child(container, button_element)?;

        let this = self.this.clone();
        self.doc.await_ready(button_element, move || {
            if let Some(inner) = this.upgrade() {
                inner.on_button_ready(button_element);
            }
        })?;

        let options = self.factory.create_options_list(&self.doc);
        let dropdown = self.factory.create_tethered_panel(&self.doc);
        self.doc
            .append_child(dropdown.element(), self.dropdown_content)?;
        self.doc
            .append_child(self.dropdown_content, options.element())?;

        let mut state = self.state.lock();
        state.options = Some(options);
        state.dropdown = Some(dropdown);
        Ok(())
    }

    fn on_button_ready(&self, element: ElementId) {
        let Some(button) = self
            .state
            .lock()
            .button
            .clone()
            .filter(|button| button.element() == element)
        else {
            tracing::trace!(target: targets::SELECT, ?element, "stale button became ready");
            return;
        };
        let Some(native) = self.native() else {
            return;
        };

        button.set_select_element(&native);
        if self.is_dropdown_attached() {
            button.set_open(true);
        }
        let position = self.state.lock().dropdown_position;
        if let Some(position) = position {
            self.on_dropdown_position_change(position);
        }
    }

    fn create_multi_ui(&self, native: &NativeSelect, container: ElementId) -> Result<()> {
        let options = self.factory.create_options_list(&self.doc);
        let element = options.element();
        self.doc.append_child(container, element)?;
        self.state.lock().options = Some(Arc::clone(&options));

        let this = self.this.clone();
        let native = native.clone();
        self.doc.await_ready(element, move || {
            let Some(inner) = this.upgrade() else {
                return;
            };
            let current = inner
                .state
                .lock()
                .options
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &options));
            if current {
                options.set_options(&native);
            }
        })?;
        Ok(())
    }

    fn finish_initialization(&self, native: &NativeSelect) -> Result<()> {
        let mut attributes = AttributeChanges::new();
        attributes.insert(names::READY.to_owned(), Some(String::new()));
        attributes.insert(
            names::SINGLE.to_owned(),
            (!native.is_multiple()).then(String::new),
        );
        let attributes = self.accessibility.generate_meta_attributes(attributes);

        if self.doc.has_attribute(self.root, names::STANDALONE) {
            for (name, value) in &attributes {
                match value {
                    Some(value) => self.doc.set_attribute(self.root, name, value)?,
                    None => self.doc.remove_attribute(self.root, name)?,
                }
            }
        } else {
            self.doc
                .dispatch_event(self.root, Event::custom(names::READY_EVENT, attributes));
        }
        tracing::debug!(
            target: targets::SELECT,
            root = ?self.root,
            multiple = native.is_multiple(),
            "select UI built"
        );
        Ok(())
    }
}
