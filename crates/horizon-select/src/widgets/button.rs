//! Default single-mode button.

use std::sync::{Arc, Weak};

use horizon_select_core::logging::targets;
use horizon_select_core::{Document, ElementId, EventType, ObserverId, ObserverOptions, Subscription};
use parking_lot::Mutex;

use super::{OpeningPosition, SelectButton};
use crate::error::Result;
use crate::names;
use crate::native::NativeSelect;

struct ButtonState {
    select: Option<NativeSelect>,
    change_subscription: Option<Subscription>,
    observer: Option<ObserverId>,
}

/// Shows the selected option's label and reflects open state and opening
/// direction as attributes.
///
/// The label is re-rendered whenever the bound control dispatches `change`
/// and whenever its options, their labels or the `selected` and `disabled`
/// attributes are mutated directly.
pub struct DefaultButton {
    doc: Document,
    element: ElementId,
    this: Weak<DefaultButton>,
    state: Mutex<ButtonState>,
}

impl DefaultButton {
    pub fn new(doc: &Document) -> Arc<Self> {
        let element = doc.create_custom_element(names::BUTTON_TAG);
        Arc::new_cyclic(|this| Self {
            doc: doc.clone(),
            element,
            this: this.clone(),
            state: Mutex::new(ButtonState {
                select: None,
                change_subscription: None,
                observer: None,
            }),
        })
    }

    /// The displayed label.
    pub fn label(&self) -> String {
        self.doc.text(self.element).unwrap_or_default()
    }

    fn render(&self) -> Result<()> {
        let Some(select) = self.state.lock().select.clone() else {
            return Ok(());
        };
        let label = select.selected_label().unwrap_or_default();
        if self.doc.text(self.element).as_deref() != Some(label.as_str()) {
            self.doc.set_text(self.element, &label)?;
        }
        let disabled = select.is_disabled();
        if disabled != self.doc.has_attribute(self.element, names::DISABLED) {
            self.doc
                .toggle_attribute(self.element, names::DISABLED, disabled)?;
        }
        Ok(())
    }

    fn report(&self, result: Result<()>) {
        if let Err(err) = result {
            tracing::warn!(target: targets::SELECT, %err, element = ?self.element, "button update failed");
        }
    }
}

impl SelectButton for DefaultButton {
    fn element(&self) -> ElementId {
        self.element
    }

    fn set_select_element(&self, select: &NativeSelect) {
        let this = self.this.clone();
        let subscription = self
            .doc
            .listen(select.element(), EventType::Change, move |_event| {
                if let Some(button) = this.upgrade() {
                    let result = button.render();
                    button.report(result);
                }
            });

        let this = self.this.clone();
        let observer = self.doc.observe(
            select.element(),
            ObserverOptions::new()
                .child_list()
                .character_data()
                .subtree()
                .attribute_filter(["disabled", "label", "selected"]),
            move |_records| {
                if let Some(button) = this.upgrade() {
                    let result = button.render();
                    button.report(result);
                }
            },
        );

        let previous = {
            let mut state = self.state.lock();
            state.select = Some(select.clone());
            state.change_subscription = Some(subscription);
            std::mem::replace(&mut state.observer, observer.ok())
        };
        if let Some(previous) = previous {
            self.doc.disconnect_observer(previous);
        }
        self.report(self.render());
    }

    fn set_open(&self, open: bool) {
        self.report(
            self.doc
                .toggle_attribute(self.element, names::OPEN, open)
                .map_err(Into::into),
        );
    }

    fn set_opening_position(&self, position: OpeningPosition) {
        self.report(
            self.doc
                .set_attribute(self.element, names::OPENING_POSITION, position.as_str())
                .map_err(Into::into),
        );
    }
}

impl Drop for DefaultButton {
    fn drop(&mut self) {
        if let Some(observer) = self.state.get_mut().observer.take() {
            self.doc.disconnect_observer(observer);
        }
    }
}
