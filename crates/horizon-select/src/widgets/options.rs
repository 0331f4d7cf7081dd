//! Default options list.

use std::sync::{Arc, Weak};

use horizon_select_core::logging::targets;
use horizon_select_core::{
    Document, ElementId, Event, EventType, ObserverId, ObserverOptions, SubscriptionSet,
};
use parking_lot::Mutex;

use super::OptionsList;
use crate::error::Result;
use crate::names;
use crate::native::NativeSelect;

#[derive(Default)]
struct ListState {
    select: Option<NativeSelect>,
    subscriptions: SubscriptionSet,
    observer: Option<ObserverId>,
}

/// Mirrors the native options as `select-option` children.
///
/// Each mirrored option carries its index and `data-selected` /
/// `data-disabled` markers. The list re-renders on `change` and when the
/// native option set changes. Clicking an enabled mirrored option selects it
/// (single mode) or toggles it (multiple mode) on the native control and
/// dispatches `change`.
pub struct DefaultOptionsList {
    doc: Document,
    element: ElementId,
    this: Weak<DefaultOptionsList>,
    state: Mutex<ListState>,
}

impl DefaultOptionsList {
    pub fn new(doc: &Document) -> Arc<Self> {
        let element = doc.create_custom_element(names::OPTIONS_TAG);
        Arc::new_cyclic(|this| Self {
            doc: doc.clone(),
            element,
            this: this.clone(),
            state: Mutex::new(ListState::default()),
        })
    }

    /// Mirrored option elements in order.
    pub fn items(&self) -> Vec<ElementId> {
        self.doc.children(self.element)
    }

    fn render(&self) -> Result<()> {
        let Some(select) = self.state.lock().select.clone() else {
            return Ok(());
        };
        for item in self.doc.children(self.element) {
            self.doc.destroy(item)?;
        }
        for (index, option) in select.options().into_iter().enumerate() {
            let item = self.doc.create_element(names::OPTION_TAG);
            self.doc
                .set_attribute(item, names::OPTION_INDEX, &index.to_string())?;
            self.doc
                .toggle_attribute(item, names::SELECTED, option.selected)?;
            self.doc
                .toggle_attribute(item, names::DISABLED, option.disabled)?;
            self.doc.set_text(item, &option.label)?;
            self.doc.append_child(self.element, item)?;
        }
        tracing::trace!(target: targets::SELECT, list = ?self.element, "options rendered");
        Ok(())
    }

    fn on_click(&self, event: &Event) -> Result<()> {
        let Some(select) = self.state.lock().select.clone() else {
            return Ok(());
        };
        let Some(index) = event
            .target()
            .element()
            .and_then(|item| self.doc.attribute(item, names::OPTION_INDEX))
            .and_then(|index| index.parse::<usize>().ok())
        else {
            return Ok(());
        };
        if select.is_disabled()
            || select
                .options()
                .get(index)
                .is_none_or(|option| option.disabled)
        {
            return Ok(());
        }

        if select.is_multiple() {
            select.toggle_option(index)?;
        } else {
            select.set_selected_index(Some(index))?;
        }
        select.dispatch_change();
        Ok(())
    }

    fn handler(&self, f: fn(&Self, &Event) -> Result<()>) -> impl Fn(&mut Event) + Send + Sync + use<> {
        let this = self.this.clone();
        move |event: &mut Event| {
            if let Some(list) = this.upgrade()
                && let Err(err) = f(&list, event)
            {
                tracing::warn!(target: targets::SELECT, %err, list = ?list.element, "options list update failed");
            }
        }
    }
}

impl OptionsList for DefaultOptionsList {
    fn element(&self) -> ElementId {
        self.element
    }

    fn set_options(&self, select: &NativeSelect) {
        let mut subscriptions = SubscriptionSet::new();
        subscriptions.push(self.doc.listen(
            select.element(),
            EventType::Change,
            self.handler(|list, _| list.render()),
        ));
        subscriptions.push(self.doc.listen(
            self.element,
            EventType::Click,
            self.handler(Self::on_click),
        ));

        let this = self.this.clone();
        let observer = self.doc.observe(
            select.element(),
            ObserverOptions::new()
                .child_list()
                .character_data()
                .subtree()
                .attribute_filter(["disabled", "label", "selected"]),
            move |_records| {
                if let Some(list) = this.upgrade()
                    && let Err(err) = list.render()
                {
                    tracing::warn!(target: targets::SELECT, %err, "options list re-render failed");
                }
            },
        );

        let previous = {
            let mut state = self.state.lock();
            state.select = Some(select.clone());
            state.subscriptions = subscriptions;
            std::mem::replace(&mut state.observer, observer.ok())
        };
        if let Some(previous) = previous {
            self.doc.disconnect_observer(previous);
        }

        if let Err(err) = self.render() {
            tracing::warn!(target: targets::SELECT, %err, "options list render failed");
        }
    }
}

impl Drop for DefaultOptionsList {
    fn drop(&mut self) {
        if let Some(observer) = self.state.get_mut().observer.take() {
            self.doc.disconnect_observer(observer);
        }
    }
}
