//! Subtree watching for mode flips.

use horizon_select_core::logging::targets;
use horizon_select_core::{MutationRecord, ObserverOptions};

use super::SelectInner;
use crate::error::Result;
use crate::names;

impl SelectInner {
    pub(crate) fn start_watching(&self) -> Result<()> {
        let this = self.this.clone();
        let observer = self.doc.observe(
            self.root,
            ObserverOptions::new()
                .child_list()
                .attributes()
                .character_data()
                .subtree()
                .attribute_filter(names::WATCHED_ATTRIBUTES),
            move |records| {
                if let Some(inner) = this.upgrade() {
                    inner.on_dom_mutated(records);
                }
            },
        )?;
        let previous = self.state.lock().observer.replace(observer);
        if let Some(previous) = previous {
            self.doc.disconnect_observer(previous);
        }
        Ok(())
    }

    /// Rebuild only when the mode no longer matches the UI. The UI's own
    /// output lives in the watched subtree, so most batches change nothing.
    fn on_dom_mutated(&self, records: &[MutationRecord]) {
        tracing::trace!(target: targets::WATCHER, records = records.len(), "subtree mutated");

        let unresolved = {
            let state = self.state.lock();
            state.native.is_none() || state.ui_container.is_none()
        };
        if unresolved {
            if self.resolve() {
                if let Err(err) = self.rebuild() {
                    tracing::warn!(target: targets::WATCHER, %err, "rebuild after resolve failed");
                }
                if self.state.lock().mounted {
                    self.attach_element_listeners();
                }
            }
            return;
        }

        if let Err(err) = self.reconcile_mode() {
            tracing::warn!(target: targets::WATCHER, %err, "rebuild after mode change failed");
        }
    }

    /// Rebuild if a button exists in multiple mode or is missing in single
    /// mode.
    pub(crate) fn reconcile_mode(&self) -> Result<()> {
        let (native, has_button) = {
            let state = self.state.lock();
            (state.native.clone(), state.button.is_some())
        };
        let Some(native) = native else {
            return Ok(());
        };
        let multiple = native.is_multiple();
        if multiple != has_button {
            return Ok(());
        }
        tracing::debug!(target: targets::WATCHER, multiple, "select mode changed");
        self.rebuild()
    }
}
