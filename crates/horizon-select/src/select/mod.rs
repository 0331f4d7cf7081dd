//! The select widget facade.
//!
//! A [`Select`] binds to a root element holding a native `select` and a
//! `[data-select-ui]` container. It renders a button and floating dropdown
//! (single mode) or an inline options list (multiple mode) into the
//! container, while the native control keeps owning the value.
//!
//! # Lifecycle
//!
//! ```text
//! build ── resolve + rebuild ──► mount ── listeners + watcher ──► unmount
//! ```
//!
//! The dropdown panel is attached to the dropdown container only while open.
//! Attachment is the open state:
//!
//! - **Closed**: the panel exists but is detached.
//! - **Opening**: the panel is attached and waits for itself and the options
//!   list inside it to become ready, in either order.
//! - **Open**: both are ready; the panel is tethered to the UI container and
//!   sized against the viewport.
//!
//! Every public method runs as a document task, so anything it triggers
//! (events, readiness callbacks, mutation records) has settled by the time
//! it returns.

mod builder;
mod dropdown;
mod input;
mod sizing;
mod ui;
mod watcher;

use std::sync::{Arc, Weak};

use horizon_select_core::logging::targets;
use horizon_select_core::{
    ConnectionGuard, Document, ElementId, Event, ObserverId, SubscriptionSet, TimerId,
};
use parking_lot::Mutex;

pub use builder::SelectBuilder;
pub use sizing::suggested_height;

use crate::accessibility::AccessibilityStrategy;
use crate::config::SelectConfig;
use crate::error::Result;
use crate::native::NativeSelect;
use crate::widgets::{OptionsList, SelectButton, SubWidgetFactory, TetheredPanel, VerticalAlignment};

/// Selection mode, derived from the native control's `multiple` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectMode {
    Single,
    Multiple,
}

/// Where the dropdown is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropdownState {
    /// Not attached to the document.
    Closed,
    /// Attached, waiting for the panel and options list to become ready.
    Opening,
    /// Tethered and sized.
    Open,
}

#[derive(Default)]
pub(crate) struct SelectState {
    pub(crate) native: Option<NativeSelect>,
    pub(crate) ui_container: Option<ElementId>,
    pub(crate) button: Option<Arc<dyn SelectButton>>,
    pub(crate) dropdown: Option<Arc<dyn TetheredPanel>>,
    pub(crate) options: Option<Arc<dyn OptionsList>>,
    pub(crate) dropdown_position: Option<VerticalAlignment>,
    pub(crate) blur_timer: Option<TimerId>,
    pub(crate) min_bottom_space: f32,
    /// Bumped whenever the panel is opened, closed or rebuilt.
    pub(crate) generation: u64,
    /// Generation whose open completed initialization.
    pub(crate) initialized: Option<u64>,
    pub(crate) alignment_connection: Option<ConnectionGuard>,
    pub(crate) mounted: bool,
    pub(crate) window_subscriptions: SubscriptionSet,
    pub(crate) element_subscriptions: SubscriptionSet,
    pub(crate) observer: Option<ObserverId>,
}

pub(crate) struct SelectInner {
    pub(crate) doc: Document,
    pub(crate) root: ElementId,
    /// Wrapper between the panel and the options list. Created once and
    /// re-parented on every rebuild.
    pub(crate) dropdown_content: ElementId,
    pub(crate) dropdown_container: ElementId,
    pub(crate) config: SelectConfig,
    pub(crate) accessibility: Box<dyn AccessibilityStrategy>,
    pub(crate) factory: Arc<dyn SubWidgetFactory>,
    pub(crate) state: Mutex<SelectState>,
    pub(crate) this: Weak<SelectInner>,
}

impl SelectInner {
    /// The native control, if resolved.
    pub(crate) fn native(&self) -> Option<NativeSelect> {
        self.state.lock().native.clone()
    }

    pub(crate) fn is_multiple(&self) -> bool {
        self.native().is_some_and(|native| native.is_multiple())
    }

    /// Whether the panel is attached to the document.
    pub(crate) fn is_dropdown_attached(&self) -> bool {
        let panel = self.state.lock().dropdown.as_ref().map(|panel| panel.element());
        panel.is_some_and(|panel| self.doc.parent(panel).is_some())
    }

    /// The button, once its element is ready.
    pub(crate) fn ready_button(&self) -> Option<Arc<dyn SelectButton>> {
        let button = self.state.lock().button.clone()?;
        self.doc.is_ready(button.element()).then_some(button)
    }

    /// The panel, once its element is ready.
    pub(crate) fn ready_dropdown(&self) -> Option<Arc<dyn TetheredPanel>> {
        let dropdown = self.state.lock().dropdown.clone()?;
        self.doc.is_ready(dropdown.element()).then_some(dropdown)
    }

    /// Cancel a timer unless it already fired.
    pub(crate) fn cancel_timer(&self, timer: TimerId) {
        if self.doc.is_timer_active(timer)
            && let Err(err) = self.doc.clear_timeout(timer)
        {
            tracing::warn!(target: targets::INPUT, %err, "cancelling timer failed");
        }
    }

    /// Wrap a fallible handler into a document listener that holds the
    /// widget weakly and logs failures.
    pub(crate) fn handler<F>(&self, f: F) -> impl Fn(&mut Event) + Send + Sync + 'static + use<F>
    where
        F: Fn(&SelectInner, &mut Event) -> Result<()> + Send + Sync + 'static,
    {
        let this = self.this.clone();
        move |event: &mut Event| {
            if let Some(inner) = this.upgrade()
                && let Err(err) = f(&inner, event)
            {
                tracing::warn!(
                    target: targets::INPUT,
                    %err,
                    event = event.event_type().name(),
                    "select handler failed"
                );
            }
        }
    }

    pub(crate) fn mount(&self) -> Result<()> {
        if self.state.lock().mounted {
            return Ok(());
        }
        let resolved = {
            let state = self.state.lock();
            state.native.is_some() && state.ui_container.is_some()
        };
        if !resolved && self.resolve() {
            self.rebuild()?;
        } else {
            self.reconcile_mode()?;
        }

        self.attach_window_listeners();
        self.attach_element_listeners();
        self.start_watching()?;
        self.state.lock().mounted = true;
        self.accessibility.on_mount();
        tracing::debug!(target: targets::SELECT, root = ?self.root, "select mounted");
        Ok(())
    }

    pub(crate) fn unmount(&self) {
        if self.is_dropdown_attached() {
            self.detach_dropdown();
        }

        let (was_mounted, blur_timer, observer, subscriptions, alignment) = {
            let mut state = self.state.lock();
            state.generation += 1;
            (
                std::mem::replace(&mut state.mounted, false),
                state.blur_timer.take(),
                state.observer.take(),
                (
                    std::mem::take(&mut state.window_subscriptions),
                    std::mem::take(&mut state.element_subscriptions),
                ),
                state.alignment_connection.take(),
            )
        };
        if let Some(timer) = blur_timer {
            self.cancel_timer(timer);
        }
        if let Some(observer) = observer {
            self.doc.disconnect_observer(observer);
        }
        drop(subscriptions);
        drop(alignment);

        if was_mounted {
            self.accessibility.on_unmount();
            tracing::debug!(target: targets::SELECT, root = ?self.root, "select unmounted");
        }
    }
}

/// A styleable dropdown select bound to one native control.
///
/// Dropping the widget unmounts it.
///
/// # Example
///
/// ```
/// use horizon_select::{Select, DropdownState};
/// use horizon_select::core::Document;
///
/// let doc = Document::new();
/// let root = doc.create_element("div");
/// let native = doc.create_element("select");
/// for label in ["Apple", "Pear"] {
///     let option = doc.create_element("option");
///     doc.set_text(option, label).unwrap();
///     doc.append_child(native, option).unwrap();
/// }
/// let ui = doc.create_element("span");
/// doc.set_attribute(ui, "data-select-ui", "").unwrap();
/// doc.append_child(root, native).unwrap();
/// doc.append_child(root, ui).unwrap();
/// doc.append_child(doc.body(), root).unwrap();
///
/// let select = Select::new(&doc, root).unwrap();
/// select.mount().unwrap();
///
/// select.toggle();
/// assert_eq!(select.dropdown_state(), DropdownState::Open);
/// doc.click(doc.body());
/// assert_eq!(select.dropdown_state(), DropdownState::Closed);
/// ```
pub struct Select {
    inner: Arc<SelectInner>,
}

impl Select {
    /// Bind a widget with the default configuration.
    pub fn new(doc: &Document, root: ElementId) -> Result<Self> {
        Self::builder(doc, root).build()
    }

    pub fn builder(doc: &Document, root: ElementId) -> SelectBuilder {
        SelectBuilder::new(doc, root)
    }

    pub fn document(&self) -> &Document {
        &self.inner.doc
    }

    pub fn root(&self) -> ElementId {
        self.inner.root
    }

    pub fn config(&self) -> &SelectConfig {
        &self.inner.config
    }

    /// Start listening for input and watching the subtree. Calling it again
    /// while mounted does nothing.
    pub fn mount(&self) -> Result<()> {
        let inner = &self.inner;
        inner.doc.run_task(|| inner.mount())
    }

    /// Detach the dropdown and drop every subscription, timer and observer.
    /// Safe to call at any time, including before [`mount`](Self::mount).
    pub fn unmount(&self) {
        let inner = &self.inner;
        inner.doc.run_task(|| inner.unmount());
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.state.lock().mounted
    }

    /// Tear down and recreate the UI for the control's current mode.
    pub fn rebuild(&self) -> Result<()> {
        let inner = &self.inner;
        inner.doc.run_task(|| inner.rebuild())
    }

    /// Open the dropdown if closed, close it if open.
    ///
    /// Behaves like a click on the UI container: it focuses the native
    /// control and does nothing while the control is disabled or in
    /// multiple mode. Ignored while unmounted.
    pub fn toggle(&self) {
        let inner = &self.inner;
        inner.doc.run_task(|| inner.toggle_dropdown(None));
    }

    /// Close the dropdown if it is open.
    pub fn close(&self) {
        let inner = &self.inner;
        inner.doc.run_task(|| inner.close_dropdown());
    }

    /// Whether the dropdown panel is attached.
    pub fn is_open(&self) -> bool {
        self.inner.is_dropdown_attached()
    }

    pub fn dropdown_state(&self) -> DropdownState {
        if !self.inner.is_dropdown_attached() {
            return DropdownState::Closed;
        }
        let state = self.inner.state.lock();
        if state.initialized == Some(state.generation) {
            DropdownState::Open
        } else {
            DropdownState::Opening
        }
    }

    /// Current mode, or `None` while the native control is unresolved.
    pub fn mode(&self) -> Option<SelectMode> {
        self.inner.native().map(|native| {
            if native.is_multiple() {
                SelectMode::Multiple
            } else {
                SelectMode::Single
            }
        })
    }

    pub fn min_bottom_space(&self) -> f32 {
        self.inner.state.lock().min_bottom_space
    }

    /// Space the dropdown wants below the UI before it opens upward. Applies
    /// to an already initialized panel immediately. Negative or non-finite
    /// values are rejected and leave the current value in place.
    pub fn set_min_bottom_space(&self, pixels: f32) -> Result<()> {
        let inner = &self.inner;
        inner.doc.run_task(|| inner.set_min_bottom_space(pixels))
    }

    pub fn native(&self) -> Option<NativeSelect> {
        self.inner.native()
    }

    pub fn ui_container(&self) -> Option<ElementId> {
        self.inner.state.lock().ui_container
    }

    pub fn button(&self) -> Option<Arc<dyn SelectButton>> {
        self.inner.state.lock().button.clone()
    }

    /// The dropdown panel (single mode).
    pub fn panel(&self) -> Option<Arc<dyn TetheredPanel>> {
        self.inner.state.lock().dropdown.clone()
    }

    /// The options list: inside the panel in single mode, inline in
    /// multiple mode.
    pub fn options(&self) -> Option<Arc<dyn OptionsList>> {
        self.inner.state.lock().options.clone()
    }

    pub fn dropdown_content(&self) -> ElementId {
        self.inner.dropdown_content
    }

    pub fn dropdown_container(&self) -> ElementId {
        self.inner.dropdown_container
    }

    /// Last vertical alignment reported by the open panel.
    pub fn dropdown_position(&self) -> Option<VerticalAlignment> {
        self.inner.state.lock().dropdown_position
    }
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("root", &self.inner.root)
            .field("mounted", &self.is_mounted())
            .field("mode", &self.mode())
            .field("dropdown", &self.dropdown_state())
            .finish()
    }
}

impl Drop for Select {
    fn drop(&mut self) {
        self.unmount();
    }
}
