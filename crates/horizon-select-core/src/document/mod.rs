//! The live document tree that widgets render into.
//!
//! A [`Document`] is a retained tree of elements with attributes, inline
//! styles, text and host-measured layout, plus the machinery widgets react
//! to: event dispatch with capture and bubble phases, subtree mutation
//! observation, one-shot element readiness, one-shot timers on a virtual
//! clock and a single input focus.
//!
//! # Run-to-completion
//!
//! The document runs one task at a time. A task is a host entry point
//! ([`Document::run_task`], [`Document::dispatch_event`],
//! [`Document::advance_time`], ...) or work queued by an earlier task. Any
//! dispatch, readiness callback, timer callback or posted task requested
//! while a task is running is queued and runs after it, in FIFO order. After
//! every task, pending mutation records are delivered to their observers.
//!
//! Plain mutators such as [`Document::set_attribute`] never run callbacks.
//! Records and upgrades they produce are delivered at the next entry point,
//! or when the host calls [`Document::flush`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use horizon_select_core::{Document, Event, EventType};
//!
//! let doc = Document::new();
//! let button = doc.create_element("button");
//! doc.append_child(doc.body(), button).unwrap();
//!
//! let clicks = Arc::new(AtomicU32::new(0));
//! let counter = clicks.clone();
//! let _sub = doc.listen(doc.body(), EventType::Click, move |_event| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! doc.click(button);
//! assert_eq!(clicks.load(Ordering::SeqCst), 1);
//! ```

mod element;
mod event;
mod listener;
mod mutation;
mod queue;
mod ready;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::SlotMap;

pub use element::{Element, ElementId, Layout};
pub use event::{AttributeChanges, Event, EventDetail, EventPhase, EventTarget, EventType};
pub use listener::{ListenerId, Subscription, SubscriptionSet};
pub use mutation::{MutationKind, MutationRecord, ObserverId, ObserverOptions};
pub use ready::{JoinBarrier, UpgradePolicy};

use listener::ListenerRegistry;
use mutation::ObserverRegistry;
use queue::{Task, TaskQueue};
use ready::ReadinessRegistry;

use crate::error::{DocumentError, Result};
use crate::geometry::{Rect, Size};
use crate::keyboard::{Key, KeyboardModifiers};
use crate::logging::targets;
use crate::timer::{TimerId, TimerManager};

/// Upper bound on tasks run by a single drain before yielding back to the
/// host with a warning.
const MAX_DRAIN_STEPS: usize = 10_000;

/// Upper bound on consecutive mutation delivery rounds at one checkpoint.
const MAX_DELIVERY_ROUNDS: usize = 64;

/// Default viewport, matching a common desktop window.
const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 800.0);

pub(crate) struct DomState {
    elements: SlotMap<ElementId, Element>,
    pub(crate) listeners: ListenerRegistry,
    observers: ObserverRegistry,
    readiness: ReadinessRegistry,
    timers: TimerManager,
    queue: TaskQueue,
    focused: Option<ElementId>,
    viewport: Size,
    root: ElementId,
    head: ElementId,
    body: ElementId,
}

impl DomState {
    fn new() -> Self {
        let mut elements: SlotMap<ElementId, Element> = SlotMap::with_key();
        let root = elements.insert(Element::new("html", false));
        let head = elements.insert(Element::new("head", false));
        let body = elements.insert(Element::new("body", false));
        for child in [head, body] {
            if let Some(element) = elements.get_mut(child) {
                element.parent = Some(root);
            }
        }
        if let Some(element) = elements.get_mut(root) {
            element.children = vec![head, body];
        }

        Self {
            elements,
            listeners: ListenerRegistry::default(),
            observers: ObserverRegistry::default(),
            readiness: ReadinessRegistry::default(),
            timers: TimerManager::new(),
            queue: TaskQueue::default(),
            focused: None,
            viewport: DEFAULT_VIEWPORT,
            root,
            head,
            body,
        }
    }

    fn element(&self, id: ElementId) -> Result<&Element> {
        self.elements
            .get(id)
            .ok_or(DocumentError::UnknownElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or(DocumentError::UnknownElement(id))
    }

    fn is_structural(&self, id: ElementId) -> bool {
        id == self.root || id == self.head || id == self.body
    }

    /// `id` and its ancestors, nearest first.
    fn ancestors_inclusive(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.elements.get(node).and_then(|e| e.parent);
        }
        chain
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.elements.contains_key(node) && self.ancestors_inclusive(node).contains(&ancestor)
    }

    fn is_connected(&self, id: ElementId) -> bool {
        self.contains(self.root, id)
    }

    /// `id` and all its descendants in pre-order.
    fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(element) = self.elements.get(node) {
                out.push(node);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    fn record(&mut self, target: ElementId, kind: MutationKind) {
        let ancestors = self.ancestors_inclusive(target);
        self.observers
            .record(&MutationRecord { target, kind }, &ancestors);
    }

    fn serialized_style(&self, id: ElementId) -> Option<String> {
        let element = self.elements.get(id)?;
        if element.styles.is_empty() {
            return None;
        }
        Some(
            element
                .styles
                .iter()
                .map(|(property, value)| format!("{property}: {value};"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// Unlink `id` from its parent, recording the removal.
    fn detach(&mut self, id: ElementId) -> Result<()> {
        let Some(parent) = self.element(id)?.parent else {
            return Ok(());
        };
        if let Ok(parent_element) = self.element_mut(parent) {
            parent_element.children.retain(|&child| child != id);
        }
        self.element_mut(id)?.parent = None;
        self.record(
            parent,
            MutationKind::ChildList {
                added: Vec::new(),
                removed: vec![id],
            },
        );
        if let Some(focused) = self.focused
            && self.contains(id, focused)
        {
            tracing::trace!(target: targets::DOCUMENT, ?focused, "focused element detached");
            self.focused = None;
        }
        Ok(())
    }

    /// Queue upgrades for pending custom elements in a newly connected subtree.
    fn schedule_upgrades(&mut self, id: ElementId) {
        if self.readiness.policy() != UpgradePolicy::OnConnect || !self.is_connected(id) {
            return;
        }
        for node in self.subtree(id) {
            if self.readiness.claim_upgrade(node) {
                self.queue.push(Task::Upgrade(node));
            }
        }
    }

    fn release_ready(&mut self, id: ElementId) {
        for waiter in self.readiness.mark_ready(id) {
            self.queue.push(Task::Run(waiter));
        }
    }
}

pub(crate) struct DocumentShared {
    pub(crate) state: Mutex<DomState>,
    busy: AtomicBool,
}

/// Marks the document busy for the lifetime of a running task.
struct BusyGuard<'a> {
    shared: &'a DocumentShared,
}

impl<'a> BusyGuard<'a> {
    fn try_enter(shared: &'a DocumentShared) -> Option<Self> {
        if shared.busy.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self { shared })
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.shared.busy.store(false, Ordering::SeqCst);
    }
}

/// A shared handle to a document tree.
///
/// Cloning is cheap; all clones refer to the same tree.
#[derive(Clone)]
pub struct Document {
    shared: Arc<DocumentShared>,
    root: ElementId,
    head: ElementId,
    body: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Document")
            .field("elements", &state.elements.len())
            .field("listeners", &state.listeners.len())
            .field("queued_tasks", &state.queue.len())
            .field("now", &state.timers.now())
            .finish()
    }
}

impl Document {
    /// Create a document with `html`, `head` and `body` elements.
    pub fn new() -> Self {
        let state = DomState::new();
        let (root, head, body) = (state.root, state.head, state.body);
        tracing::debug!(target: targets::DOCUMENT, "document created");
        Self {
            shared: Arc::new(DocumentShared {
                state: Mutex::new(state),
                busy: AtomicBool::new(false),
            }),
            root,
            head,
            body,
        }
    }

    /// A weak handle that does not keep the document alive.
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            shared: Arc::downgrade(&self.shared),
            root: self.root,
            head: self.head,
            body: self.body,
        }
    }

    /// Whether both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn document_element(&self) -> ElementId {
        self.root
    }

    pub fn head(&self) -> ElementId {
        self.head
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Whether a task is currently running.
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::SeqCst)
    }

    /// Run `f` as a task.
    ///
    /// When the document is idle, `f` runs followed by every task it queued.
    /// When called from inside a running task, `f` simply runs inline.
    pub fn run_task<R>(&self, f: impl FnOnce() -> R) -> R {
        let Some(guard) = BusyGuard::try_enter(&self.shared) else {
            return f();
        };
        let result = f();
        self.drain();
        drop(guard);
        result
    }

    /// Queue `f` to run after the current task. Runs it on the next entry
    /// point (or [`flush`](Self::flush)) when the document is idle.
    pub fn post_task<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.state.lock().queue.push(Task::Run(Box::new(f)));
    }

    /// Run all queued work and deliver pending mutation records.
    pub fn flush(&self) {
        self.run_task(|| ());
    }

    /// Number of queued tasks.
    pub fn pending_tasks(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    fn drain(&self) {
        let mut steps = 0;
        loop {
            self.deliver_mutations();
            let task = self.shared.state.lock().queue.pop();
            let Some(task) = task else {
                break;
            };
            steps += 1;
            if steps > MAX_DRAIN_STEPS {
                tracing::warn!(
                    target: targets::DOCUMENT,
                    ?task,
                    "task queue did not settle; yielding to host"
                );
                self.shared.state.lock().queue.push(task);
                break;
            }
            self.execute(task);
        }
    }

    fn execute(&self, task: Task) {
        tracing::trace!(target: targets::DOCUMENT, ?task, "running task");
        match task {
            Task::Run(f) => f(),
            Task::Dispatch { target, event } => {
                self.dispatch_now(target, event);
            }
            Task::Upgrade(id) => {
                let mut state = self.shared.state.lock();
                if state.elements.contains_key(id) {
                    tracing::debug!(target: targets::DOCUMENT, ?id, "custom element upgraded");
                    state.release_ready(id);
                }
            }
        }
    }

    fn deliver_mutations(&self) {
        for _ in 0..MAX_DELIVERY_ROUNDS {
            let batches = self.shared.state.lock().observers.take_pending();
            if batches.is_empty() {
                return;
            }
            for (id, callback, records) in batches {
                // A callback earlier in the round may have disconnected this one.
                if !self.shared.state.lock().observers.contains(id) {
                    continue;
                }
                tracing::trace!(
                    target: targets::DOCUMENT,
                    observer = ?id,
                    records = records.len(),
                    "delivering mutation records"
                );
                callback(&records);
            }
        }
        tracing::warn!(target: targets::DOCUMENT, "mutation delivery did not settle");
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Dispatch `event` to `target`.
    ///
    /// Returns the event after dispatch when it ran immediately, or `None` if
    /// a task was running and the dispatch was queued behind it.
    pub fn dispatch_event(&self, target: impl Into<EventTarget>, event: Event) -> Option<Event> {
        let target = target.into();
        let Some(guard) = BusyGuard::try_enter(&self.shared) else {
            tracing::trace!(
                target: targets::DOCUMENT,
                ?target,
                event = event.event_type().name(),
                "dispatch queued"
            );
            self.shared
                .state
                .lock()
                .queue
                .push(Task::Dispatch { target, event });
            return None;
        };
        self.deliver_mutations();
        let event = self.dispatch_now(target, event);
        self.drain();
        drop(guard);
        Some(event)
    }

    /// Dispatch a click.
    pub fn click(&self, target: impl Into<EventTarget>) -> Option<Event> {
        self.dispatch_event(target, Event::click())
    }

    /// Dispatch a key press.
    pub fn key_down(
        &self,
        target: impl Into<EventTarget>,
        key: Key,
        modifiers: KeyboardModifiers,
    ) -> Option<Event> {
        self.dispatch_event(target, Event::key_down(key, modifiers))
    }

    #[tracing::instrument(skip_all, target = "horizon_select_core::document", level = "trace")]
    fn dispatch_now(&self, target: EventTarget, mut event: Event) -> Event {
        let path = {
            let state = self.shared.state.lock();
            match target {
                EventTarget::Window => vec![EventTarget::Window],
                EventTarget::Element(id) => {
                    if !state.elements.contains_key(id) {
                        tracing::trace!(target: targets::DOCUMENT, ?id, "dispatch to destroyed element skipped");
                        return event;
                    }
                    let mut path: Vec<EventTarget> = state
                        .ancestors_inclusive(id)
                        .into_iter()
                        .map(EventTarget::Element)
                        .collect();
                    if state.is_connected(id) {
                        path.push(EventTarget::Window);
                    }
                    path
                }
            }
        };
        event.target = target;
        event.propagation_stopped = false;

        event.phase = EventPhase::Capturing;
        for &node in path.iter().skip(1).rev() {
            self.invoke_listeners(node, &mut event, true);
            if event.propagation_stopped {
                break;
            }
        }

        if !event.propagation_stopped {
            event.phase = EventPhase::AtTarget;
            self.invoke_listeners(target, &mut event, true);
            self.invoke_listeners(target, &mut event, false);
        }

        if event.bubbles() && !event.propagation_stopped {
            event.phase = EventPhase::Bubbling;
            for &node in path.iter().skip(1) {
                self.invoke_listeners(node, &mut event, false);
                if event.propagation_stopped {
                    break;
                }
            }
        }

        event.phase = EventPhase::None;
        event.current_target = target;
        event
    }

    fn invoke_listeners(&self, current: EventTarget, event: &mut Event, capture: bool) {
        let listeners = self
            .shared
            .state
            .lock()
            .listeners
            .matching(current, event.event_type(), capture);
        event.current_target = current;
        for (id, callback) in listeners {
            if !self.shared.state.lock().listeners.contains(id) {
                continue;
            }
            callback(event);
        }
    }

    /// Register a bubble-phase listener.
    pub fn add_listener<F>(&self, target: impl Into<EventTarget>, event_type: EventType, callback: F) -> ListenerId
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.shared
            .state
            .lock()
            .listeners
            .add(target.into(), event_type, false, Arc::new(callback))
    }

    /// Register a capture-phase listener.
    pub fn add_capture_listener<F>(
        &self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        callback: F,
    ) -> ListenerId
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.shared
            .state
            .lock()
            .listeners
            .add(target.into(), event_type, true, Arc::new(callback))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.state.lock().listeners.remove(id)
    }

    /// Register a bubble-phase listener owned by the returned subscription.
    pub fn listen<F>(&self, target: impl Into<EventTarget>, event_type: EventType, callback: F) -> Subscription
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        let id = self.add_listener(target, event_type, callback);
        Subscription::new(Arc::downgrade(&self.shared), id)
    }

    /// Register a capture-phase listener owned by the returned subscription.
    pub fn listen_capture<F>(
        &self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        let id = self.add_capture_listener(target, event_type, callback);
        Subscription::new(Arc::downgrade(&self.shared), id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.state.lock().listeners.len()
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        self.shared
            .state
            .lock()
            .elements
            .insert(Element::new(tag, false))
    }

    /// Create a detached custom element. It becomes ready according to the
    /// document's [`UpgradePolicy`].
    pub fn create_custom_element(&self, tag: &str) -> ElementId {
        let mut state = self.shared.state.lock();
        let id = state.elements.insert(Element::new(tag, true));
        state.readiness.register(id);
        id
    }

    /// Append `child` as the last child of `parent`, moving it from any
    /// previous parent.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let mut state = self.shared.state.lock();
        state.element(parent)?;
        state.element(child)?;
        if state.is_structural(child) {
            return Err(DocumentError::StructuralElement(child));
        }
        if state.contains(child, parent) {
            return Err(DocumentError::HierarchyCycle { parent, child });
        }
        state.detach(child)?;
        state.element_mut(parent)?.children.push(child);
        state.element_mut(child)?.parent = Some(parent);
        state.record(
            parent,
            MutationKind::ChildList {
                added: vec![child],
                removed: Vec::new(),
            },
        );
        state.schedule_upgrades(child);
        Ok(())
    }

    /// Detach `id` from its parent. Detached elements keep their subtree.
    pub fn remove(&self, id: ElementId) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.is_structural(id) {
            return Err(DocumentError::StructuralElement(id));
        }
        state.detach(id)
    }

    /// Detach every child of `id`.
    pub fn remove_children(&self, id: ElementId) -> Result<()> {
        let mut state = self.shared.state.lock();
        let children = state.element(id)?.children.clone();
        for child in children {
            state.detach(child)?;
        }
        Ok(())
    }

    /// Detach and free `id` with its subtree, listeners, observers rooted in
    /// it and readiness waiters.
    pub fn destroy(&self, id: ElementId) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.is_structural(id) {
            return Err(DocumentError::StructuralElement(id));
        }
        state.detach(id)?;
        let doomed = state.subtree(id);
        for node in &doomed {
            state.elements.remove(*node);
        }
        state.listeners.remove_for_elements(&doomed);
        state.observers.remove_rooted_at(&doomed);
        state.readiness.forget(&doomed);
        tracing::trace!(target: targets::DOCUMENT, ?id, count = doomed.len(), "subtree destroyed");
        Ok(())
    }

    /// Whether `id` refers to a live element.
    pub fn exists(&self, id: ElementId) -> bool {
        self.shared.state.lock().elements.contains_key(id)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.shared.state.lock().contains(ancestor, node)
    }

    /// Whether `id` is reachable from the document element.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.shared.state.lock().is_connected(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.shared.state.lock().elements.get(id)?.parent
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.shared
            .state
            .lock()
            .elements
            .get(id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn first_element_child(&self, id: ElementId) -> Option<ElementId> {
        self.shared
            .state
            .lock()
            .elements
            .get(id)?
            .children
            .first()
            .copied()
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut nodes = self.shared.state.lock().subtree(id);
        if !nodes.is_empty() {
            nodes.remove(0);
        }
        nodes
    }

    /// First descendant of `id`, in document order, matching `predicate`.
    pub fn find_descendant<P>(&self, id: ElementId, predicate: P) -> Option<ElementId>
    where
        P: Fn(&Element) -> bool,
    {
        let state = self.shared.state.lock();
        state
            .subtree(id)
            .into_iter()
            .skip(1)
            .find(|node| state.elements.get(*node).is_some_and(&predicate))
    }

    /// Inspect an element without cloning it.
    pub fn with_element<R>(&self, id: ElementId, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.shared.state.lock().elements.get(id).map(f)
    }

    pub fn tag(&self, id: ElementId) -> Option<String> {
        self.with_element(id, |e| e.tag.clone())
    }

    // =========================================================================
    // Attributes, styles, text
    // =========================================================================

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.with_element(id, |e| e.attribute(name).map(str::to_owned))
            .flatten()
    }

    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.with_element(id, |e| e.has_attribute(name))
            .unwrap_or(false)
    }

    pub fn set_attribute(&self, id: ElementId, name: &str, value: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        let old_value = state
            .element_mut(id)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        state.record(
            id,
            MutationKind::Attributes {
                name: name.to_owned(),
                old_value,
            },
        );
        Ok(())
    }

    /// Set or remove a boolean attribute.
    pub fn toggle_attribute(&self, id: ElementId, name: &str, present: bool) -> Result<()> {
        if present {
            self.set_attribute(id, name, "")
        } else {
            self.remove_attribute(id, name)
        }
    }

    /// Remove an attribute. Removing an absent attribute records nothing.
    pub fn remove_attribute(&self, id: ElementId, name: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        if let Some(old_value) = state.element_mut(id)?.attributes.remove(name) {
            state.record(
                id,
                MutationKind::Attributes {
                    name: name.to_owned(),
                    old_value: Some(old_value),
                },
            );
        }
        Ok(())
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<String> {
        self.with_element(id, |e| e.style(property).map(str::to_owned))
            .flatten()
    }

    /// Set an inline style property. Recorded as a change of the `style`
    /// attribute.
    pub fn set_style(&self, id: ElementId, property: &str, value: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        state.element(id)?;
        let old_value = state.serialized_style(id);
        state
            .element_mut(id)?
            .styles
            .insert(property.to_owned(), value.to_owned());
        state.record(
            id,
            MutationKind::Attributes {
                name: "style".into(),
                old_value,
            },
        );
        Ok(())
    }

    pub fn remove_style(&self, id: ElementId, property: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        let old_value = state.serialized_style(id);
        if state.element_mut(id)?.styles.remove(property).is_some() {
            state.record(
                id,
                MutationKind::Attributes {
                    name: "style".into(),
                    old_value,
                },
            );
        }
        Ok(())
    }

    /// The element's own text.
    pub fn text(&self, id: ElementId) -> Option<String> {
        self.with_element(id, |e| e.text.clone())
    }

    pub fn set_text(&self, id: ElementId, text: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        text.clone_into(&mut state.element_mut(id)?.text);
        state.record(id, MutationKind::CharacterData);
        Ok(())
    }

    /// Concatenated text of `id` and its descendants, in document order.
    pub fn text_content(&self, id: ElementId) -> String {
        let state = self.shared.state.lock();
        state
            .subtree(id)
            .into_iter()
            .filter_map(|node| state.elements.get(node))
            .map(|e| e.text.as_str())
            .collect()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The element holding input focus.
    pub fn active_element(&self) -> Option<ElementId> {
        self.shared.state.lock().focused
    }

    pub fn has_focus(&self, id: ElementId) -> bool {
        self.active_element() == Some(id)
    }

    /// Move input focus to `id`, dispatching `blur` to the previous holder and
    /// `focus` to `id`. Focus moves immediately; the events follow the
    /// run-to-completion rules.
    pub fn focus(&self, id: ElementId) -> Result<()> {
        let previous = {
            let mut state = self.shared.state.lock();
            state.element(id)?;
            if state.focused == Some(id) {
                return Ok(());
            }
            state.focused.replace(id)
        };
        tracing::trace!(target: targets::DOCUMENT, ?id, ?previous, "focus moved");
        self.run_task(|| {
            if let Some(previous) = previous {
                self.dispatch_event(previous, Event::blur());
            }
            self.dispatch_event(id, Event::focus());
        });
        Ok(())
    }

    /// Drop focus from `id` if it holds it.
    pub fn blur(&self, id: ElementId) {
        let had_focus = {
            let mut state = self.shared.state.lock();
            if state.focused == Some(id) {
                state.focused = None;
                true
            } else {
                false
            }
        };
        if had_focus {
            self.run_task(|| {
                self.dispatch_event(id, Event::blur());
            });
        }
    }

    // =========================================================================
    // Readiness
    // =========================================================================

    pub fn upgrade_policy(&self) -> UpgradePolicy {
        self.shared.state.lock().readiness.policy()
    }

    /// Choose how custom elements created from now on become ready.
    pub fn set_upgrade_policy(&self, policy: UpgradePolicy) {
        self.shared.state.lock().readiness.set_policy(policy);
    }

    /// Whether `id` is ready. Plain elements are always ready.
    pub fn is_ready(&self, id: ElementId) -> bool {
        let state = self.shared.state.lock();
        state.elements.contains_key(id)
            && (!state.readiness.is_tracked(id) || state.readiness.is_ready(id))
    }

    /// Run `callback` once `id` is ready.
    ///
    /// The callback always runs as a queued task, even if `id` is ready
    /// already. It never runs if `id` is destroyed first.
    pub fn await_ready<F>(&self, id: ElementId, callback: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        state.element(id)?;
        if !state.readiness.is_tracked(id) || state.readiness.is_ready(id) {
            state.queue.push(Task::Run(Box::new(callback)));
        } else {
            state.readiness.add_waiter(id, Box::new(callback));
        }
        Ok(())
    }

    /// Upgrade `id` now, releasing its waiters.
    pub fn mark_ready(&self, id: ElementId) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            state.element(id)?;
            state.readiness.register(id);
            state.release_ready(id);
        }
        tracing::debug!(target: targets::DOCUMENT, ?id, "element marked ready");
        self.flush();
        Ok(())
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.shared.state.lock().timers.now()
    }

    /// Run `callback` once, `delay` from now.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared
            .state
            .lock()
            .timers
            .start_one_shot(delay, Box::new(callback))
    }

    /// Cancel a pending timer.
    pub fn clear_timeout(&self, id: TimerId) -> Result<()> {
        self.shared.state.lock().timers.stop(id)
    }

    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.shared.state.lock().timers.is_active(id)
    }

    pub fn active_timers(&self) -> usize {
        self.shared.state.lock().timers.active_count()
    }

    /// Move the virtual clock forward, running each due timer as a task.
    pub fn advance_time(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let due = self.shared.state.lock().timers.pop_due(target);
            let Some((_, callback)) = due else {
                break;
            };
            self.shared.state.lock().queue.push(Task::Run(callback));
            self.flush();
        }
        self.flush();
    }

    // =========================================================================
    // Layout and viewport
    // =========================================================================

    /// Store host-measured layout for `id`.
    pub fn set_layout(&self, id: ElementId, layout: Layout) -> Result<()> {
        self.shared.state.lock().element_mut(id)?.layout = layout;
        Ok(())
    }

    pub fn layout(&self, id: ElementId) -> Option<Layout> {
        self.with_element(id, |e| e.layout)
    }

    /// Border box of `id` relative to the viewport. An inline `height`
    /// overrides the measured height; detached elements have no box.
    ///
    /// The resized box keeps its top edge, unless the nearest element in the
    /// ancestor chain that is pinned by an inline `top` or `bottom` style is
    /// pinned at the bottom.
    pub fn bounding_rect(&self, id: ElementId) -> Rect {
        let state = self.shared.state.lock();
        if !state.is_connected(id) {
            return Rect::ZERO;
        }
        let Some(element) = state.elements.get(id) else {
            return Rect::ZERO;
        };
        let bounds = element.layout.bounds;
        let Some(height) = element.explicit_height() else {
            return bounds;
        };
        let pinned_bottom = state
            .ancestors_inclusive(id)
            .into_iter()
            .filter_map(|node| state.elements.get(node))
            .find_map(|node| {
                if node.style("top").is_some() {
                    Some(false)
                } else if node.style("bottom").is_some() {
                    Some(true)
                } else {
                    None
                }
            })
            .unwrap_or(false);
        if pinned_bottom {
            bounds.with_height_from_bottom(height)
        } else {
            bounds.with_height(height)
        }
    }

    /// Inline `height` of `id` in pixels, if set.
    pub fn explicit_height(&self, id: ElementId) -> Option<f32> {
        self.with_element(id, Element::explicit_height).flatten()
    }

    pub fn viewport(&self) -> Size {
        self.shared.state.lock().viewport
    }

    /// Resize the viewport and dispatch `resize` on the window.
    pub fn set_viewport(&self, size: Size) {
        self.shared.state.lock().viewport = size;
        self.dispatch_event(EventTarget::Window, Event::new(EventType::Resize, false, false));
    }

    // =========================================================================
    // Mutation observers
    // =========================================================================

    /// Observe changes under `root`. Batches are delivered after the task
    /// that produced them.
    pub fn observe<F>(&self, root: ElementId, options: ObserverOptions, callback: F) -> Result<ObserverId>
    where
        F: Fn(&[MutationRecord]) + Send + Sync + 'static,
    {
        let mut state = self.shared.state.lock();
        state.element(root)?;
        Ok(state.observers.add(root, options, Arc::new(callback)))
    }

    /// Stop an observer and drop its undelivered records.
    pub fn disconnect_observer(&self, id: ObserverId) -> bool {
        self.shared.state.lock().observers.remove(id)
    }

    /// Whether mutation records are waiting for the next checkpoint.
    pub fn has_pending_mutations(&self) -> bool {
        self.shared.state.lock().observers.has_pending()
    }
}

/// A non-owning [`Document`] handle, for closures stored inside the document.
#[derive(Clone)]
pub struct WeakDocument {
    shared: Weak<DocumentShared>,
    root: ElementId,
    head: ElementId,
    body: ElementId,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.shared.upgrade().map(|shared| Document {
            shared,
            root: self.root,
            head: self.head,
            body: self.body,
        })
    }
}

impl std::fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakDocument")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}
