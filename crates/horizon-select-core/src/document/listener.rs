//! Event listener registration.

use std::sync::{Arc, Weak};

use slotmap::{new_key_type, SlotMap};

use super::element::ElementId;
use super::event::{Event, EventTarget, EventType};
use super::DocumentShared;

new_key_type! {
    /// Identifies a registered listener. Removal uses this ID, never a lookup
    /// by event name or callback identity.
    pub struct ListenerId;
}

pub(crate) type ListenerCallback = Arc<dyn Fn(&mut Event) + Send + Sync>;

struct ListenerEntry {
    target: EventTarget,
    event_type: EventType,
    capture: bool,
    order: u64,
    callback: ListenerCallback,
}

/// All listeners of a document.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: SlotMap<ListenerId, ListenerEntry>,
    next_order: u64,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        capture: bool,
        callback: ListenerCallback,
    ) -> ListenerId {
        let order = self.next_order;
        self.next_order += 1;
        self.entries.insert(ListenerEntry {
            target,
            event_type,
            capture,
            order,
            callback,
        })
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Listeners for one target and phase, in registration order.
    pub(crate) fn matching(
        &self,
        target: EventTarget,
        event_type: &EventType,
        capture: bool,
    ) -> Vec<(ListenerId, ListenerCallback)> {
        let mut found: Vec<(u64, ListenerId, ListenerCallback)> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.target == target && entry.capture == capture && &entry.event_type == event_type
            })
            .map(|(id, entry)| (entry.order, id, entry.callback.clone()))
            .collect();
        found.sort_by_key(|(order, _, _)| *order);
        found
            .into_iter()
            .map(|(_, id, callback)| (id, callback))
            .collect()
    }

    /// Drop every listener registered on one of `elements`.
    pub(crate) fn remove_for_elements(&mut self, elements: &[ElementId]) {
        self.entries.retain(|_, entry| match entry.target {
            EventTarget::Element(id) => !elements.contains(&id),
            EventTarget::Window => true,
        });
    }
}

/// RAII handle for a listener; dropping it removes the listener.
#[must_use = "dropping the subscription removes the listener immediately"]
pub struct Subscription {
    document: Weak<DocumentShared>,
    id: ListenerId,
}

impl Subscription {
    pub(crate) fn new(document: Weak<DocumentShared>, id: ListenerId) -> Self {
        Self { document, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|shared| shared.state.lock().listeners.contains(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.document.upgrade() {
            shared.state.lock().listeners.remove(self.id);
        }
    }
}

/// An owned list of subscriptions torn down together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Remove every listener in the set.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl Extend<Subscription> for SubscriptionSet {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}
