//! Element readiness and readiness joins.
//!
//! Custom elements are not usable as soon as they are created. They upgrade
//! later, after which they are *ready*. Code that needs a sub-widget waits on
//! readiness with [`Document::await_ready`](super::Document::await_ready), and
//! code that needs several sub-widgets joins the waits with a [`JoinBarrier`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::element::ElementId;

/// When a custom element becomes ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpgradePolicy {
    /// Upgrade in a task posted when the element is first connected.
    #[default]
    OnConnect,
    /// Stay pending until the host calls
    /// [`Document::mark_ready`](super::Document::mark_ready).
    Manual,
}

pub(crate) type ReadyCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Readiness {
    ready: bool,
    upgrade_posted: bool,
    waiters: Vec<ReadyCallback>,
}

#[derive(Default)]
pub(crate) struct ReadinessRegistry {
    entries: HashMap<ElementId, Readiness>,
    policy: UpgradePolicy,
}

impl ReadinessRegistry {
    pub(crate) fn policy(&self) -> UpgradePolicy {
        self.policy
    }

    pub(crate) fn set_policy(&mut self, policy: UpgradePolicy) {
        self.policy = policy;
    }

    pub(crate) fn register(&mut self, id: ElementId) {
        self.entries.entry(id).or_default();
    }

    pub(crate) fn is_tracked(&self, id: ElementId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn is_ready(&self, id: ElementId) -> bool {
        self.entries.get(&id).is_some_and(|r| r.ready)
    }

    /// Claim the one upgrade task for `id`. Returns `false` if already claimed
    /// or the element is not a pending custom element.
    pub(crate) fn claim_upgrade(&mut self, id: ElementId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if !entry.ready && !entry.upgrade_posted => {
                entry.upgrade_posted = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn add_waiter(&mut self, id: ElementId, callback: ReadyCallback) {
        self.entries.entry(id).or_default().waiters.push(callback);
    }

    /// Mark `id` ready and hand back its waiters. Empty if it was ready
    /// already.
    pub(crate) fn mark_ready(&mut self, id: ElementId) -> Vec<ReadyCallback> {
        let entry = self.entries.entry(id).or_default();
        if entry.ready {
            return Vec::new();
        }
        entry.ready = true;
        std::mem::take(&mut entry.waiters)
    }

    pub(crate) fn forget(&mut self, elements: &[ElementId]) {
        for id in elements {
            self.entries.remove(id);
        }
    }
}

struct JoinInner {
    remaining: AtomicUsize,
    on_complete: Mutex<Option<ReadyCallback>>,
}

/// Runs a callback once after a fixed number of arrivals.
///
/// Each party calls [`arrive`](Self::arrive) once; the final arrival runs the
/// callback. Extra arrivals are ignored.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use horizon_select_core::JoinBarrier;
///
/// let done = Arc::new(AtomicBool::new(false));
/// let flag = done.clone();
/// let barrier = JoinBarrier::new(2, move || flag.store(true, Ordering::SeqCst));
///
/// barrier.arrive();
/// assert!(!done.load(Ordering::SeqCst));
/// barrier.clone().arrive();
/// assert!(done.load(Ordering::SeqCst));
/// ```
#[derive(Clone)]
pub struct JoinBarrier {
    inner: Arc<JoinInner>,
}

impl JoinBarrier {
    pub fn new<F>(parties: usize, on_complete: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let barrier = Self {
            inner: Arc::new(JoinInner {
                remaining: AtomicUsize::new(parties),
                on_complete: Mutex::new(Some(Box::new(on_complete))),
            }),
        };
        if parties == 0 {
            barrier.complete();
        }
        barrier
    }

    /// Record one arrival.
    pub fn arrive(&self) {
        let previous = self
            .inner
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.complete();
        }
    }

    /// Arrivals still outstanding.
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0 && self.inner.on_complete.lock().is_none()
    }

    fn complete(&self) {
        let callback = self.inner.on_complete.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl std::fmt::Debug for JoinBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinBarrier")
            .field("remaining", &self.remaining())
            .finish()
    }
}
