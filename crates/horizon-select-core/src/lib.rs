//! Core systems for Horizon Select.
//!
//! This crate provides the host environment the select widget runs in:
//!
//! - **Document**: a retained element tree with attributes, inline styles,
//!   text, host-measured layout, a viewport and input focus
//! - **Events**: capture/bubble dispatch with RAII subscriptions
//! - **Mutation Observation**: batched subtree change records
//! - **Readiness**: one-shot upgrade of custom elements and [`JoinBarrier`]
//! - **Run-to-completion Tasks**: nested work is queued behind the running task
//! - **Timers**: one-shot timers on a virtual clock
//! - **Signal/Slot System**: type-safe notification between sub-widgets
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use horizon_select_core::{Document, ObserverOptions};
//!
//! let doc = Document::new();
//! let select = doc.create_element("select");
//! doc.append_child(doc.body(), select).unwrap();
//!
//! let flipped = Arc::new(AtomicBool::new(false));
//! let flag = flipped.clone();
//! doc.observe(select, ObserverOptions::new().attribute_filter(["multiple"]), move |_| {
//!     flag.store(true, Ordering::SeqCst);
//! })
//! .unwrap();
//!
//! doc.set_attribute(select, "multiple", "").unwrap();
//! doc.flush();
//! assert!(flipped.load(Ordering::SeqCst));
//! ```

pub mod document;
mod error;
pub mod geometry;
pub mod keyboard;
pub mod logging;
pub mod signal;
mod timer;

pub use document::{
    AttributeChanges, Document, Element, ElementId, Event, EventDetail, EventPhase, EventTarget,
    EventType, JoinBarrier, Layout, ListenerId, MutationKind, MutationRecord, ObserverId,
    ObserverOptions, Subscription, SubscriptionSet, UpgradePolicy, WeakDocument,
};
pub use error::{DocumentError, Result};
pub use geometry::{Point, Rect, Size};
pub use keyboard::{Key, KeyboardModifiers};
pub use logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::TimerId;

static_assertions::assert_impl_all!(Document: Send, Sync, Clone);
static_assertions::assert_impl_all!(WeakDocument: Send, Sync);
static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
