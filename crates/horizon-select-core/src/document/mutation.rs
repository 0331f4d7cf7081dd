//! Subtree mutation observation.
//!
//! Records are collected while the tree changes and handed to observers in
//! batches at the document's delivery checkpoint, after the running task.

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use super::element::ElementId;

new_key_type! {
    /// Identifies a mutation observer registration.
    pub struct ObserverId;
}

/// What a mutation observer is interested in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverOptions {
    /// Report children added or removed.
    pub child_list: bool,
    /// Report attribute changes.
    pub attributes: bool,
    /// Report text changes.
    pub character_data: bool,
    /// Extend observation to all descendants of the root.
    pub subtree: bool,
    /// Only report these attribute names. Implies `attributes`.
    pub attribute_filter: Option<Vec<String>>,
}

impl ObserverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_list(mut self) -> Self {
        self.child_list = true;
        self
    }

    pub fn attributes(mut self) -> Self {
        self.attributes = true;
        self
    }

    pub fn character_data(mut self) -> Self {
        self.character_data = true;
        self
    }

    pub fn subtree(mut self) -> Self {
        self.subtree = true;
        self
    }

    pub fn attribute_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = true;
        self.attribute_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn wants(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList { .. } => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes { name, .. } => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|filter| filter.iter().any(|f| f == name))
            }
        }
    }
}

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// An attribute (or the inline style, reported as `style`) changed.
    Attributes {
        name: String,
        old_value: Option<String>,
    },
    /// Children were inserted into or removed from the target.
    ChildList {
        added: Vec<ElementId>,
        removed: Vec<ElementId>,
    },
    /// The target's own text changed.
    CharacterData,
}

/// A single observed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: ElementId,
    pub kind: MutationKind,
}

impl MutationRecord {
    /// The attribute name of an attribute record.
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attributes { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub(crate) type ObserverCallback = Arc<dyn Fn(&[MutationRecord]) + Send + Sync>;

struct Observer {
    root: ElementId,
    options: ObserverOptions,
    callback: ObserverCallback,
    pending: Vec<MutationRecord>,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: SlotMap<ObserverId, Observer>,
}

impl ObserverRegistry {
    pub(crate) fn add(
        &mut self,
        root: ElementId,
        options: ObserverOptions,
        callback: ObserverCallback,
    ) -> ObserverId {
        self.observers.insert(Observer {
            root,
            options,
            callback,
            pending: Vec::new(),
        })
    }

    /// Remove an observer along with its undelivered records.
    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    pub(crate) fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(id)
    }

    /// Queue `record` for every interested observer.
    ///
    /// `ancestors` is the inclusive ancestor chain of the record's target,
    /// nearest first.
    pub(crate) fn record(&mut self, record: &MutationRecord, ancestors: &[ElementId]) {
        for observer in self.observers.values_mut() {
            let in_scope = if observer.options.subtree {
                ancestors.contains(&observer.root)
            } else {
                record.target == observer.root
            };
            if in_scope && observer.options.wants(&record.kind) {
                observer.pending.push(record.clone());
            }
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.observers.values().any(|o| !o.pending.is_empty())
    }

    /// Take every non-empty batch.
    pub(crate) fn take_pending(&mut self) -> Vec<(ObserverId, ObserverCallback, Vec<MutationRecord>)> {
        self.observers
            .iter_mut()
            .filter(|(_, observer)| !observer.pending.is_empty())
            .map(|(id, observer)| {
                (
                    id,
                    observer.callback.clone(),
                    std::mem::take(&mut observer.pending),
                )
            })
            .collect()
    }

    /// Forget observers rooted at destroyed elements.
    pub(crate) fn remove_rooted_at(&mut self, elements: &[ElementId]) {
        self.observers
            .retain(|_, observer| !elements.contains(&observer.root));
    }
}
