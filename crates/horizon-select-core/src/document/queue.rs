//! The document's run-to-completion task queue.

use std::collections::VecDeque;

use super::element::ElementId;
use super::event::{Event, EventTarget};

/// Deferred work, run in FIFO order once the current task completes.
pub(crate) enum Task {
    /// An arbitrary closure.
    Run(Box<dyn FnOnce() + Send + 'static>),
    /// An event dispatched while another dispatch was in progress.
    Dispatch { target: EventTarget, event: Event },
    /// Upgrade a newly connected custom element.
    Upgrade(ElementId),
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run(_) => f.write_str("Run"),
            Self::Dispatch { target, event } => f
                .debug_struct("Dispatch")
                .field("target", target)
                .field("event", &event.event_type().name())
                .finish(),
            Self::Upgrade(id) => f.debug_tuple("Upgrade").field(id).finish(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
