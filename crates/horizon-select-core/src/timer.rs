//! One-shot timers on the document's virtual clock.
//!
//! The clock only moves when the host calls
//! [`Document::advance_time`](crate::Document::advance_time), which makes
//! debounce behaviour deterministic under test.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::error::{DocumentError, Result};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// A boxed timer callback.
pub(crate) type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

struct TimerData {
    fire_at: Duration,
    callback: TimerCallback,
}

/// An entry in the timer queue (min-heap by fire time, FIFO among equals).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_at: Duration,
    sequence: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.sequence == other.sequence
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Manages pending one-shot timers.
pub(crate) struct TimerManager {
    now: Duration,
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
    next_sequence: u64,
}

impl TimerManager {
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Current virtual time since the document was created.
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    /// Start a one-shot timer that fires `delay` after the current time.
    pub(crate) fn start_one_shot(&mut self, delay: Duration, callback: TimerCallback) -> TimerId {
        let fire_at = self.now + delay;
        let id = self.timers.insert(TimerData { fire_at, callback });
        self.queue.push(TimerQueueEntry {
            id,
            fire_at,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        tracing::trace!(target: targets::TIMER, ?id, ?delay, "timer started");
        id
    }

    /// Cancel a pending timer.
    pub(crate) fn stop(&mut self, id: TimerId) -> Result<()> {
        // Stale heap entries are skipped when popped.
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(DocumentError::InvalidTimer(id))
        }
    }

    pub(crate) fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub(crate) fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Time until the next pending timer fires, if any.
    pub(crate) fn time_until_next(&self) -> Option<Duration> {
        self.timers
            .values()
            .map(|t| t.fire_at.saturating_sub(self.now))
            .min()
    }

    /// Move the clock to `target` (never backwards) and pop the next timer due
    /// at or before it. Call repeatedly until `None`; the clock stops at each
    /// fire time so callbacks observe the time they were scheduled for.
    pub(crate) fn pop_due(&mut self, target: Duration) -> Option<(TimerId, TimerCallback)> {
        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_at > target {
                break;
            }
            self.queue.pop();
            let Some(timer) = self.timers.remove(entry.id) else {
                continue;
            };
            self.now = self.now.max(timer.fire_at);
            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            return Some((entry.id, timer.callback));
        }
        self.now = self.now.max(target);
        None
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn recording(log: &Arc<Mutex<Vec<u32>>>, value: u32) -> TimerCallback {
        let log = log.clone();
        Box::new(move || log.lock().push(value))
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut timers = TimerManager::new();
        timers.start_one_shot(Duration::from_millis(30), recording(&log, 30));
        timers.start_one_shot(Duration::from_millis(10), recording(&log, 10));
        timers.start_one_shot(Duration::from_millis(20), recording(&log, 20));

        while let Some((_, callback)) = timers.pop_due(Duration::from_millis(25)) {
            callback();
        }
        assert_eq!(*log.lock(), vec![10, 20]);
        assert_eq!(timers.now(), Duration::from_millis(25));
        assert_eq!(timers.active_count(), 1);
        assert_eq!(timers.time_until_next(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(5), recording(&log, 1));
        assert!(timers.is_active(id));
        assert!(timers.stop(id).is_ok());
        assert!(!timers.is_active(id));
        assert_eq!(timers.stop(id), Err(DocumentError::InvalidTimer(id)));

        assert!(timers.pop_due(Duration::from_secs(1)).is_none());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_equal_deadlines_fire_in_start_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut timers = TimerManager::new();
        for value in 0..4 {
            timers.start_one_shot(Duration::from_millis(7), recording(&log, value));
        }
        while let Some((_, callback)) = timers.pop_due(Duration::from_millis(7)) {
            callback();
        }
        assert_eq!(*log.lock(), vec![0, 1, 2, 3]);
    }
}
