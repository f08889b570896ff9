use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

/// Identifier of a scheduled timer, returned by
/// [`Timer::set_timeout`](crate::time::Timer::set_timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// An entry in the timer heap.
///
/// The callback itself lives in [`TimerQueue::callbacks`]; an entry whose
/// callback is gone was cancelled and is skipped when it surfaces.
struct TimerEntry {
    /// The time at which the timer should fire.
    deadline: Instant,

    /// Scheduling order, breaking ties between equal deadlines.
    id: TimerId,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Ord for TimerEntry {
    /// Orders entries by deadline, then by scheduling order.
    ///
    /// The comparison is **reversed** so that a `BinaryHeap<TimerEntry>`
    /// behaves as a min-heap, where the earliest deadline is popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.0.cmp(&self.id.0))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending timers of a runtime.
#[derive(Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    callbacks: HashMap<TimerId, Box<dyn FnOnce()>>,
    next_id: u64,
}

impl TimerQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            callbacks: HashMap::with_capacity(capacity),
            next_id: 0,
        }
    }

    pub(crate) fn schedule(&mut self, deadline: Instant, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.heap.push(TimerEntry { deadline, id });
        self.callbacks.insert(id, callback);

        id
    }

    /// Removes a pending timer. Returns the callback so the caller can drop
    /// it outside of any borrow; `None` if it already fired or was cancelled.
    pub(crate) fn cancel(&mut self, id: TimerId) -> Option<Box<dyn FnOnce()>> {
        self.callbacks.remove(&id)
    }

    /// Pops the callback of the earliest timer due at `now`, if any.
    pub(crate) fn pop_expired(&mut self, now: Instant) -> Option<Box<dyn FnOnce()>> {
        while let Some(entry) = self.heap.peek() {
            if entry.deadline > now {
                return None;
            }

            let id = entry.id;
            self.heap.pop();

            if let Some(callback) = self.callbacks.remove(&id) {
                return Some(callback);
            }
        }

        None
    }

    /// Deadline of the earliest live timer.
    pub(crate) fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(entry) = self.heap.peek() {
            if self.callbacks.contains_key(&entry.id) {
                return Some(entry.deadline);
            }

            self.heap.pop();
        }

        None
    }

    /// Number of live timers.
    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}
