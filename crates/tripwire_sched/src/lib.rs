//! # tripwire_sched - Cooperative Task Scheduler
//!
//! "Wait, then run" tasks on a simulated clock. Nothing runs on its own:
//! the owner advances the clock once per step and receives the payloads of
//! every task that came due, in due order. Tasks can be canceled at any time
//! before they fire and then never fire.
//!
//! ```
//! use std::time::Duration;
//! use tripwire_sched::Scheduler;
//!
//! let mut scheduler = Scheduler::new();
//! let handle = scheduler.schedule(Duration::from_millis(200), "enter");
//! scheduler.schedule(Duration::from_millis(100), "stay");
//!
//! assert_eq!(scheduler.advance(Duration::from_millis(150)), vec!["stay"]);
//! assert!(scheduler.is_pending(handle));
//! assert_eq!(scheduler.advance(Duration::from_millis(50)), vec!["enter"]);
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::time::Duration;

/// Handle to a scheduled task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Convert authored seconds into a clock duration.
///
/// Rounds to whole microseconds so decimal delays such as `0.2` line up
/// exactly with fixed-step clocks. Negative and non-finite values map to zero.
pub fn seconds(secs: f32) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_micros((secs as f64 * 1_000_000.0).round() as u64)
}

struct Entry<T> {
    due: Duration,
    seq: u64,
    handle: TaskHandle,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap pops the earliest due time, then the earliest scheduled
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Single-threaded scheduler of delayed payloads
pub struct Scheduler<T> {
    now: Duration,
    queue: BinaryHeap<Entry<T>>,
    /// Handles scheduled and neither fired nor canceled
    pending: HashSet<TaskHandle>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    /// Create a scheduler with its clock at zero
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: BinaryHeap::new(),
            pending: HashSet::new(),
            next_seq: 0,
        }
    }

    /// Current clock value
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to come due after `delay`
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;

        let handle = TaskHandle(seq);
        self.queue.push(Entry {
            due: self.now + delay,
            seq,
            handle,
            payload,
        });
        self.pending.insert(handle);
        handle
    }

    /// Cancel a task. Returns false if it already fired or was canceled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let removed = self.pending.remove(&handle);
        if removed {
            log::trace!("Canceled task {}", handle.0);
        }
        removed
    }

    /// Whether a task is still waiting to fire
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Number of tasks waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }

    /// Move the clock forward and collect every payload that came due
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;

        let mut due = Vec::new();
        while let Some(entry) = self.queue.peek() {
            if entry.due > self.now {
                break;
            }
            let Some(entry) = self.queue.pop() else {
                break;
            };
            // Canceled entries stay in the heap until they surface here
            if self.pending.remove(&entry.handle) {
                due.push(entry.payload);
            }
        }
        due
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.pending.len())
            .finish()
    }
}
