//! Bounded pool of timed resume slots.
//!
//! The pool has a fixed number of slots. A slot is claimed when a wait is
//! scheduled and released when the wait expires (after its resume
//! notification is posted) or when it is cancelled. All pending deadlines
//! sit in one min-heap serviced by a single timing thread, so a slot costs a
//! table entry rather than an OS thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use beatclock::config::SchedulerConfig;
//! use beatclock::core::ResumeWorkerPool;
//! use beatclock::infra::InMemoryEventQueue;
//! use beatclock::util::TaskHandle;
//! use std::time::Duration;
//!
//! let pool = ResumeWorkerPool::new(&SchedulerConfig::default(), InMemoryEventQueue::new())?;
//! assert!(pool.schedule_after(TaskHandle::new(7), Duration::from_millis(100)));
//! ```

mod pool;

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::util::types::TaskHandle;

pub use pool::ResumeWorkerPool;

/// Capacity of the reference slot table.
pub const DEFAULT_CAPACITY: usize = 20;

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Available for a new wait.
    Free,
    /// Owns a pending wait.
    Running,
}

/// Point-in-time view of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    /// Position in the slot table.
    pub index: usize,
    /// Current state.
    pub state: SlotState,
    /// Task owning the slot; `None` unless `state` is `Running`.
    pub task: Option<TaskHandle>,
}

/// Statistics about slot usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of slots.
    pub capacity: usize,

    /// Slots currently running.
    pub running: usize,

    /// Waits accepted.
    pub scheduled: u64,

    /// Resume notifications posted.
    pub posted: u64,

    /// Notifications the event queue refused.
    pub post_failures: u64,

    /// Waits stopped by cancellation.
    pub cancelled: u64,

    /// Requests refused because every slot was running.
    pub rejected: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub scheduled: AtomicU64,
    pub posted: AtomicU64,
    pub post_failures: AtomicU64,
    pub cancelled: AtomicU64,
    pub rejected: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, capacity: usize, running: usize) -> PoolStats {
        PoolStats {
            capacity,
            running,
            scheduled: self.scheduled.load(Ordering::Relaxed),
            posted: self.posted.load(Ordering::Relaxed),
            post_failures: self.post_failures.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// One slot of the table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub state: SlotState,
    pub task: Option<TaskHandle>,
    /// Bumped on every claim so heap entries from an earlier claim are
    /// recognisably stale.
    pub generation: u64,
}

impl Slot {
    pub const fn free() -> Self {
        Self {
            state: SlotState::Free,
            task: None,
            generation: 0,
        }
    }

    pub fn claim(&mut self, task: TaskHandle) -> u64 {
        self.state = SlotState::Running;
        self.task = Some(task);
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Free the slot, returning the task it held if it was running.
    pub fn release(&mut self) -> Option<TaskHandle> {
        let task = match self.state {
            SlotState::Running => self.task,
            SlotState::Free => None,
        };
        self.state = SlotState::Free;
        self.task = None;
        task
    }

    pub fn is_running_for(&self, generation: u64) -> bool {
        self.state == SlotState::Running && self.generation == generation
    }

    pub const fn snapshot(&self, index: usize) -> SlotSnapshot {
        SlotSnapshot {
            index,
            state: self.state,
            task: self.task,
        }
    }
}

/// Heap entry for a pending deadline. Ordered earliest-first for use in a
/// `BinaryHeap` (which is a max-heap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimerEntry {
    pub deadline: Instant,
    /// Insertion order; breaks deadline ties deterministically.
    pub seq: u64,
    pub slot: usize,
    pub generation: u64,
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;
    use std::time::Duration;

    #[test]
    fn test_pool_stats_default() {
        let stats = PoolStats::default();
        assert_eq!(stats.capacity, 0);
        assert_eq!(stats.running, 0);
        assert_eq!(stats.posted, 0);
    }

    #[test]
    fn test_pool_counters_snapshot() {
        let counters = PoolCounters::default();
        counters.scheduled.fetch_add(10, Ordering::Relaxed);
        counters.posted.fetch_add(5, Ordering::Relaxed);
        counters.cancelled.fetch_add(2, Ordering::Relaxed);

        let stats = counters.snapshot(20, 3);
        assert_eq!(stats.capacity, 20);
        assert_eq!(stats.running, 3);
        assert_eq!(stats.scheduled, 10);
        assert_eq!(stats.posted, 5);
        assert_eq!(stats.cancelled, 2);
        assert_eq!(stats.rejected, 0);
    }

    #[test]
    fn test_slot_lifecycle() {
        let mut slot = Slot::free();
        assert_eq!(slot.release(), None);

        let first = slot.claim(TaskHandle::new(3));
        assert!(slot.is_running_for(first));
        assert_eq!(slot.snapshot(4).task, Some(TaskHandle::new(3)));

        assert_eq!(slot.release(), Some(TaskHandle::new(3)));
        assert!(!slot.is_running_for(first));
        assert_eq!(slot.release(), None);

        let second = slot.claim(TaskHandle::new(3));
        assert_ne!(first, second);
        assert!(!slot.is_running_for(first));
    }

    #[test]
    fn test_timer_heap_pops_earliest_first() {
        let base = Instant::now();
        let mut heap = BinaryHeap::new();
        for (seq, offset_ms) in [(0_u64, 30_u64), (1, 10), (2, 20), (3, 10)] {
            heap.push(TimerEntry {
                deadline: base + Duration::from_millis(offset_ms),
                seq,
                slot: usize::try_from(seq).unwrap(),
                generation: 1,
            });
        }

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.seq)).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }
}
