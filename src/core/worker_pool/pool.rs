//! Slot table, deadline heap and the timing thread that services them.
//!
//! # Design
//!
//! - **One lock**: slot table, deadline heap and shutdown flag share one
//!   `parking_lot::Mutex`, so scan-and-claim, expiry and cancellation are
//!   mutually atomic.
//! - **No polling**: the timing thread sleeps on a `Condvar` until the
//!   earliest deadline or until a new, earlier deadline is pushed.
//! - **Cooperative cancellation**: cancelling frees the slot and purges its
//!   deadline; the timing thread never sees it again. Nothing is torn down
//!   mid-wait.

use std::any::Any;
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::core::{EventQueue, SchedulerError};
use crate::util::types::{ResumeEvent, TaskHandle};

use super::{PoolCounters, PoolStats, Slot, SlotSnapshot, SlotState, TimerEntry};

/// Everything guarded by the table lock.
struct TableState {
    slots: Vec<Slot>,
    timers: BinaryHeap<TimerEntry>,
    next_seq: u64,
    shutdown: bool,
}

impl TableState {
    fn running(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Running)
            .count()
    }

    /// Drop heap entries whose slot was freed or reclaimed since they were pushed.
    fn purge_stale(&mut self) {
        let Self { slots, timers, .. } = self;
        timers.retain(|entry| {
            slots
                .get(entry.slot)
                .is_some_and(|slot| slot.is_running_for(entry.generation))
        });
    }
}

/// State shared between the pool handle and its timing thread.
struct Shared<Q> {
    table: Mutex<TableState>,
    wake: Condvar,
    counters: PoolCounters,
    queue: Q,
}

/// Fixed-capacity pool of timed resume slots.
///
/// Scheduling never blocks: it either claims a free slot and returns `true`,
/// or returns `false` when every slot is running. When a wait expires the
/// pool posts one [`ResumeEvent`] to its [`EventQueue`] and frees the slot.
pub struct ResumeWorkerPool<Q: EventQueue> {
    shared: Arc<Shared<Q>>,
    capacity: usize,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<Q: EventQueue> ResumeWorkerPool<Q> {
    /// Create a pool sized by `config.capacity` and start its timing thread.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if the configuration is invalid
    /// - `SchedulerError::Spawn` if the timing thread cannot be started
    pub fn new(config: &SchedulerConfig, queue: Q) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let capacity = config.capacity;
        let shared = Arc::new(Shared {
            table: Mutex::new(TableState {
                slots: vec![Slot::free(); capacity],
                timers: BinaryHeap::with_capacity(capacity),
                next_seq: 0,
                shutdown: false,
            }),
            wake: Condvar::new(),
            counters: PoolCounters::default(),
            queue,
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(config.timer_thread_name.clone())
            .stack_size(config.timer_stack_size)
            .spawn(move || run_timer_loop(&worker_shared))
            .map_err(|e| {
                error!(error = %e, "failed to spawn timing thread");
                SchedulerError::Spawn(e)
            })?;

        info!(capacity, thread = %config.timer_thread_name, "ResumeWorkerPool initialized");

        Ok(Self {
            shared,
            capacity,
            timer: Mutex::new(Some(handle)),
        })
    }

    /// Claim a free slot and arm a wait of `wait` for `task`.
    ///
    /// Returns `false` without queueing anything if every slot is running,
    /// if the pool has been shut down, or if `wait` is too large to express
    /// as a deadline.
    pub fn schedule_after(&self, task: TaskHandle, wait: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(wait) else {
            warn!(task = %task, wait_secs = wait.as_secs(), "wait too long to schedule");
            return false;
        };

        let mut table = self.shared.table.lock();
        if table.shutdown {
            warn!(task = %task, "schedule rejected: pool shut down");
            return false;
        }

        let Some(index) = table
            .slots
            .iter()
            .position(|slot| slot.state == SlotState::Free)
        else {
            drop(table);
            self.shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(task = %task, capacity = self.capacity, "resume pool exhausted");
            return false;
        };

        let generation = table.slots[index].claim(task);
        let seq = table.next_seq;
        table.next_seq = seq.wrapping_add(1);
        let earliest = table
            .timers
            .peek()
            .is_none_or(|next| deadline < next.deadline);
        table.timers.push(TimerEntry {
            deadline,
            seq,
            slot: index,
            generation,
        });
        drop(table);

        if earliest {
            self.shared.wake.notify_one();
        }
        self.shared.counters.scheduled.fetch_add(1, Ordering::Relaxed);
        debug!(
            task = %task,
            slot = index,
            wait_us = wait.as_micros(),
            "resume scheduled"
        );
        true
    }

    /// Stop every running wait owned by `task`. Returns how many were stopped;
    /// zero is a normal outcome, not an error.
    pub fn cancel(&self, task: TaskHandle) -> usize {
        let stopped = self.cancel_matching(|_, slot| slot.task == Some(task));
        debug!(task = %task, stopped, "cancel by task");
        stopped
    }

    /// Stop the wait in slot `index`, whatever task owns it. Returns whether
    /// a running wait was stopped.
    pub fn cancel_by_index(&self, index: usize) -> bool {
        if index >= self.capacity {
            warn!(index, capacity = self.capacity, "cancel for slot outside pool");
            return false;
        }
        let stopped = self.cancel_matching(|slot_index, _| slot_index == index);
        debug!(slot = index, stopped, "cancel by index");
        stopped == 1
    }

    /// Stop every running wait. Returns how many were stopped.
    pub fn cancel_all(&self) -> usize {
        let stopped = self.cancel_matching(|_, _| true);
        debug!(stopped, "cancel all");
        stopped
    }

    fn cancel_matching(&self, mut matches: impl FnMut(usize, &Slot) -> bool) -> usize {
        let mut table = self.shared.table.lock();
        let mut stopped = 0_usize;
        for (index, slot) in table.slots.iter_mut().enumerate() {
            if slot.state == SlotState::Running && matches(index, slot) {
                slot.release();
                stopped += 1;
            }
        }
        if stopped == 0 {
            return 0;
        }
        table.purge_stale();
        drop(table);

        self.shared.wake.notify_one();
        self.shared
            .counters
            .cancelled
            .fetch_add(stopped as u64, Ordering::Relaxed);
        stopped
    }

    /// Whether `task` currently owns a running slot.
    #[must_use]
    pub fn is_scheduled(&self, task: TaskHandle) -> bool {
        self.shared
            .table
            .lock()
            .slots
            .iter()
            .any(|slot| slot.state == SlotState::Running && slot.task == Some(task))
    }

    /// Number of slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of running slots.
    #[must_use]
    pub fn running(&self) -> usize {
        self.shared.table.lock().running()
    }

    /// Point-in-time view of every slot.
    #[must_use]
    pub fn slots(&self) -> Vec<SlotSnapshot> {
        self.shared
            .table
            .lock()
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.snapshot(index))
            .collect()
    }

    /// Current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let running = self.running();
        self.shared.counters.snapshot(self.capacity, running)
    }

    /// The event queue resume notifications are posted to.
    #[must_use]
    pub fn queue(&self) -> &Q {
        &self.shared.queue
    }

    /// Stop the timing thread and discard pending waits without posting.
    ///
    /// Later scheduling calls return `false`. Concurrent callers all return
    /// only after the timing thread has been joined; repeat calls are no-ops.
    pub fn shutdown(&self) {
        let mut timer = self.timer.lock();
        {
            let mut table = self.shared.table.lock();
            if !table.shutdown {
                table.shutdown = true;
                let discarded = table
                    .slots
                    .iter_mut()
                    .filter_map(Slot::release)
                    .count();
                table.timers.clear();
                info!(discarded, "shutting down resume pool");
            }
        }
        self.shared.wake.notify_all();

        if let Some(handle) = timer.take() {
            if handle.join().is_err() {
                warn!("timing thread panicked");
            } else {
                debug!("timing thread joined");
            }
        }
    }
}

impl<Q: EventQueue> Drop for ResumeWorkerPool<Q> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Body of the timing thread.
fn run_timer_loop<Q: EventQueue>(shared: &Shared<Q>) {
    debug!("timing thread started");
    let mut table = shared.table.lock();
    while !table.shutdown {
        let now = Instant::now();
        match table.timers.peek().map(|entry| entry.deadline) {
            None => shared.wake.wait(&mut table),
            Some(deadline) if deadline > now => {
                let _ = shared.wake.wait_until(&mut table, deadline);
            }
            Some(_) => {
                if let Some(entry) = table.timers.pop() {
                    fire(shared, &mut table, entry, now);
                }
            }
        }
    }
    debug!("timing thread exiting");
}

/// Post the resume for a due entry, then free its slot.
///
/// A panicking queue counts as a failed post; the slot is freed either way
/// and the timing thread keeps running.
fn fire<Q: EventQueue>(
    shared: &Shared<Q>,
    table: &mut TableState,
    entry: TimerEntry,
    now: Instant,
) {
    let Some(slot) = table.slots.get_mut(entry.slot) else {
        return;
    };
    if !slot.is_running_for(entry.generation) {
        debug!(slot = entry.slot, "skipping stale deadline");
        return;
    }
    let Some(task) = slot.task else {
        slot.release();
        return;
    };

    let posted = panic::catch_unwind(AssertUnwindSafe(|| {
        shared.queue.post(ResumeEvent::new(task))
    }));
    match posted {
        Ok(Ok(())) => {
            shared.counters.posted.fetch_add(1, Ordering::Relaxed);
            debug!(
                task = %task,
                slot = entry.slot,
                late_us = now.saturating_duration_since(entry.deadline).as_micros(),
                "resume posted"
            );
        }
        Ok(Err(e)) => {
            shared.counters.post_failures.fetch_add(1, Ordering::Relaxed);
            error!(task = %task, slot = entry.slot, error = %e, "failed to post resume");
        }
        Err(payload) => {
            shared.counters.post_failures.fetch_add(1, Ordering::Relaxed);
            error!(
                task = %task,
                slot = entry.slot,
                panic = panic_message(payload.as_ref()),
                "event queue panicked while posting resume"
            );
        }
    }
    slot.release();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
