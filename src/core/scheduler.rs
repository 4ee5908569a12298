//! Scheduler façade: the entry point a host task runtime talks to.
//!
//! A [`Scheduler`] owns one [`BeatCounter`] and one [`ResumeWorkerPool`].
//! Suspending a task is a non-blocking call that either arms a wait and
//! returns `true` or returns `false` straight away; when the wait expires the
//! task's handle shows up on the host's [`EventQueue`] as a [`ResumeEvent`].
//!
//! ```rust,ignore
//! use beatclock::core::Scheduler;
//! use beatclock::infra::InMemoryEventQueue;
//! use beatclock::util::TaskHandle;
//!
//! let scheduler = Scheduler::with_queue(InMemoryEventQueue::new())?;
//! scheduler.update_reference(0, 0.5)?;
//! assert!(scheduler.schedule_sync(TaskHandle::new(1), 4.0)); // next bar
//! assert!(scheduler.schedule_sleep(TaskHandle::new(2), 0.25));
//! ```
//!
//! [`ResumeEvent`]: crate::util::types::ResumeEvent

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::core::beat_counter::{BeatCounter, TempoSnapshot};
use crate::core::quantize;
use crate::core::worker_pool::{PoolStats, ResumeWorkerPool, SlotSnapshot};
use crate::core::{EventQueue, SchedulerError};
use crate::util::types::{ClockSource, TaskHandle};

/// Beat-synchronized resume scheduler.
pub struct Scheduler<Q: EventQueue> {
    counter: BeatCounter,
    pool: ResumeWorkerPool<Q>,
}

impl<Q: EventQueue> Scheduler<Q> {
    /// Build a scheduler from `config`, posting resumes to `queue`.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if the configuration is invalid
    /// - `SchedulerError::Spawn` if the timing thread cannot be started
    pub fn new(config: &SchedulerConfig, queue: Q) -> Result<Self, SchedulerError> {
        let pool = ResumeWorkerPool::new(config, queue)?;
        let counter = BeatCounter::new(config.beat_duration, config.source)?;
        info!(
            capacity = config.capacity,
            beat_duration = config.beat_duration,
            source = %config.source,
            "scheduler initialized"
        );
        Ok(Self { counter, pool })
    }

    /// Build a scheduler with the default configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Scheduler::new`].
    pub fn with_queue(queue: Q) -> Result<Self, SchedulerError> {
        Self::new(&SchedulerConfig::default(), queue)
    }

    /// Resume `task` after `seconds`.
    ///
    /// Negative and NaN durations resume as soon as the timing thread runs.
    /// Returns `false` if no slot is free, the pool is shut down, or
    /// `seconds` is too large to wait for.
    pub fn schedule_sleep(&self, task: TaskHandle, seconds: f64) -> bool {
        let wait = if seconds.is_nan() || seconds <= 0.0 {
            Duration::ZERO
        } else if let Ok(wait) = Duration::try_from_secs_f64(seconds) {
            wait
        } else {
            warn!(task = %task, seconds, "sleep rejected: duration not representable");
            return false;
        };
        self.pool.schedule_after(task, wait)
    }

    /// Resume `task` on the next acceptable multiple of `quantum` beats.
    ///
    /// Returns `false` if `quantum` is not finite and positive, or for the
    /// same reasons as [`Scheduler::schedule_sleep`].
    pub fn schedule_sync(&self, task: TaskHandle, quantum: f64) -> bool {
        let snapshot = self.counter.snapshot();
        let wakeup = quantize::next_boundary(&snapshot, quantum)
            .and_then(|wakeup| wakeup.wait(quantum).map(|wait| (wakeup.beat, wait)));
        match wakeup {
            Ok((beat, wait)) => {
                debug!(task = %task, quantum, beat, "sync target chosen");
                self.pool.schedule_after(task, wait)
            }
            Err(e) => {
                warn!(task = %task, quantum, error = %e, "sync rejected");
                false
            }
        }
    }

    /// Replace the tempo reference, keeping the current source.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidBeatDuration` for a non-positive or non-finite
    /// beat duration; the reference is left untouched.
    pub fn update_reference(&self, beats: u64, beat_duration: f64) -> Result<(), SchedulerError> {
        self.counter.update_reference(beats, beat_duration)
    }

    /// Replace the tempo reference on behalf of `source`.
    ///
    /// # Errors
    ///
    /// Same as [`Scheduler::update_reference`].
    pub fn update_reference_from(
        &self,
        beats: u64,
        beat_duration: f64,
        source: ClockSource,
    ) -> Result<(), SchedulerError> {
        self.counter.update_reference_from(beats, beat_duration, source)
    }

    /// Select the driver authoritative for future reference updates.
    pub fn set_source(&self, source: ClockSource) {
        self.counter.set_source(source);
    }

    /// Driver currently authoritative for reference updates.
    #[must_use]
    pub fn source(&self) -> ClockSource {
        self.counter.source()
    }

    /// Current fractional beat position.
    #[must_use]
    pub fn current_beat_position(&self) -> f64 {
        self.counter.current_beat_position()
    }

    /// Beat count recorded at the last reference update.
    #[must_use]
    pub fn reference_beats(&self) -> u64 {
        self.counter.reference_beats()
    }

    /// Zero the reference beat count. See [`BeatCounter::reset_reference_beats`].
    pub fn reset_reference_beats(&self) {
        self.counter.reset_reference_beats();
    }

    /// Consistent copy of the tempo reference.
    #[must_use]
    pub fn snapshot(&self) -> TempoSnapshot {
        self.counter.snapshot()
    }

    /// Seconds on the scheduler's monotonic clock.
    #[must_use]
    pub fn now_seconds(&self) -> f64 {
        self.counter.now_seconds()
    }

    /// Stop every pending wait owned by `task`. Returns how many were stopped.
    pub fn cancel(&self, task: TaskHandle) -> usize {
        self.pool.cancel(task)
    }

    /// Stop the wait in slot `index`. Returns whether one was running.
    pub fn cancel_by_index(&self, index: usize) -> bool {
        self.pool.cancel_by_index(index)
    }

    /// Stop every pending wait. Returns how many were stopped.
    pub fn cancel_all(&self) -> usize {
        self.pool.cancel_all()
    }

    /// Whether `task` has a pending wait.
    #[must_use]
    pub fn is_scheduled(&self, task: TaskHandle) -> bool {
        self.pool.is_scheduled(task)
    }

    /// Point-in-time view of every slot.
    #[must_use]
    pub fn slots(&self) -> Vec<SlotSnapshot> {
        self.pool.slots()
    }

    /// Pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// The tempo reference.
    #[must_use]
    pub const fn beat_counter(&self) -> &BeatCounter {
        &self.counter
    }

    /// The resume pool.
    #[must_use]
    pub const fn pool(&self) -> &ResumeWorkerPool<Q> {
        &self.pool
    }

    /// The event queue resumes are posted to.
    #[must_use]
    pub fn queue(&self) -> &Q {
        self.pool.queue()
    }

    /// Stop the timing thread and discard pending waits without posting.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::types::ResumeEvent;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[derive(Default)]
    struct RecordingQueue {
        events: Mutex<Vec<ResumeEvent>>,
    }

    impl EventQueue for RecordingQueue {
        fn post(&self, event: ResumeEvent) -> Result<(), SchedulerError> {
            self.events.lock().push(event);
            Ok(())
        }
    }

    fn scheduler() -> Scheduler<Arc<RecordingQueue>> {
        Scheduler::with_queue(Arc::new(RecordingQueue::default())).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SchedulerConfig::default().with_capacity(0);
        let result = Scheduler::new(&config, Arc::new(RecordingQueue::default()));
        assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_beat_duration_reported_as_config_error() {
        let config = SchedulerConfig::default().with_beat_duration(-1.0);
        let result = Scheduler::new(&config, Arc::new(RecordingQueue::default()));
        assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_sleep_fires_promptly() {
        let scheduler = scheduler();
        assert!(scheduler.schedule_sleep(TaskHandle::new(1), -3.0));
        assert!(scheduler.schedule_sleep(TaskHandle::new(2), f64::NAN));
        thread::sleep(Duration::from_millis(100));
        assert_eq!(scheduler.queue().events.lock().len(), 2);
    }

    #[test]
    fn test_infinite_sleep_rejected() {
        let scheduler = scheduler();
        assert!(!scheduler.schedule_sleep(TaskHandle::new(1), f64::INFINITY));
        assert_eq!(scheduler.stats().scheduled, 0);
    }

    #[test]
    fn test_invalid_quantum_rejected() {
        let scheduler = scheduler();
        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert!(!scheduler.schedule_sync(TaskHandle::new(1), bad));
        }
        assert_eq!(scheduler.stats().running, 0);
    }

    #[test]
    fn test_sync_then_cancel_posts_nothing() {
        let scheduler = scheduler();
        assert!(scheduler.schedule_sync(TaskHandle::new(9), 4.0));
        assert!(scheduler.is_scheduled(TaskHandle::new(9)));
        assert_eq!(scheduler.cancel(TaskHandle::new(9)), 1);
        thread::sleep(Duration::from_millis(50));
        assert!(scheduler.queue().events.lock().is_empty());
    }

    #[test]
    fn test_shutdown_refuses_new_work() {
        let scheduler = scheduler();
        scheduler.shutdown();
        assert!(!scheduler.schedule_sleep(TaskHandle::new(1), 0.01));
        scheduler.shutdown();
    }
}
