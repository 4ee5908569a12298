//! In-memory FIFO event queue for polling hosts and tests.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::core::{EventQueue, SchedulerError};
use crate::util::clock::now_ms;
use crate::util::types::ResumeEvent;

/// A resume notification together with the wall-clock time it was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedEvent {
    /// The notification.
    pub event: ResumeEvent,
    /// Wall-clock milliseconds at post time.
    pub posted_at_ms: u128,
}

/// Mutex-protected FIFO of posted resume notifications.
#[derive(Debug, Default)]
pub struct InMemoryEventQueue {
    max_depth: Option<usize>,
    events: Mutex<VecDeque<PostedEvent>>,
    ready: Condvar,
}

impl InMemoryEventQueue {
    /// Create an unbounded queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue refusing posts once `max_depth` events are pending.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::default()
        }
    }

    /// Remove and return the oldest pending event.
    pub fn pop(&self) -> Option<PostedEvent> {
        self.events.lock().pop_front()
    }

    /// Remove and return every pending event, oldest first.
    pub fn drain(&self) -> Vec<PostedEvent> {
        self.events.lock().drain(..).collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Block until at least `count` events are pending or `timeout` elapses.
    /// Returns whether the count was reached.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock();
        while events.len() < count {
            if self.ready.wait_until(&mut events, deadline).timed_out() {
                return events.len() >= count;
            }
        }
        true
    }
}

impl EventQueue for InMemoryEventQueue {
    fn post(&self, event: ResumeEvent) -> Result<(), SchedulerError> {
        let mut events = self.events.lock();
        if self.max_depth.is_some_and(|max| events.len() >= max) {
            return Err(SchedulerError::EventQueue("max queue depth reached".into()));
        }
        events.push_back(PostedEvent {
            event,
            posted_at_ms: now_ms(),
        });
        drop(events);
        self.ready.notify_all();
        Ok(())
    }
}
