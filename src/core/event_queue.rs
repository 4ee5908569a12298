//! Downward interface to the host's event queue.

use std::sync::Arc;

use crate::core::SchedulerError;
use crate::util::types::ResumeEvent;

/// Sink for resume notifications.
///
/// The timing thread calls [`EventQueue::post`] while it holds the slot table
/// lock, which is what makes "cancel returned, so no resume will be posted"
/// hold. Implementations must therefore return promptly and must not call
/// back into the scheduler.
pub trait EventQueue: Send + Sync + 'static {
    /// Enqueue `event` for asynchronous delivery to the task runtime.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::EventQueue` if the notification could not be
    /// accepted. The scheduler logs the failure; the slot is freed either way.
    fn post(&self, event: ResumeEvent) -> Result<(), SchedulerError>;
}

impl<Q: EventQueue + ?Sized> EventQueue for Arc<Q> {
    fn post(&self, event: ResumeEvent) -> Result<(), SchedulerError> {
        (**self).post(event)
    }
}
