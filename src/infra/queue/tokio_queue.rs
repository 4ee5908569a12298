//! Event queue feeding a tokio mpsc channel, for async hosts.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::{EventQueue, SchedulerError};
use crate::util::types::ResumeEvent;

/// Unbounded tokio mpsc sender used as an event queue.
///
/// Posting never blocks and needs no runtime, so the timing thread can post
/// directly; the host awaits the receiver on its own runtime.
#[derive(Debug, Clone)]
pub struct TokioEventQueue {
    tx: UnboundedSender<ResumeEvent>,
}

impl TokioEventQueue {
    /// Create the queue and the receiver to await events on.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<ResumeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventQueue for TokioEventQueue {
    fn post(&self, event: ResumeEvent) -> Result<(), SchedulerError> {
        self.tx
            .send(event)
            .map_err(|_| SchedulerError::EventQueue("receiver dropped".into()))
    }
}
