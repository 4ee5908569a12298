//! Event queue backed by a crossbeam channel.

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::core::{EventQueue, SchedulerError};
use crate::util::types::ResumeEvent;

/// Sender half of a crossbeam channel used as an event queue.
///
/// The host keeps the matching [`Receiver`] and drains it from its own
/// event loop.
#[derive(Debug, Clone)]
pub struct ChannelEventQueue {
    tx: Sender<ResumeEvent>,
}

impl ChannelEventQueue {
    /// Create an unbounded queue and the receiver to read it from.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<ResumeEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Create a queue holding at most `capacity` undelivered events.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<ResumeEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    #[must_use]
    pub const fn from_sender(tx: Sender<ResumeEvent>) -> Self {
        Self { tx }
    }
}

impl EventQueue for ChannelEventQueue {
    fn post(&self, event: ResumeEvent) -> Result<(), SchedulerError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SchedulerError::EventQueue("channel full".into())),
            Err(TrySendError::Disconnected(_)) => {
                Err(SchedulerError::EventQueue("receiver disconnected".into()))
            }
        }
    }
}
