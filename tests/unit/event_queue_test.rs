//! Tests for event queue backends

use beatclock::core::{EventQueue, SchedulerError};
use beatclock::infra::{ChannelEventQueue, InMemoryEventQueue};
use beatclock::util::{ResumeEvent, TaskHandle};
use std::sync::Arc;

fn event(raw: u64) -> ResumeEvent {
    ResumeEvent::new(TaskHandle::new(raw))
}

#[test]
fn test_shared_in_memory_queue() {
    let queue = Arc::new(InMemoryEventQueue::new());
    let handle: Arc<InMemoryEventQueue> = Arc::clone(&queue);

    handle.post(event(1)).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.pop().unwrap().event, event(1));
}

#[test]
fn test_dyn_event_queue() {
    let (channel, rx) = ChannelEventQueue::bounded(4);
    let queue: Arc<dyn EventQueue> = Arc::new(channel);

    queue.post(event(5)).unwrap();
    assert_eq!(rx.recv().unwrap(), event(5));
}

#[test]
fn test_posted_events_are_stamped() {
    let queue = InMemoryEventQueue::new();
    queue.post(event(2)).unwrap();
    assert!(queue.pop().unwrap().posted_at_ms > 0);
}

#[test]
fn test_channel_full_is_event_queue_error() {
    let (queue, _rx) = ChannelEventQueue::bounded(0);
    assert!(matches!(queue.post(event(1)), Err(SchedulerError::EventQueue(_))));
}

#[cfg(feature = "tokio-runtime")]
#[tokio::test]
async fn test_tokio_queue_reports_dropped_receiver() {
    use beatclock::infra::TokioEventQueue;

    let (queue, mut rx) = TokioEventQueue::channel();
    queue.post(event(3)).unwrap();
    assert_eq!(rx.recv().await, Some(event(3)));

    drop(rx);
    assert!(matches!(queue.post(event(4)), Err(SchedulerError::EventQueue(_))));
}
