//! Event queue adapters resume notifications are posted to.

pub mod queue;

pub use queue::{ChannelEventQueue, InMemoryEventQueue, PostedEvent};
#[cfg(feature = "tokio-runtime")]
pub use queue::TokioEventQueue;
