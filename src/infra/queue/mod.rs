//! Event queue backends.

pub mod channel;
pub mod memory;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_queue;

pub use channel::ChannelEventQueue;
pub use memory::{InMemoryEventQueue, PostedEvent};
#[cfg(feature = "tokio-runtime")]
pub use tokio_queue::TokioEventQueue;
