//! Core scheduling abstractions: tempo reference, quantization, the resume
//! pool and the scheduler façade tying them together.

pub mod beat_counter;
pub mod error;
pub mod event_queue;
pub mod quantize;
pub mod scheduler;
pub mod worker_pool;

pub use beat_counter::{BeatCounter, TempoSnapshot, DEFAULT_BEAT_DURATION};
pub use error::{AppResult, SchedulerError};
pub use event_queue::EventQueue;
pub use quantize::{compute_wait, next_boundary, QuantizedWakeup};
pub use scheduler::Scheduler;
pub use worker_pool::{PoolStats, ResumeWorkerPool, SlotSnapshot, SlotState, DEFAULT_CAPACITY};
