//! # beatclock
//!
//! A beat-synchronized resume scheduler for cooperative tasks in a live
//! performance environment.
//!
//! Tasks suspend themselves for a fixed number of seconds or until a future
//! beat boundary, and are resumed later when the scheduler posts a resume
//! notification carrying their handle to the host's event queue.
//!
//! ## Components
//!
//! - **`BeatCounter`**: the shared tempo reference (beat count, seconds per
//!   beat, time of last update) and wall-clock/beat conversion
//! - **Quantization**: picks the next beat boundary that is a whole multiple
//!   of a quantum and at least half a quantum away
//! - **`ResumeWorkerPool`**: a fixed number of resume slots serviced by one
//!   timing thread; full pools refuse work instead of queueing it
//! - **`Scheduler`**: the façade hosts call into
//!
//! ## Example
//!
//! ```rust,ignore
//! use beatclock::builders::build_scheduler;
//! use beatclock::config::SchedulerConfig;
//! use beatclock::infra::ChannelEventQueue;
//! use beatclock::util::TaskHandle;
//!
//! let (queue, resumes) = ChannelEventQueue::unbounded();
//! let scheduler = build_scheduler(&SchedulerConfig::default(), queue)?;
//!
//! scheduler.update_reference(0, 60.0 / 128.0)?;
//! assert!(scheduler.schedule_sync(TaskHandle::new(7), 1.0));
//!
//! let event = resumes.recv()?;
//! assert_eq!(event.task, TaskHandle::new(7));
//! ```
//!
//! See `tests/scheduler_test.rs` for end-to-end usage.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: tempo, quantization, resume pool, façade.
pub mod core;
/// Configuration models for the scheduler and its timing thread.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Event queue adapters resume notifications are posted to.
pub mod infra;
/// Shared utilities.
pub mod util;
