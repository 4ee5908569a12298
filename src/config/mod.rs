//! Configuration models for the scheduler and its timing thread.

pub mod scheduler;

pub use scheduler::SchedulerConfig;
