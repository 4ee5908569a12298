//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
///
/// Pool exhaustion is deliberately absent: a full pool is reported as a
/// `false` return from the scheduling calls, not as an error.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Beat duration must be finite and strictly positive.
    #[error("invalid beat duration: {0}")]
    InvalidBeatDuration(f64),
    /// Quantum must be finite and strictly positive.
    #[error("invalid quantum: {0}")]
    InvalidQuantum(f64),
    /// Clock source value not recognised.
    #[error("unknown clock source: {0}")]
    UnknownClockSource(String),
    /// The operating system refused to start the timing thread.
    #[error("failed to spawn timing thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The event queue rejected a notification.
    #[error("event queue error: {0}")]
    EventQueue(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
