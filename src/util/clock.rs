//! Time helpers.
//!
//! The tempo reference works in fractional seconds on a monotonic clock, so
//! wall-clock adjustments never move beat positions. Wall-clock milliseconds
//! are only used to stamp posted events for diagnostics.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic clock reporting fractional seconds since its own epoch.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Start a clock whose epoch is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Seconds elapsed since the epoch.
    #[must_use]
    pub fn now_seconds(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock milliseconds since the Unix epoch (0 if the system clock is before it).
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
