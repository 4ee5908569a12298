//! Quantized wakeup computation.
//!
//! Given a quantum `q` (in beats) and a [`TempoSnapshot`], find the earliest
//! beat boundary that is a whole number of quanta from beat zero and at least
//! half a quantum (in seconds) away. The half-quantum lead keeps a wakeup from
//! landing so close to "now" that timer jitter would make it fire late into
//! the boundary it was meant to hit.

use std::time::Duration;

use crate::core::beat_counter::TempoSnapshot;
use crate::core::SchedulerError;

/// Upper bound on boundary candidates tried. The lead condition is always met
/// by the second candidate; the cap only guards against float pathologies.
const MAX_CANDIDATES: u32 = 64;

/// A chosen beat boundary and the wait needed to reach it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedWakeup {
    /// Absolute beat of the boundary.
    pub beat: f64,
    /// Seconds from the snapshot's clock reading to the boundary.
    pub wait_seconds: f64,
}

impl QuantizedWakeup {
    /// The wait as a `Duration`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidQuantum` if the wait cannot be
    /// represented (e.g. an astronomically large quantum).
    pub fn wait(&self, quantum: f64) -> Result<Duration, SchedulerError> {
        Duration::try_from_secs_f64(self.wait_seconds)
            .map_err(|_| SchedulerError::InvalidQuantum(quantum))
    }
}

/// Find the next acceptable boundary for `quantum` under `snapshot`.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidQuantum` unless `quantum` is finite and
/// strictly positive.
pub fn next_boundary(
    snapshot: &TempoSnapshot,
    quantum: f64,
) -> Result<QuantizedWakeup, SchedulerError> {
    if !(quantum.is_finite() && quantum > 0.0) {
        return Err(SchedulerError::InvalidQuantum(quantum));
    }

    let now = snapshot.taken_at;
    let min_lead = snapshot.beat_duration * quantum / 2.0;
    let base = (snapshot.beat_position_at(now) / quantum).floor();

    let mut beat = 0.0;
    let mut wait_seconds = 0.0;
    for quant_count in 1..=MAX_CANDIDATES {
        beat = (base + f64::from(quant_count)) * quantum;
        wait_seconds = snapshot.time_at_beat(beat) - now;
        if wait_seconds >= min_lead {
            break;
        }
    }

    if !(wait_seconds.is_finite() && wait_seconds >= min_lead) {
        return Err(SchedulerError::InvalidQuantum(quantum));
    }

    Ok(QuantizedWakeup { beat, wait_seconds })
}

/// Wait until the next acceptable boundary for `quantum`.
///
/// The result is always at least `beat_duration * quantum / 2`.
///
/// # Errors
///
/// See [`next_boundary`] and [`QuantizedWakeup::wait`].
pub fn compute_wait(snapshot: &TempoSnapshot, quantum: f64) -> Result<Duration, SchedulerError> {
    next_boundary(snapshot, quantum)?.wait(quantum)
}
