//! Shared tempo reference and wall-clock/beat conversion.
//!
//! The reference is three values (beat count, seconds per beat, time of the
//! last update) that only make sense together. Every read and write goes
//! through one `parking_lot::Mutex`, and readers always work from a
//! [`TempoSnapshot`] copied out under that lock.

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::core::SchedulerError;
use crate::util::clock::MonotonicClock;
use crate::util::types::ClockSource;

/// Seconds per beat at init (120 BPM).
pub const DEFAULT_BEAT_DURATION: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
struct TempoReference {
    reference_beats: u64,
    beat_duration: f64,
    reference_time: f64,
    source: ClockSource,
}

/// A consistent copy of the tempo reference plus the clock reading taken
/// under the same lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoSnapshot {
    /// Beat count at the last reference update.
    pub reference_beats: u64,
    /// Seconds per beat.
    pub beat_duration: f64,
    /// Clock seconds at the last reference update.
    pub reference_time: f64,
    /// Driver that was authoritative when the snapshot was taken.
    pub source: ClockSource,
    /// Clock seconds when the snapshot was taken.
    pub taken_at: f64,
}

impl TempoSnapshot {
    /// Clock seconds at which beat zero fell under this reference.
    #[must_use]
    pub fn zero_beat_time(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let beats = self.reference_beats as f64;
        self.beat_duration.mul_add(-beats, self.reference_time)
    }

    /// Fractional beat position at an arbitrary clock time.
    #[must_use]
    pub fn beat_position_at(&self, time: f64) -> f64 {
        (time - self.zero_beat_time()) / self.beat_duration
    }

    /// Fractional beat position when the snapshot was taken.
    #[must_use]
    pub fn beat_position(&self) -> f64 {
        self.beat_position_at(self.taken_at)
    }

    /// Clock seconds at which `beat` falls.
    #[must_use]
    pub fn time_at_beat(&self, beat: f64) -> f64 {
        beat.mul_add(self.beat_duration, self.zero_beat_time())
    }
}

/// Tempo reference shared by the scheduler and its tempo drivers.
#[derive(Debug)]
pub struct BeatCounter {
    clock: MonotonicClock,
    reference: Mutex<TempoReference>,
}

impl BeatCounter {
    /// Create a counter at beat 0 with the given beat duration and source.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidBeatDuration` if `beat_duration` is
    /// not finite and strictly positive.
    pub fn new(beat_duration: f64, source: ClockSource) -> Result<Self, SchedulerError> {
        validate_beat_duration(beat_duration)?;
        let clock = MonotonicClock::new();
        let reference = TempoReference {
            reference_beats: 0,
            beat_duration,
            reference_time: clock.now_seconds(),
            source,
        };
        Ok(Self {
            clock,
            reference: Mutex::new(reference),
        })
    }

    /// Replace the reference, keeping the current source.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidBeatDuration` and leaves the reference
    /// untouched if `beat_duration` is not finite and strictly positive.
    pub fn update_reference(&self, beats: u64, beat_duration: f64) -> Result<(), SchedulerError> {
        self.replace(beats, beat_duration, None)
    }

    /// Replace the reference and record `source` as authoritative.
    ///
    /// # Errors
    ///
    /// Same as [`BeatCounter::update_reference`].
    pub fn update_reference_from(
        &self,
        beats: u64,
        beat_duration: f64,
        source: ClockSource,
    ) -> Result<(), SchedulerError> {
        self.replace(beats, beat_duration, Some(source))
    }

    fn replace(
        &self,
        beats: u64,
        beat_duration: f64,
        source: Option<ClockSource>,
    ) -> Result<(), SchedulerError> {
        validate_beat_duration(beat_duration)?;
        let mut reference = self.reference.lock();
        reference.reference_time = self.clock.now_seconds();
        reference.reference_beats = beats;
        reference.beat_duration = beat_duration;
        if let Some(source) = source {
            reference.source = source;
        }
        debug!(
            beats,
            beat_duration,
            source = %reference.source,
            "tempo reference updated"
        );
        Ok(())
    }

    /// Record which driver is authoritative for future updates.
    pub fn set_source(&self, source: ClockSource) {
        let mut reference = self.reference.lock();
        if reference.source != source {
            info!(from = %reference.source, to = %source, "clock source changed");
            reference.source = source;
        }
    }

    /// Driver currently recorded as authoritative.
    #[must_use]
    pub fn source(&self) -> ClockSource {
        self.reference.lock().source
    }

    /// Copy the reference and read the clock under one lock acquisition.
    #[must_use]
    pub fn snapshot(&self) -> TempoSnapshot {
        let reference = self.reference.lock();
        TempoSnapshot {
            reference_beats: reference.reference_beats,
            beat_duration: reference.beat_duration,
            reference_time: reference.reference_time,
            source: reference.source,
            taken_at: self.clock.now_seconds(),
        }
    }

    /// Current fractional beat position.
    #[must_use]
    pub fn current_beat_position(&self) -> f64 {
        self.snapshot().beat_position()
    }

    /// Beat count recorded at the last reference update.
    #[must_use]
    pub fn reference_beats(&self) -> u64 {
        self.reference.lock().reference_beats
    }

    /// Zero the reference beat count without touching the reference time or
    /// beat duration.
    ///
    /// This moves the zero-beat time, so [`BeatCounter::current_beat_position`]
    /// jumps back by the old reference count immediately afterwards.
    pub fn reset_reference_beats(&self) {
        let mut reference = self.reference.lock();
        debug!(previous = reference.reference_beats, "reference beats reset");
        reference.reference_beats = 0;
    }

    /// Seconds on the counter's monotonic clock.
    #[must_use]
    pub fn now_seconds(&self) -> f64 {
        self.clock.now_seconds()
    }

    /// The monotonic clock all reference times are expressed on.
    #[must_use]
    pub const fn clock(&self) -> &MonotonicClock {
        &self.clock
    }
}

impl Default for BeatCounter {
    fn default() -> Self {
        let clock = MonotonicClock::new();
        let reference = TempoReference {
            reference_beats: 0,
            beat_duration: DEFAULT_BEAT_DURATION,
            reference_time: clock.now_seconds(),
            source: ClockSource::Internal,
        };
        Self {
            clock,
            reference: Mutex::new(reference),
        }
    }
}

fn validate_beat_duration(beat_duration: f64) -> Result<(), SchedulerError> {
    if beat_duration.is_finite() && beat_duration > 0.0 {
        Ok(())
    } else {
        Err(SchedulerError::InvalidBeatDuration(beat_duration))
    }
}
