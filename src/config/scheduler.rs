//! Scheduler configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::beat_counter::DEFAULT_BEAT_DURATION;
use crate::core::worker_pool::DEFAULT_CAPACITY;
use crate::core::AppResult;
use crate::util::types::ClockSource;

/// Environment variable overriding [`SchedulerConfig::capacity`].
pub const ENV_CAPACITY: &str = "BEATCLOCK_CAPACITY";
/// Environment variable overriding [`SchedulerConfig::beat_duration`].
pub const ENV_BEAT_DURATION: &str = "BEATCLOCK_BEAT_DURATION";
/// Environment variable overriding [`SchedulerConfig::source`].
pub const ENV_SOURCE: &str = "BEATCLOCK_SOURCE";
/// Environment variable overriding [`SchedulerConfig::timer_stack_size`].
pub const ENV_TIMER_STACK_SIZE: &str = "BEATCLOCK_TIMER_STACK_SIZE";

const MIN_TIMER_STACK_SIZE: usize = 16 * 1024;

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of resume slots.
    pub capacity: usize,
    /// Seconds per beat at init.
    pub beat_duration: f64,
    /// Driver authoritative at init.
    pub source: ClockSource,
    /// Name given to the timing thread.
    pub timer_thread_name: String,
    /// Stack size of the timing thread in bytes.
    pub timer_stack_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            beat_duration: DEFAULT_BEAT_DURATION,
            source: ClockSource::Internal,
            timer_thread_name: "beat-timer".to_string(),
            timer_stack_size: 64 * 1024,
        }
    }
}

impl SchedulerConfig {
    /// Configuration with reference defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of resume slots.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the initial beat duration in seconds.
    #[must_use]
    pub const fn with_beat_duration(mut self, beat_duration: f64) -> Self {
        self.beat_duration = beat_duration;
        self
    }

    /// Set the initially authoritative clock source.
    #[must_use]
    pub const fn with_source(mut self, source: ClockSource) -> Self {
        self.source = source;
        self
    }

    /// Set the timing thread's name.
    #[must_use]
    pub fn with_timer_thread_name(mut self, name: impl Into<String>) -> Self {
        self.timer_thread_name = name.into();
        self
    }

    /// Set the timing thread's stack size in bytes.
    #[must_use]
    pub const fn with_timer_stack_size(mut self, bytes: usize) -> Self {
        self.timer_stack_size = bytes;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if !(self.beat_duration.is_finite() && self.beat_duration > 0.0) {
            return Err(format!(
                "beat_duration must be a positive number of seconds, got {}",
                self.beat_duration
            ));
        }
        if self.timer_thread_name.contains('\0') {
            return Err("timer_thread_name must not contain NUL bytes".into());
        }
        if self.timer_stack_size < MIN_TIMER_STACK_SIZE {
            return Err(format!(
                "timer_stack_size must be at least {MIN_TIMER_STACK_SIZE} bytes"
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` if present, then apply `BEATCLOCK_*` overrides from the
    /// process environment on top of the defaults.
    ///
    /// # Errors
    ///
    /// Fails if an override cannot be parsed or the result is invalid.
    pub fn from_env() -> AppResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides obtained from `lookup` on top of the defaults.
    ///
    /// # Errors
    ///
    /// Fails if an override cannot be parsed or the result is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_CAPACITY) {
            cfg.capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CAPACITY}={raw:?} is not a slot count"))?;
        }
        if let Some(raw) = lookup(ENV_BEAT_DURATION) {
            cfg.beat_duration = raw
                .trim()
                .parse()
                .with_context(|| {
                    format!("{ENV_BEAT_DURATION}={raw:?} is not a number of seconds")
                })?;
        }
        if let Some(raw) = lookup(ENV_SOURCE) {
            cfg.source = raw
                .parse()
                .with_context(|| format!("{ENV_SOURCE}={raw:?} is not a clock source"))?;
        }
        if let Some(raw) = lookup(ENV_TIMER_STACK_SIZE) {
            cfg.timer_stack_size = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMER_STACK_SIZE}={raw:?} is not a byte count"))?;
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}
