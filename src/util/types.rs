//! Identifier and message types shared between the scheduler and its host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// Opaque token identifying a suspended unit of work in the host runtime.
///
/// The scheduler never looks inside a handle; it only compares handles for
/// equality when cancelling and hands them back in [`ResumeEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Wrap a raw host identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Which driver is authoritative for tempo reference updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ClockSource {
    /// The host's own tempo.
    #[default]
    Internal = 0,
    /// An outboard clock feed (e.g. MIDI clock).
    External = 1,
}

impl ClockSource {
    /// Numeric value used across host boundaries.
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ClockSource {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Internal),
            1 => Ok(Self::External),
            other => Err(SchedulerError::UnknownClockSource(other.to_string())),
        }
    }
}

impl FromStr for ClockSource {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" | "0" => Ok(Self::Internal),
            "external" | "midi" | "1" => Ok(Self::External),
            _ => Err(SchedulerError::UnknownClockSource(s.to_string())),
        }
    }
}

impl fmt::Display for ClockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => f.write_str("internal"),
            Self::External => f.write_str("external"),
        }
    }
}

/// Notification posted to the host event queue when a wait expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeEvent {
    /// The task to resume.
    pub task: TaskHandle,
}

impl ResumeEvent {
    /// Allocate a resume notification for `task`.
    #[must_use]
    pub const fn new(task: TaskHandle) -> Self {
        Self { task }
    }
}
