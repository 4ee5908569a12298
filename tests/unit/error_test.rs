//! Tests for error types

use beatclock::core::SchedulerError;
use std::error::Error;

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: capacity must be greater than 0"
    );
}

#[test]
fn test_invalid_beat_duration_error() {
    let err = SchedulerError::InvalidBeatDuration(-0.5);
    assert_eq!(format!("{err}"), "invalid beat duration: -0.5");
}

#[test]
fn test_invalid_quantum_error() {
    let err = SchedulerError::InvalidQuantum(0.0);
    assert_eq!(format!("{err}"), "invalid quantum: 0");
}

#[test]
fn test_unknown_clock_source_error() {
    let err = SchedulerError::UnknownClockSource("crystal".to_string());
    assert_eq!(format!("{err}"), "unknown clock source: crystal");
}

#[test]
fn test_spawn_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left");
    let err = SchedulerError::Spawn(io);
    assert_eq!(
        format!("{err}"),
        "failed to spawn timing thread: no threads left"
    );
    assert!(err.source().is_some());
}

#[test]
fn test_event_queue_error() {
    let err = SchedulerError::EventQueue("channel full".to_string());
    assert_eq!(format!("{err}"), "event queue error: channel full");
}
