//! Tests for utility types

use beatclock::util::{ClockSource, MonotonicClock, ResumeEvent, TaskHandle};

#[test]
fn test_task_handle_equality() {
    let a = TaskHandle::new(42);
    let b = TaskHandle::from(42);
    assert_eq!(a, b);
    assert_ne!(a, TaskHandle::new(43));
    assert_eq!(a.raw(), 42);
    assert_eq!(a.to_string(), "task#42");
}

#[test]
fn test_resume_event_carries_handle() {
    let event = ResumeEvent::new(TaskHandle::new(9));
    assert_eq!(event.task, TaskHandle::new(9));
}

#[test]
fn test_clock_source_defaults_to_internal() {
    assert_eq!(ClockSource::default(), ClockSource::Internal);
    assert_eq!(ClockSource::External.to_string(), "external");
}

#[test]
fn test_clock_source_serde() {
    let json = serde_json::to_string(&ClockSource::External).unwrap();
    assert_eq!(json, r#""external""#);
    let parsed: ClockSource = serde_json::from_str(r#""internal""#).unwrap();
    assert_eq!(parsed, ClockSource::Internal);
}

#[test]
fn test_monotonic_clock_starts_near_zero() {
    let clock = MonotonicClock::new();
    let now = clock.now_seconds();
    assert!((0.0..1.0).contains(&now));
}

#[test]
fn test_init_tracing_is_idempotent() {
    beatclock::util::init_tracing();
    beatclock::util::init_tracing_with("beatclock=debug");
    tracing::info!("tracing initialized twice without panicking");
}
