//! Tests for builder modules

use beatclock::builders::build_scheduler;
use beatclock::config::SchedulerConfig;
use beatclock::core::{Scheduler, SchedulerError};
use beatclock::infra::InMemoryEventQueue;
use beatclock::util::ClockSource;

#[test]
fn test_build_scheduler_applies_config() {
    let config = SchedulerConfig::new()
        .with_capacity(6)
        .with_beat_duration(0.25)
        .with_source(ClockSource::External)
        .with_timer_thread_name("builder-timer");
    let scheduler = build_scheduler(&config, InMemoryEventQueue::new()).unwrap();

    assert_eq!(scheduler.stats().capacity, 6);
    assert_eq!(scheduler.slots().len(), 6);
    assert_eq!(scheduler.source(), ClockSource::External);
    assert!((scheduler.snapshot().beat_duration - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let config = SchedulerConfig::new().with_capacity(0);
    let result = build_scheduler(&config, InMemoryEventQueue::new());
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_spawn_failure_surfaces_as_error() {
    let config = SchedulerConfig::new().with_timer_stack_size(1 << 50);

    let built = build_scheduler(&config, InMemoryEventQueue::new());
    assert!(matches!(built, Err(SchedulerError::Spawn(_))));

    let direct = Scheduler::new(&config, InMemoryEventQueue::new());
    assert!(matches!(direct, Err(SchedulerError::Spawn(_))));
}
