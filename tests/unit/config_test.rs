//! Tests for configuration validation and loading

use beatclock::config::scheduler::{
    ENV_BEAT_DURATION, ENV_CAPACITY, ENV_SOURCE, ENV_TIMER_STACK_SIZE,
};
use beatclock::config::SchedulerConfig;
use beatclock::util::ClockSource;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.capacity, 20);
    assert!((cfg.beat_duration - 0.5).abs() < f64::EPSILON);
    assert_eq!(cfg.source, ClockSource::Internal);
    assert_eq!(cfg.timer_thread_name, "beat-timer");
    assert_eq!(cfg.timer_stack_size, 64 * 1024);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_validation_rejects_bad_values() {
    assert!(SchedulerConfig::new().with_capacity(0).validate().is_err());
    assert!(SchedulerConfig::new().with_beat_duration(0.0).validate().is_err());
    assert!(SchedulerConfig::new()
        .with_beat_duration(f64::NAN)
        .validate()
        .is_err());
    assert!(SchedulerConfig::new()
        .with_timer_thread_name("bad\0name")
        .validate()
        .is_err());
    assert!(SchedulerConfig::new()
        .with_timer_stack_size(1024)
        .validate()
        .is_err());
}

#[test]
fn test_from_json_fills_defaults() {
    let cfg = SchedulerConfig::from_json_str(r#"{"capacity": 8, "source": "external"}"#).unwrap();
    assert_eq!(cfg.capacity, 8);
    assert_eq!(cfg.source, ClockSource::External);
    assert_eq!(cfg.timer_thread_name, "beat-timer");
}

#[test]
fn test_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"capacity": 0}"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_json_roundtrip() {
    let cfg = SchedulerConfig::new()
        .with_capacity(3)
        .with_source(ClockSource::External);
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn test_env_overrides() {
    let cfg = SchedulerConfig::from_lookup(lookup(&[
        (ENV_CAPACITY, "32"),
        (ENV_BEAT_DURATION, "0.25"),
        (ENV_SOURCE, "midi"),
        (ENV_TIMER_STACK_SIZE, "131072"),
    ]))
    .unwrap();
    assert_eq!(cfg.capacity, 32);
    assert!((cfg.beat_duration - 0.25).abs() < f64::EPSILON);
    assert_eq!(cfg.source, ClockSource::External);
    assert_eq!(cfg.timer_stack_size, 131_072);
}

#[test]
fn test_env_without_overrides_is_default() {
    let cfg = SchedulerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, SchedulerConfig::default());
}

#[test]
fn test_env_parse_error_names_variable() {
    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_CAPACITY, "many")])).unwrap_err();
    assert!(format!("{err:#}").contains(ENV_CAPACITY));

    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_SOURCE, "crystal")])).unwrap_err();
    assert!(format!("{err:#}").contains(ENV_SOURCE));
}

#[test]
fn test_env_invalid_value_rejected() {
    assert!(SchedulerConfig::from_lookup(lookup(&[(ENV_BEAT_DURATION, "-1")])).is_err());
}
