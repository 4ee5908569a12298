//! Build a [`Scheduler`] from configuration.

use anyhow::Context;
use tracing::info;

use crate::config::SchedulerConfig;
use crate::core::{AppResult, EventQueue, Scheduler, SchedulerError};

/// Validate `cfg` and construct a scheduler posting to `queue`.
///
/// # Errors
///
/// `SchedulerError::InvalidConfig` for an invalid configuration,
/// `SchedulerError::Spawn` if the timing thread cannot be started.
pub fn build_scheduler<Q: EventQueue>(
    cfg: &SchedulerConfig,
    queue: Q,
) -> Result<Scheduler<Q>, SchedulerError> {
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;
    Scheduler::new(cfg, queue)
}

/// Load configuration from the environment (and `.env`), then build.
///
/// # Errors
///
/// Fails if the environment holds an invalid override or construction fails.
pub fn build_scheduler_from_env<Q: EventQueue>(queue: Q) -> AppResult<Scheduler<Q>> {
    let cfg = SchedulerConfig::from_env().context("loading scheduler configuration")?;
    info!(capacity = cfg.capacity, source = %cfg.source, "configuration loaded from environment");
    build_scheduler(&cfg, queue).context("building scheduler")
}
