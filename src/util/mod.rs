//! Shared utilities: time base, identifier types, telemetry.

pub mod clock;
pub mod telemetry;
pub mod types;

pub use clock::*;
pub use telemetry::*;
pub use types::*;
