//! Observability: logging setup and metrics recording.

mod logging;
pub mod metrics;

pub use logging::{TelemetryError, init_logging};
