//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod counters;
mod logging;

pub use counters::{
    increment, init_metrics, record_session_end, set_gauge, CounterMetric, GaugeMetric,
};
pub use logging::{init_logging, LogFormat};

use crate::config::TelemetryConfig;

/// Guard that keeps telemetry alive for the process
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    if let Some(port) = config.metrics_port {
        init_metrics(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
