//! # SafeRide Telemetry
//!
//! Logging and metrics shared by every SafeRide client crate.
//!
//! ## Components
//!
//! - **Tracing**: a global `tracing` subscriber with env filtering and
//!   pretty or JSON output
//! - **Logging macros**: `log_event!` and `log_ride_event!` stamp a
//!   `subsystem` field on every record
//! - **Metrics**: Prometheus collectors on a crate-level registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use saferide_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Your application code here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SR_SERVICE_NAME` | `saferide-client` | Service name in startup logs |
//! | `SR_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SR_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SR_JSON_LOGS` | `false` | JSON instead of pretty output |

mod config;
mod logging;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, ACTIVE_RIDES,
    CHALLENGES_SENT, EVENT_BUS_MESSAGES_ROUTED, MESSAGES_RELAYED, OPERATION_DURATION,
    RIDES_FILED, RIDE_TRANSITIONS, SESSIONS_ENDED, SOS_ALERTS, SUBSYSTEM_ERRORS, VERIFICATIONS,
};
pub use tracing_setup::{init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first; registration is idempotent
    let metrics_handle = register_metrics()?;

    let tracing_guard = init_tracing(config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Metrics registered during initialization.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_inc_macro() {
        let before = MESSAGES_RELAYED.with_label_values(&["local"]).get();
        metric_inc!(MESSAGES_RELAYED, &["local"]);
        assert!(MESSAGES_RELAYED.with_label_values(&["local"]).get() >= before + 1.0);
    }

    #[test]
    fn test_error_display() {
        let err = TelemetryError::Config("bad level".into());
        assert!(err.to_string().contains("bad level"));
    }
}
