//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name stamped on startup logs
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "saferide-client".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SR_SERVICE_NAME`: Service name (default: saferide-client)
    /// - `SR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SR_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SR_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// `from_env` passes the process environment; tests pass a map.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("SR_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Some(level) = lookup("SR_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.log_level = level;
        }
        if let Some(v) = lookup("SR_CONSOLE_OUTPUT") {
            self.console_output = v.to_lowercase() != "false" && v != "0";
        }
        if let Some(v) = lookup("SR_JSON_LOGS") {
            self.json_logs = v.to_lowercase() == "true" || v == "1";
        }
        self
    }

    /// Configuration that keeps test output quiet.
    pub fn for_testing() -> Self {
        Self {
            log_level: "warn".to_string(),
            console_output: false,
            ..Self::default()
        }
    }
}
