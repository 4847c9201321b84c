//! # Client Configuration
//!
//! Unified configuration for all subsystems and telemetry.
//!
//! Sources, in order of precedence: `SR_*` environment variables, a JSON
//! document, built-in defaults. Every section may be omitted from the JSON.

use serde::{Deserialize, Serialize};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::env;
use thiserror::Error;

use saferide_telemetry::TelemetryConfig;
use sr_01_session::domain::is_valid_country_code;
use sr_01_session::SessionConfig;
use sr_02_ride_tracking::RideConfig;
use sr_03_relay::RelayConfig;

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Session Manager settings.
    pub session: SessionConfig,
    /// Ride State Tracker settings.
    pub ride: RideConfig,
    /// Chat/notification relay settings.
    pub relay: RelayConfig,
    /// Logging settings.
    pub telemetry: TelemetryConfig,
    /// Events buffered per bus subscriber before it starts lagging.
    pub event_bus_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            ride: RideConfig::default(),
            relay: RelayConfig::default(),
            telemetry: TelemetryConfig::default(),
            event_bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("Invalid configuration document: {0}")]
    Parse(String),

    /// An environment variable held an unusable value.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// Resend cooldown of zero would disable rate limiting.
    #[error("session.resend_cooldown_secs must be greater than zero")]
    ZeroCooldown,

    /// Challenge lifetime of zero would expire every code immediately.
    #[error("session.challenge_ttl_secs must be greater than zero")]
    ZeroChallengeTtl,

    /// Country code is not `+` followed by 1-3 digits.
    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    /// Event bus needs room for at least one event.
    #[error("event_bus_capacity must be greater than zero")]
    ZeroBusCapacity,
}

impl ClientConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults with `SR_*` environment overrides applied.
    ///
    /// # Environment Variables
    ///
    /// - `SR_COUNTRY_CODE`: phone normalization prefix (default: +91)
    /// - `SR_RESEND_COOLDOWN_SECS`: resend cooldown (default: 30)
    /// - `SR_CHALLENGE_TTL_SECS`: challenge lifetime (default: 600)
    /// - `SR_LOG_LEVEL`, `SR_JSON_LOGS`, ...: see [`TelemetryConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(code) = lookup("SR_COUNTRY_CODE") {
            self.session.country_code = code.trim().to_string();
        }
        if let Some(secs) = parse_u64(&lookup, "SR_RESEND_COOLDOWN_SECS")? {
            self.session.resend_cooldown_secs = secs;
        }
        if let Some(secs) = parse_u64(&lookup, "SR_CHALLENGE_TTL_SECS")? {
            self.session.challenge_ttl_secs = secs;
        }
        self.telemetry = self.telemetry.with_overrides(&lookup);
        Ok(self)
    }

    /// Reject values the services cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.resend_cooldown_secs == 0 {
            return Err(ConfigError::ZeroCooldown);
        }
        if self.session.challenge_ttl_secs == 0 {
            return Err(ConfigError::ZeroChallengeTtl);
        }
        if !is_valid_country_code(&self.session.country_code) {
            return Err(ConfigError::InvalidCountryCode(
                self.session.country_code.clone(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::ZeroBusCapacity);
        }
        Ok(())
    }

    /// Create a config for testing (quiet logs, small buffers).
    pub fn for_testing() -> Self {
        Self {
            session: SessionConfig::for_testing(),
            ride: RideConfig::for_testing(),
            relay: RelayConfig::for_testing(),
            telemetry: TelemetryConfig::for_testing(),
            event_bus_capacity: 64,
        }
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue { key, value: raw })
        })
        .transpose()
}
