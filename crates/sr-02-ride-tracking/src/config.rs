//! # Ride Tracking Configuration

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_MAX_HISTORY, DEFAULT_MIN_DRIVER_RATING};

/// Ride State Tracker configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    /// Drivers rated below this are hidden from discovery results.
    pub min_driver_rating: f32,

    /// Filed rides kept in memory. 0, the default, keeps all; any other
    /// value is an opt-in cap where the oldest fall off first.
    pub max_history: usize,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            min_driver_rating: DEFAULT_MIN_DRIVER_RATING,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl RideConfig {
    /// Create a config for testing (tiny history).
    pub fn for_testing() -> Self {
        Self {
            max_history: 3,
            ..Self::default()
        }
    }
}
