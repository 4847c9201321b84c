//! # Cooldown
//!
//! Single-slot rate limiter keyed on the last successful action.
//!
//! Unlike a token bucket there is no burst: once an action is recorded,
//! the next one is refused until the full period has elapsed.

use crate::time::Timestamp;
use std::time::Duration;

/// Tracks when an action last happened and how long to wait before the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    period_ms: u64,
    last: Option<Timestamp>,
}

impl Cooldown {
    /// Create a cooldown with the given period. Periods beyond `u64::MAX`
    /// milliseconds saturate.
    pub fn new(period: Duration) -> Self {
        Self {
            period_ms: u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            last: None,
        }
    }

    /// Create a cooldown with a period expressed in seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Configured period.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Time left before the action is allowed again, or `None` if it is allowed now.
    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        let last = self.last?;
        let elapsed = now.saturating_sub(last);
        if elapsed >= self.period_ms {
            return None;
        }
        Some(Duration::from_millis(self.period_ms - elapsed))
    }

    /// Remaining wait rounded up to whole seconds, or `None` if allowed now.
    pub fn remaining_secs(&self, now: Timestamp) -> Option<u64> {
        self.remaining(now).map(|d| {
            let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
            ms.div_ceil(1_000)
        })
    }

    /// Whether the action may happen at `now`.
    pub fn is_ready(&self, now: Timestamp) -> bool {
        self.remaining(now).is_none()
    }

    /// Record that the action happened at `now`.
    pub fn record(&mut self, now: Timestamp) {
        self.last = Some(now);
    }

    /// Timestamp of the last recorded action.
    pub fn last(&self) -> Option<Timestamp> {
        self.last
    }

    /// Forget the last recorded action.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
