//! Prometheus metrics for the SafeRide client.
//!
//! All metrics follow the naming convention: `saferide_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., rides_filed_total)
//! - **Gauge**: Value that can go up or down (e.g., active_rides)
//! - **Histogram**: Distribution of values (e.g., operation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts,
    HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SESSION METRICS (Subsystem 1)
    // =========================================================================

    /// Verification codes sent
    pub static ref CHALLENGES_SENT: CounterVec = CounterVec::new(
        Opts::new("saferide_session_challenges_sent_total", "Verification codes sent"),
        &["kind"]  // kind: initial/resend
    ).expect("metric creation failed");

    /// Verification attempts by outcome
    pub static ref VERIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("saferide_session_verifications_total", "Verification attempts"),
        &["outcome"]  // outcome: success/rejected
    ).expect("metric creation failed");

    /// Sessions ended by sign-out
    pub static ref SESSIONS_ENDED: Counter = Counter::new(
        "saferide_session_sign_outs_total",
        "Total number of sign-outs"
    ).expect("metric creation failed");

    // =========================================================================
    // RIDE METRICS (Subsystem 2)
    // =========================================================================

    /// Status transitions observed
    pub static ref RIDE_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("saferide_ride_status_transitions_total", "Ride status transitions"),
        &["status"]
    ).expect("metric creation failed");

    /// Rides moved into history
    pub static ref RIDES_FILED: CounterVec = CounterVec::new(
        Opts::new("saferide_ride_filed_total", "Rides that reached a terminal status"),
        &["status"]  // status: trip_completed/trip_cancelled
    ).expect("metric creation failed");

    /// Rides currently in progress (0 or 1 on a single client)
    pub static ref ACTIVE_RIDES: Gauge = Gauge::new(
        "saferide_ride_active",
        "Number of rides in progress"
    ).expect("metric creation failed");

    /// Emergency alerts dispatched
    pub static ref SOS_ALERTS: Counter = Counter::new(
        "saferide_safety_sos_alerts_total",
        "Total number of emergency alerts dispatched"
    ).expect("metric creation failed");

    // =========================================================================
    // RELAY METRICS (Subsystem 3)
    // =========================================================================

    /// Chat messages appended
    pub static ref MESSAGES_RELAYED: CounterVec = CounterVec::new(
        Opts::new("saferide_relay_messages_total", "Chat messages appended"),
        &["origin"]  // origin: local/remote
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS METRICS
    // =========================================================================

    /// Messages routed by the runtime
    pub static ref EVENT_BUS_MESSAGES_ROUTED: CounterVec = CounterVec::new(
        Opts::new("saferide_eventbus_messages_routed_total", "Events handled by the router"),
        &["event_type", "source_subsystem"]
    ).expect("metric creation failed");

    // =========================================================================
    // OPERATION METRICS
    // =========================================================================

    /// Latency of facade operations that reach a backend
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "saferide_operation_duration_seconds",
            "Time spent in client operations that call a backend"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("bucket layout")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Subsystem errors by type
    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("saferide_subsystem_errors_total", "Errors by subsystem and type"),
        &["subsystem", "error_type"]
    ).expect("metric creation failed");
}

/// Handle to the registry the collectors were registered on
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Render the registry in Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors already present are kept.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Session
        Box::new(CHALLENGES_SENT.clone()),
        Box::new(VERIFICATIONS.clone()),
        Box::new(SESSIONS_ENDED.clone()),
        // Rides
        Box::new(RIDE_TRANSITIONS.clone()),
        Box::new(RIDES_FILED.clone()),
        Box::new(ACTIVE_RIDES.clone()),
        Box::new(SOS_ALERTS.clone()),
        // Relay
        Box::new(MESSAGES_RELAYED.clone()),
        // Event Bus
        Box::new(EVENT_BUS_MESSAGES_ROUTED.clone()),
        // Operations
        Box::new(OPERATION_DURATION.clone()),
        // Errors
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    encode_registry(&REGISTRY)
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }

    /// Start a timer for one labelled operation.
    pub fn operation(name: &str) -> Self {
        Self::new(&OPERATION_DURATION.with_label_values(&[name]))
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_operation {
    ($name:expr) => {
        $crate::HistogramTimer::operation($name)
    };
}
