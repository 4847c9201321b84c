//! # Event Routing
//!
//! Reacts to facts published by the session and ride subsystems by
//! updating the relays and recording metrics.
//!
//! ## Event Flow
//!
//! ```text
//! SESSION (1)                       RIDE TRACKING (2)
//!     │                                  │
//!     ├──SessionEnded──┐     ┌───────────┼──RideStatusChanged──→ ride notification
//!     │                │     │           ├──SosRaised──────────→ safety notification
//!     │                ↓     ↓           └──RideFiled──┐
//!     │           ┌──────────────────┐                 │
//!     │           │   EventRouter    │←────────────────┘
//!     │           └────────┬─────────┘
//!     │                    │
//!     │      ┌─────────────┴──────────────┐
//!     ↓      ↓                            ↓
//!  clear global notifications     clear ride chat + ride notifications
//!  drop the passenger's rides
//! ```
//!
//! Every routed event bumps `saferide_eventbus_messages_routed_total`.

use std::sync::Arc;

use parking_lot::RwLock;
use saferide_telemetry::{
    log_event, metric_inc, ACTIVE_RIDES, CHALLENGES_SENT, EVENT_BUS_MESSAGES_ROUTED,
    MESSAGES_RELAYED, RIDES_FILED, RIDE_TRANSITIONS, SESSIONS_ENDED, SOS_ALERTS, VERIFICATIONS,
};
use shared_bus::{EventFilter, InMemoryEventBus, SafeRideEvent, Subscription};
use shared_types::RideId;
use sr_02_ride_tracking::RideTrackingApi;
use sr_03_relay::{ChatRelay, NotificationKind, NotificationRelay};
use tokio::sync::watch;

const SUBSYSTEM: &str = "runtime";

/// Routes bus events to the relays and the ride tracker.
pub struct EventRouter {
    subscription: Subscription,
    rides: Arc<dyn RideTrackingApi>,
    chat: Arc<RwLock<ChatRelay>>,
    notifications: Arc<RwLock<NotificationRelay>>,
    routed: u64,
}

impl EventRouter {
    /// Subscribe to every topic on `bus`.
    ///
    /// Only events published after this call are routed.
    pub fn new(
        bus: &InMemoryEventBus,
        rides: Arc<dyn RideTrackingApi>,
        chat: Arc<RwLock<ChatRelay>>,
        notifications: Arc<RwLock<NotificationRelay>>,
    ) -> Self {
        Self {
            subscription: bus.subscribe(EventFilter::all()),
            rides,
            chat,
            notifications,
            routed: 0,
        }
    }

    /// Route every event already queued. Returns how many were handled.
    pub fn drain(&mut self) -> usize {
        let events = self.subscription.drain();
        for event in &events {
            self.route(event);
        }
        events.len()
    }

    /// Route events as they arrive until `shutdown` flips to `true` or
    /// the bus goes away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        log_event!(info, SUBSYSTEM, "Event router started");
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = self.subscription.recv() => match event {
                    Some(event) => self.route(&event),
                    None => break,
                },
            }
        }
        log_event!(info, SUBSYSTEM, "Event router stopped", routed = self.routed);
        self.routed
    }

    /// Events routed so far.
    pub fn routed(&self) -> u64 {
        self.routed
    }

    /// Events this router missed because it fell behind the bus.
    pub fn lagged(&self) -> u64 {
        self.subscription.lagged()
    }

    fn route(&mut self, event: &SafeRideEvent) {
        self.routed += 1;
        metric_inc!(
            EVENT_BUS_MESSAGES_ROUTED,
            &[event.name(), event.source_subsystem().name()]
        );

        match event {
            SafeRideEvent::ChallengeSent { resend, .. } => {
                let kind = if *resend { "resend" } else { "initial" };
                metric_inc!(CHALLENGES_SENT, &[kind]);
            }
            SafeRideEvent::VerificationRejected => {
                metric_inc!(VERIFICATIONS, &["rejected"]);
            }
            SafeRideEvent::SessionEstablished { .. } => {
                metric_inc!(VERIFICATIONS, &["success"]);
            }
            SafeRideEvent::SessionEnded { uid } => {
                metric_inc!(SESSIONS_ENDED);
                let removed = self.notifications.write().clear_global();
                log_event!(
                    debug,
                    SUBSYSTEM,
                    "Cleared account notifications",
                    uid = %uid,
                    removed = removed
                );
                if let Some(ride_id) = self.rides.end_session() {
                    ACTIVE_RIDES.set(0.0);
                    self.clear_ride(&ride_id);
                }
            }
            SafeRideEvent::ProfileUpdated { .. } => {}
            SafeRideEvent::RideStatusChanged { ride_id, status } => {
                metric_inc!(RIDE_TRANSITIONS, &[status.as_str()]);
                if status == "accepted" {
                    ACTIVE_RIDES.set(1.0);
                }
                if let Some((title, body)) = status_notice(status) {
                    self.notifications.write().push(
                        NotificationKind::RideUpdate,
                        title,
                        body,
                        Some(ride_id.clone()),
                    );
                }
            }
            SafeRideEvent::RideFiled { ride_id, outcome } => {
                metric_inc!(RIDES_FILED, &[outcome.as_str()]);
                ACTIVE_RIDES.set(0.0);
                self.clear_ride(ride_id);
            }
            SafeRideEvent::SosRaised { alert_id, ride_id } => {
                metric_inc!(SOS_ALERTS);
                self.notifications.write().push(
                    NotificationKind::Safety,
                    "SOS alert sent",
                    format!("Your emergency contacts have been notified ({alert_id})"),
                    ride_id.clone(),
                );
            }
            SafeRideEvent::MessageRelayed { local, .. } => {
                let origin = if *local { "local" } else { "remote" };
                metric_inc!(MESSAGES_RELAYED, &[origin]);
            }
        }
    }

    fn clear_ride(&self, ride_id: &RideId) {
        let messages = self.chat.write().clear(ride_id);
        let notices = self.notifications.write().clear_ride(ride_id);
        log_event!(
            debug,
            SUBSYSTEM,
            "Cleared relays for ride",
            ride_id = %ride_id,
            messages = messages,
            notifications = notices
        );
    }
}

fn status_notice(status: &str) -> Option<(&'static str, &'static str)> {
    match status {
        "accepted" => Some(("Ride confirmed", "Your driver has accepted the ride")),
        "driver_arriving" => Some(("Driver on the way", "Your driver is heading to pickup")),
        "driver_arrived" => Some(("Driver arrived", "Your driver is waiting at pickup")),
        "trip_started" => Some(("Trip started", "Share your trip with a contact")),
        _ => None,
    }
}
