//! # SafeRide Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{RideId, SubsystemId, UserId};

/// Terminal outcome of a filed ride, as carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideOutcome {
    /// Trip finished normally.
    Completed,
    /// Trip was cancelled.
    Cancelled,
}

impl RideOutcome {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "trip_completed",
            Self::Cancelled => "trip_cancelled",
        }
    }
}

/// All events that can be published to the event bus.
///
/// Subsystems publish facts about their own state; they never address
/// another subsystem directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SafeRideEvent {
    // =========================================================================
    // SUBSYSTEM 1: SESSION
    // =========================================================================
    /// A verification code was sent.
    ChallengeSent {
        /// Last four digits of the number the code was sent to.
        phone_suffix: String,
        /// Whether this was a resend.
        resend: bool,
    },

    /// A verification code was refused by the backend.
    VerificationRejected,

    /// A passenger signed in.
    SessionEstablished {
        /// The authenticated account.
        uid: UserId,
    },

    /// The passenger signed out.
    SessionEnded {
        /// The account that signed out.
        uid: UserId,
    },

    /// The passenger's profile changed.
    ProfileUpdated {
        /// The account that changed.
        uid: UserId,
    },

    // =========================================================================
    // SUBSYSTEM 2: RIDE TRACKING
    // =========================================================================
    /// A ride moved to a new status.
    RideStatusChanged {
        /// The ride.
        ride_id: RideId,
        /// Wire name of the new status.
        status: String,
    },

    /// A ride reached a terminal status and moved into history.
    RideFiled {
        /// The ride.
        ride_id: RideId,
        /// How the ride ended.
        outcome: RideOutcome,
    },

    /// An emergency alert was dispatched.
    SosRaised {
        /// Alert identifier.
        alert_id: String,
        /// Ride in progress when the alert was raised, if any.
        ride_id: Option<RideId>,
    },

    // =========================================================================
    // SUBSYSTEM 3: RELAY
    // =========================================================================
    /// A message was appended to a ride conversation.
    MessageRelayed {
        /// Conversation the message belongs to.
        ride_id: RideId,
        /// Whether the local passenger sent it.
        local: bool,
    },
}

impl SafeRideEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ChallengeSent { .. }
            | Self::VerificationRejected
            | Self::SessionEstablished { .. }
            | Self::SessionEnded { .. }
            | Self::ProfileUpdated { .. } => EventTopic::Session,
            Self::RideStatusChanged { .. } | Self::RideFiled { .. } => EventTopic::Ride,
            Self::SosRaised { .. } => EventTopic::Safety,
            Self::MessageRelayed { .. } => EventTopic::Relay,
        }
    }

    /// Get the originating subsystem.
    #[must_use]
    pub fn source_subsystem(&self) -> SubsystemId {
        match self.topic() {
            EventTopic::Session => SubsystemId::Session,
            EventTopic::Ride | EventTopic::Safety => SubsystemId::RideTracking,
            EventTopic::Relay => SubsystemId::Relay,
            EventTopic::All => SubsystemId::Runtime,
        }
    }

    /// Short event name for logs and metrics labels.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChallengeSent { .. } => "challenge_sent",
            Self::VerificationRejected => "verification_rejected",
            Self::SessionEstablished { .. } => "session_established",
            Self::SessionEnded { .. } => "session_ended",
            Self::ProfileUpdated { .. } => "profile_updated",
            Self::RideStatusChanged { .. } => "ride_status_changed",
            Self::RideFiled { .. } => "ride_filed",
            Self::SosRaised { .. } => "sos_raised",
            Self::MessageRelayed { .. } => "message_relayed",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 1 events.
    Session,
    /// Subsystem 2 lifecycle events.
    Ride,
    /// Subsystem 2 emergency events.
    Safety,
    /// Subsystem 3 events.
    Relay,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<SubsystemId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<SubsystemId>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SafeRideEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filed() -> SafeRideEvent {
        SafeRideEvent::RideFiled {
            ride_id: RideId("ride-1".into()),
            outcome: RideOutcome::Completed,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(filed().topic(), EventTopic::Ride);
        assert_eq!(SafeRideEvent::VerificationRejected.topic(), EventTopic::Session);
        let sos = SafeRideEvent::SosRaised {
            alert_id: "a".into(),
            ride_id: None,
        };
        assert_eq!(sos.topic(), EventTopic::Safety);
        assert_eq!(sos.source_subsystem(), SubsystemId::RideTracking);
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&filed()));
        assert!(filter.matches(&SafeRideEvent::VerificationRejected));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Session]);
        assert!(!filter.matches(&filed()));
        assert!(filter.matches(&SafeRideEvent::VerificationRejected));
    }

    #[test]
    fn test_filter_by_subsystem() {
        let filter = EventFilter::from_subsystems(vec![SubsystemId::RideTracking]);
        assert!(filter.matches(&filed()));
        assert!(!filter.matches(&SafeRideEvent::SessionEnded {
            uid: UserId("u".into())
        }));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RideOutcome::Cancelled.as_str(), "trip_cancelled");
        assert_eq!(filed().name(), "ride_filed");
    }
}
