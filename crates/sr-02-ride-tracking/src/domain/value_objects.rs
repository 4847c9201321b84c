//! # Value Objects
//!
//! Enumerations and small records carried by a ride.

use serde::{Deserialize, Serialize};
use shared_types::{DriverId, GeoPoint, Timestamp};
use std::fmt;

/// Ride lifecycle status.
///
/// Declaration order is the lifecycle order. `TripCancelled` sits outside
/// the chain and is only reached through cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    /// Booking sent, waiting for the driver.
    Requested,
    /// Driver accepted.
    Accepted,
    /// Driver on the way to pickup.
    DriverArriving,
    /// Driver at pickup.
    DriverArrived,
    /// Passenger on board.
    TripStarted,
    /// Trip finished.
    TripCompleted,
    /// Trip cancelled.
    TripCancelled,
}

impl RideStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::DriverArriving => "driver_arriving",
            Self::DriverArrived => "driver_arrived",
            Self::TripStarted => "trip_started",
            Self::TripCompleted => "trip_completed",
            Self::TripCancelled => "trip_cancelled",
        }
    }

    /// The only status `advance_status` may move to from here.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Requested => Some(Self::Accepted),
            Self::Accepted => Some(Self::DriverArriving),
            Self::DriverArriving => Some(Self::DriverArrived),
            Self::DriverArrived => Some(Self::TripStarted),
            Self::TripStarted => Some(Self::TripCompleted),
            Self::TripCompleted | Self::TripCancelled => None,
        }
    }

    /// Whether the ride is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TripCompleted | Self::TripCancelled)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the passenger pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash to the driver.
    #[default]
    Cash,
    /// UPI transfer.
    Upi,
    /// Card.
    Card,
    /// In-app wallet.
    Wallet,
}

/// Settlement state of a ride's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet settled.
    #[default]
    Pending,
    /// Settled.
    Completed,
    /// Settlement failed; may be retried.
    Failed,
    /// Money returned.
    Refunded,
}

impl PaymentStatus {
    /// Allowed moves: `Pending → Completed | Failed`, `Failed → Pending`,
    /// `Completed → Refunded`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Failed, Self::Pending)
                | (Self::Completed, Self::Refunded)
        )
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fare in minor currency units (paise for INR).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideFare {
    /// Flat booking charge.
    pub base_amount: u64,
    /// Distance component.
    pub distance_amount: u64,
    /// Time component.
    pub time_amount: u64,
    /// Amount charged.
    pub total_amount: u64,
    /// ISO 4217 code.
    pub currency: String,
}

impl RideFare {
    /// Build a fare whose total is the sum of its parts.
    pub fn new(base: u64, distance: u64, time: u64, currency: impl Into<String>) -> Self {
        Self {
            base_amount: base,
            distance_amount: distance,
            time_amount: time,
            total_amount: base.saturating_add(distance).saturating_add(time),
            currency: currency.into(),
        }
    }

    /// Sum of the components, `None` on overflow.
    pub fn component_sum(&self) -> Option<u64> {
        self.base_amount
            .checked_add(self.distance_amount)?
            .checked_add(self.time_amount)
    }
}

/// Post-trip feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRating {
    /// One to five stars.
    pub stars: u8,
    /// Optional free text.
    pub comment: Option<String>,
}

impl RideRating {
    /// Rating without a comment.
    pub fn stars(stars: u8) -> Self {
        Self {
            stars,
            comment: None,
        }
    }
}

/// Kind of emergency alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyAlertKind {
    /// Panic button pressed.
    PanicButton,
    /// Vehicle left the expected route.
    RouteDeviation,
    /// Passenger asked to notify contacts.
    EmergencyContact,
    /// Full SOS.
    Sos,
}

impl SafetyAlertKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PanicButton => "panic_button",
            Self::RouteDeviation => "route_deviation",
            Self::EmergencyContact => "emergency_contact",
            Self::Sos => "sos",
        }
    }
}

/// A position report for the assigned driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocationUpdate {
    /// Driver the report belongs to.
    pub driver_id: DriverId,
    /// Reported position.
    pub location: GeoPoint,
    /// Heading in degrees, if known.
    pub heading: Option<f32>,
    /// When the position was recorded.
    pub recorded_at: Timestamp,
}
