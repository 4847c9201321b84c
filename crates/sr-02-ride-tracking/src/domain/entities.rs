//! # Domain Entities
//!
//! The ride record, the booking draft that precedes it, and safety alerts.
//!
//! ```text
//! start_booking ──→ [BookingDraft] ──confirm_ride──→ [Ride: accepted] ──advance──→ …
//!                        │                                  │
//!                  cancel_booking                 complete_ride / cancel_ride
//!                        ↓                                  ↓
//!                     (gone)                        [history, newest first]
//! ```

use serde::{Deserialize, Serialize};
use shared_types::{
    DriverId, DriverSummary, GeoPoint, LocationDetails, RideId, Timestamp, UserId, VehicleType,
};
use uuid::Uuid;

use super::value_objects::{
    DriverLocationUpdate, PaymentMethod, PaymentStatus, RideFare, RideRating, RideStatus,
    SafetyAlertKind,
};

/// One passenger trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// Ride identifier.
    pub id: RideId,
    /// Passenger who booked.
    pub passenger_id: UserId,
    /// Assigned driver.
    pub driver_id: DriverId,
    /// Lifecycle status.
    pub status: RideStatus,
    /// Pickup point.
    pub pickup: LocationDetails,
    /// Drop point.
    pub drop: LocationDetails,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Fare breakdown.
    pub fare: RideFare,
    /// Payment method chosen at booking.
    pub payment_method: PaymentMethod,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last change.
    pub updated_at: Timestamp,
    /// When the passenger boarded.
    pub started_at: Option<Timestamp>,
    /// When the ride reached a terminal status.
    pub ended_at: Option<Timestamp>,
    /// Why the ride was cancelled.
    pub cancellation_reason: Option<String>,
    /// Post-trip rating.
    pub rating: Option<RideRating>,
    /// Alerts raised during the ride.
    pub safety_alerts: Vec<SafetyAlert>,
    /// Latest known driver position.
    pub driver_location: Option<DriverLocationUpdate>,
}

/// Driver discovery results kept between `start_booking` and `confirm_ride`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// Pickup point.
    pub pickup: LocationDetails,
    /// Drop point.
    pub drop: LocationDetails,
    /// Requested vehicle category.
    pub vehicle_type: VehicleType,
    /// Candidates, nearest first.
    pub drivers: Vec<DriverSummary>,
    /// When discovery ran.
    pub started_at: Timestamp,
}

impl BookingDraft {
    /// Look up a candidate driver.
    pub fn driver(&self, id: &DriverId) -> Option<&DriverSummary> {
        self.drivers.iter().find(|d| &d.id == id)
    }
}

/// What the dispatch backend needs to create a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Passenger booking the ride.
    pub passenger_id: UserId,
    /// Chosen driver.
    pub driver_id: DriverId,
    /// Pickup point.
    pub pickup: LocationDetails,
    /// Drop point.
    pub drop: LocationDetails,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

/// Alert identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub Uuid);

impl AlertId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// An emergency alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAlert {
    /// Alert identifier.
    pub id: AlertId,
    /// What kind of emergency.
    pub kind: SafetyAlertKind,
    /// Where the passenger was.
    pub location: GeoPoint,
    /// When it was raised.
    pub raised_at: Timestamp,
    /// Ride in progress, if any.
    pub ride_id: Option<RideId>,
    /// Passenger who raised it.
    pub passenger_id: UserId,
}
