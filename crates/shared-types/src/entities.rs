//! # Core Domain Entities
//!
//! Defines the entities that cross subsystem boundaries.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `Identity`, `EmergencyContact`, `SavedAddress`
//! - **Geography**: `GeoPoint`, `LocationDetails`
//! - **Dispatch**: `RideId`, `DriverId`, `VehicleType`, `DriverSummary`
//! - **Runtime**: `SubsystemId`

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Account identifier issued by the authentication backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-generated emergency contact identifier.
///
/// Generated before the contact is sent to the backend so a retried
/// request carries the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub Uuid);

impl ContactId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contact-{}", self.0)
    }
}

/// A person to alert in an emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Contact identifier.
    pub id: ContactId,
    /// Display name.
    pub name: String,
    /// Normalized phone number (country-code prefixed).
    pub phone_number: String,
    /// Free-form relationship label ("Mother", "Friend", ...).
    pub relationship: String,
    /// When the contact was added.
    pub added_at: Timestamp,
}

/// A labelled address the passenger books to often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAddress {
    /// Address identifier.
    pub id: String,
    /// Label such as "Home" or "Work".
    pub label: String,
    /// Human-readable address.
    pub address: String,
    /// Coordinates of the address.
    pub coordinates: GeoPoint,
}

/// The authenticated user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique-per-account token.
    pub uid: UserId,
    /// Country-code-prefixed phone number.
    pub phone_number: String,
    /// Optional email address.
    pub email: Option<String>,
    /// Display name (may be empty right after sign-up).
    pub display_name: String,
    /// Optional profile image URL.
    pub profile_image: Option<String>,
    /// Whether the phone number has been verified.
    pub is_verified: bool,
    /// Emergency contacts in insertion order.
    pub emergency_contacts: Vec<EmergencyContact>,
    /// Saved addresses.
    pub saved_addresses: Vec<SavedAddress>,
    /// Account creation time.
    pub created_at: Timestamp,
    /// Last profile update time.
    pub updated_at: Timestamp,
}

impl Identity {
    /// A freshly verified identity with an empty profile.
    pub fn new_verified(uid: UserId, phone_number: impl Into<String>, now: Timestamp) -> Self {
        Self {
            uid,
            phone_number: phone_number.into(),
            email: None,
            display_name: String::new(),
            profile_image: None,
            is_verified: true,
            emergency_contacts: Vec::new(),
            saved_addresses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the passenger has finished profile setup.
    pub fn has_display_name(&self) -> bool {
        !self.display_name.trim().is_empty()
    }
}

/// Mask a phone number for logging, keeping only the last four digits.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), tail)
}

// =============================================================================
// CLUSTER B: GEOGRAPHY
// =============================================================================

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, -90..=90.
    pub latitude: f64,
    /// Longitude in degrees, -180..=180.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A pickup or drop point: address plus coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDetails {
    /// Human-readable address.
    pub address: String,
    /// Coordinates of the point.
    pub coordinates: GeoPoint,
    /// Optional landmark hint for the driver.
    pub landmark: Option<String>,
}

impl LocationDetails {
    /// A location from an address alone (coordinates resolved later).
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinates: GeoPoint::default(),
            landmark: None,
        }
    }

    /// A location with known coordinates.
    pub fn new(address: impl Into<String>, coordinates: GeoPoint) -> Self {
        Self {
            address: address.into(),
            coordinates,
            landmark: None,
        }
    }

    /// Whether the address is blank.
    pub fn is_empty(&self) -> bool {
        self.address.trim().is_empty()
    }
}

// =============================================================================
// CLUSTER C: DISPATCH
// =============================================================================

/// Ride identifier issued by the dispatch backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RideId(pub String);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Driver identifier issued by the dispatch backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub String);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle category a passenger can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Two-wheeler.
    #[default]
    Bike,
    /// Auto-rickshaw.
    Auto,
    /// Car.
    Car,
}

impl VehicleType {
    /// Wire name of the vehicle type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Auto => "auto",
            Self::Car => "car",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown vehicle type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown vehicle type: {0}")]
pub struct UnknownVehicleType(pub String);

impl FromStr for VehicleType {
    type Err = UnknownVehicleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bike" => Ok(Self::Bike),
            "auto" => Ok(Self::Auto),
            "car" => Ok(Self::Car),
            other => Err(UnknownVehicleType(other.to_string())),
        }
    }
}

/// Vehicle details shown when choosing a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Registration plate.
    pub number: String,
}

/// A nearby driver as returned by driver discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    /// Driver identifier.
    pub id: DriverId,
    /// Display name.
    pub name: String,
    /// Overall rating, 0.0..=5.0.
    pub rating: f32,
    /// Safety score, 0.0..=5.0.
    pub safety_rating: f32,
    /// Completed trips.
    pub total_rides: u32,
    /// Vehicle details.
    pub vehicle: VehicleInfo,
    /// Distance to the pickup point in meters.
    pub distance_m: u32,
    /// Estimated time to pickup in seconds.
    pub eta_secs: u32,
}

// =============================================================================
// CLUSTER D: RUNTIME
// =============================================================================

/// Subsystem identifiers used for event attribution and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SubsystemId {
    /// The client runtime itself.
    Runtime = 0,
    /// Session Manager.
    Session = 1,
    /// Ride State Tracker.
    RideTracking = 2,
    /// Notification/Chat relays.
    Relay = 3,
}

impl SubsystemId {
    /// Numeric id.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short name used as the `subsystem` log field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Session => "session",
            Self::RideTracking => "ride-tracking",
            Self::Relay => "relay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+919876543210"), "********3210");
        assert_eq!(mask_phone("123"), "***");
    }

    #[test]
    fn test_vehicle_type_parse() {
        assert_eq!("bike".parse::<VehicleType>(), Ok(VehicleType::Bike));
        assert_eq!(" Car ".parse::<VehicleType>(), Ok(VehicleType::Car));
        assert!("truck".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_vehicle_type_serde() {
        let json = serde_json::to_string(&VehicleType::Auto).unwrap();
        assert_eq!(json, "\"auto\"");
    }

    #[test]
    fn test_location_is_empty() {
        assert!(LocationDetails::from_address("   ").is_empty());
        assert!(!LocationDetails::from_address("MG Road").is_empty());
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(19.076, 72.8777).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_new_verified_identity() {
        let identity = Identity::new_verified(UserId("user-1".into()), "+919876543210", 7);
        assert!(identity.is_verified);
        assert!(!identity.has_display_name());
        assert_eq!(identity.created_at, 7);
    }

    #[test]
    fn test_subsystem_names() {
        assert_eq!(SubsystemId::Session.as_u8(), 1);
        assert_eq!(SubsystemId::RideTracking.name(), "ride-tracking");
    }
}
