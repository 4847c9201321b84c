//! # Ride State Tracker Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Owns the lifecycle of the passenger's single active ride: driver
//! discovery, booking confirmation, status progression, payment status,
//! live driver position and emergency alerts. Rides that reach a terminal
//! status are filed into an in-memory history, newest first.
//!
//! ## Ride Lifecycle
//!
//! ```text
//! requested → accepted → driver_arriving → driver_arrived → trip_started → trip_completed
//!                │               │                │               │
//!                └───────────────┴── cancel_ride ─┴───────────────┘──→ trip_cancelled
//! ```
//!
//! `requested` is only ever observed on the backend's reply; the tracker
//! accepts it immediately.
//!
//! ## Domain Invariants
//!
//! | Rule | Enforcement Location |
//! |------|---------------------|
//! | At most one current ride | `application/service.rs` - `start_booking()`, `confirm_ride()` |
//! | Status moves only to its immediate successor | `domain/invariants.rs` - `invariant_next_status()` |
//! | `base + distance + time == total` | `domain/invariants.rs` - `invariant_fare_consistent()` |
//! | Ratings are 1-5 stars | `domain/invariants.rs` - `invariant_rating()` |
//! | Filing adds exactly one history entry | `application/service.rs` - `file_current()` |
//! | Discovery never runs unauthenticated | `application/service.rs` - `start_booking()` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |-----------|-------|---------|
//! | Dispatch backend | `DispatchGateway` | Driver discovery, booking, location feed |
//! | Safety backend | `SafetyGateway` | Deliver SOS alerts |
//! | Session | `IdentityProvider` | Who is signed in, emergency contacts |
//! | Event bus | `shared_bus::EventPublisher` | Announce status changes and filings |

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::RideTrackingService;
pub use config::RideConfig;
pub use domain::{
    AlertId, BookingDraft, BookingRequest, DriverLocationUpdate, PaymentMethod, PaymentStatus,
    Ride, RideError, RideFare, RideRating, RideResult, RideStatus, SafetyAlert, SafetyAlertKind,
};
pub use ports::{
    DispatchGateway, DriverLocationFeed, IdentityProvider, MockDispatchGateway,
    MockSafetyGateway, RideTrackingApi, SafetyGateway, StaticIdentityProvider,
};
