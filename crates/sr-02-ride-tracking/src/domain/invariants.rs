//! # Domain Invariants
//!
//! Business rules that must always hold true.

use shared_types::{DriverSummary, VehicleType};

use super::errors::{RideError, RideResult};
use super::value_objects::{RideFare, RideRating, RideStatus};

/// Default minimum driver rating (no filtering).
pub const DEFAULT_MIN_DRIVER_RATING: f32 = 0.0;

/// Default history bound. 0 keeps every filed ride.
pub const DEFAULT_MAX_HISTORY: usize = 0;

/// Lowest allowed star rating.
pub const MIN_STARS: u8 = 1;

/// Highest allowed star rating.
pub const MAX_STARS: u8 = 5;

/// Invariant: status only ever moves to its immediate successor.
///
/// Regressions, repeats and skips are all rejected.
pub fn invariant_next_status(from: RideStatus, to: RideStatus) -> RideResult<()> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(RideError::InvalidTransition { from, to })
    }
}

/// Invariant: `base + distance + time == total`.
pub fn invariant_fare_consistent(fare: &RideFare) -> RideResult<()> {
    match fare.component_sum() {
        Some(sum) if sum == fare.total_amount => Ok(()),
        sum => Err(RideError::InvalidFare {
            components: sum.unwrap_or(u64::MAX),
            total: fare.total_amount,
        }),
    }
}

/// Invariant: ratings are one to five stars.
pub fn invariant_rating(rating: &RideRating) -> RideResult<()> {
    if (MIN_STARS..=MAX_STARS).contains(&rating.stars) {
        Ok(())
    } else {
        Err(RideError::InvalidRating(rating.stars))
    }
}

/// Keep drivers of the requested vehicle type rated at least `min_rating`,
/// nearest (by ETA) first. Ties keep discovery order.
pub fn rank_drivers(
    drivers: Vec<DriverSummary>,
    vehicle_type: VehicleType,
    min_rating: f32,
) -> Vec<DriverSummary> {
    let mut ranked: Vec<DriverSummary> = drivers
        .into_iter()
        .filter(|d| d.vehicle.vehicle_type == vehicle_type && d.rating >= min_rating)
        .collect();
    ranked.sort_by_key(|d| d.eta_secs);
    ranked
}
