//! # SafeRide Demo
//!
//! Drives one passenger journey against in-memory backends and prints
//! the resulting metrics.
//!
//! ## Flow
//!
//! ```text
//! sign in ──→ profile + contact ──→ book ──→ track driver
//!                                              │
//!        metrics ←── pay ←── rate ←── trip ←── chat
//! ```
//!
//! Configuration comes from `SR_*` environment variables, see
//! [`ClientConfig::from_env`].

use anyhow::{Context, Result};
use client_runtime::{ClientConfig, Collaborators, MockClient};
use saferide_telemetry::encode_metrics;
use shared_types::{
    DriverId, DriverSummary, GeoPoint, LocationDetails, TimeSource, VehicleInfo, VehicleType,
};
use sr_01_session::{NewEmergencyContact, ProfileUpdate};
use sr_02_ride_tracking::{
    DriverLocationUpdate, PaymentMethod, PaymentStatus, RideRating, RideStatus,
};
use tracing::info;

const DEMO_PHONE: &str = "98765 43210";
const DEMO_CODE: &str = "123456";

fn demo_drivers() -> Vec<DriverSummary> {
    [("drv-ravi", "Ravi", 4.8, 180), ("drv-meena", "Meena", 4.9, 95)]
        .into_iter()
        .map(|(id, name, rating, eta_secs)| DriverSummary {
            id: DriverId(id.to_string()),
            name: name.to_string(),
            rating,
            safety_rating: 4.9,
            total_rides: 640,
            vehicle: VehicleInfo {
                vehicle_type: VehicleType::Bike,
                number: "KA-03-MN-4821".to_string(),
            },
            distance_m: eta_secs * 6,
            eta_secs,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env().context("Failed to load configuration")?;

    let collaborators = Collaborators::mocks_with_system_time();
    collaborators.dispatch.set_drivers(demo_drivers());
    let dispatch = collaborators.dispatch.clone();
    let time = collaborators.time.clone();

    let client = MockClient::new(config, collaborators).context("Failed to build client")?;
    let _telemetry = client
        .install_telemetry()
        .context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  SafeRide passenger client demo");
    info!("===========================================");

    // Sign in
    let token = client.request_challenge(DEMO_PHONE).await?;
    let identity = client.verify_challenge(&token, DEMO_CODE).await?;
    info!(uid = %identity.uid, "Signed in");

    client
        .update_profile(ProfileUpdate::display_name("Priya"))
        .await?;
    client
        .add_emergency_contact(NewEmergencyContact::new("Asha", "9812345678", "Sister"))
        .await?;

    // Book
    let drivers = client
        .start_booking(
            LocationDetails::new("MG Road Metro", GeoPoint::new(12.9756, 77.6066)),
            LocationDetails::new("Indiranagar 100ft Road", GeoPoint::new(12.9719, 77.6412)),
            VehicleType::Bike,
        )
        .await?;
    let chosen = drivers.first().context("No drivers nearby")?;
    info!(driver = %chosen.name, eta_secs = chosen.eta_secs, "Closest driver");

    let ride = client.confirm_ride(&chosen.id, PaymentMethod::Upi).await?;
    info!(ride_id = %ride.id, total = ride.fare.total_amount, "Ride confirmed");

    // Track
    let mut feed = client.track_driver().await?;
    dispatch.push_location(DriverLocationUpdate {
        driver_id: chosen.id.clone(),
        location: GeoPoint::new(12.9741, 77.6100),
        heading: Some(90.0),
        recorded_at: time.now(),
    });
    if let Some(update) = client.poll_driver_location(&mut feed)? {
        info!(
            lat = update.location.latitude,
            lng = update.location.longitude,
            "Driver position"
        );
    }

    client.advance_status(RideStatus::DriverArriving).await?;
    client
        .receive_message(&ride.id, &chosen.name, "Reaching in two minutes")
        .await?;
    client.send_message("I'm near gate 2").await?;
    info!(unread = client.chat_unread(&ride.id), "Chat");
    client.mark_chat_read(&ride.id);

    for status in [
        RideStatus::DriverArrived,
        RideStatus::TripStarted,
        RideStatus::TripCompleted,
    ] {
        client.advance_status(status).await?;
    }

    let filed = client
        .complete_ride(Some(RideRating {
            stars: 5,
            comment: Some("Smooth ride".to_string()),
        }))
        .await?;
    client.update_payment_status(PaymentStatus::Completed)?;
    info!(
        ride_id = %filed.id,
        history = client.history().len(),
        notifications = client.notifications().len(),
        "Trip filed"
    );

    client.sign_out().await?;

    let metrics = encode_metrics().context("Failed to encode metrics")?;
    println!("{metrics}");

    Ok(())
}
