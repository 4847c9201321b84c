//! Shared harness for the integration scenarios.

use std::sync::Arc;

use client_runtime::{ClientConfig, Collaborators, MockClient};
use shared_types::{
    DriverId, DriverSummary, Identity, LocationDetails, ManualTimeSource, VehicleInfo,
    VehicleType,
};
use sr_01_session::{MockAuthGateway, MockProfileStore};
use sr_02_ride_tracking::{MockDispatchGateway, MockSafetyGateway, PaymentMethod, Ride};

/// Number used by every scenario that signs in.
pub const PHONE: &str = "9876543210";

/// Code the mock backend accepts.
pub const CODE: &str = "123456";

/// Start of the manual clock, 2023-11-14T22:13:20Z.
pub const EPOCH_MS: u64 = 1_700_000_000_000;

/// A client plus handles on its mock backends.
pub struct Harness {
    pub client: MockClient,
    pub auth: Arc<MockAuthGateway>,
    pub profiles: Arc<MockProfileStore>,
    pub dispatch: Arc<MockDispatchGateway>,
    pub safety: Arc<MockSafetyGateway>,
    pub time: Arc<ManualTimeSource>,
}

impl Harness {
    /// Harness with test configuration and two nearby bike drivers.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::for_testing())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let time = Arc::new(ManualTimeSource::new(EPOCH_MS));
        let collaborators = Collaborators::mocks(time.clone());
        collaborators
            .dispatch
            .set_drivers(vec![driver("drv-ravi", 300), driver("drv-meena", 120)]);

        let auth = collaborators.auth.clone();
        let profiles = collaborators.profiles.clone();
        let dispatch = collaborators.dispatch.clone();
        let safety = collaborators.safety.clone();
        let client = MockClient::new(config, collaborators).expect("valid test config");

        Self {
            client,
            auth,
            profiles,
            dispatch,
            safety,
            time,
        }
    }

    /// Sign in with the standard number and code.
    pub async fn sign_in(&self) -> Identity {
        let token = self
            .client
            .request_challenge(PHONE)
            .await
            .expect("challenge sent");
        self.client
            .verify_challenge(&token, CODE)
            .await
            .expect("code accepted")
    }

    /// Discover drivers and book the closest one.
    pub async fn book(&self) -> Ride {
        let drivers = self
            .client
            .start_booking(pickup(), drop_point(), VehicleType::Bike)
            .await
            .expect("drivers found");
        self.client
            .confirm_ride(&drivers[0].id, PaymentMethod::Cash)
            .await
            .expect("ride booked")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn driver(id: &str, eta_secs: u32) -> DriverSummary {
    DriverSummary {
        id: DriverId(id.to_string()),
        name: format!("Driver {id}"),
        rating: 4.6,
        safety_rating: 4.8,
        total_rides: 310,
        vehicle: VehicleInfo {
            vehicle_type: VehicleType::Bike,
            number: "KA-01-HH-1234".to_string(),
        },
        distance_m: eta_secs * 6,
        eta_secs,
    }
}

pub fn pickup() -> LocationDetails {
    LocationDetails::from_address("Koramangala 5th Block")
}

pub fn drop_point() -> LocationDetails {
    LocationDetails::from_address("HSR Layout Sector 2")
}
