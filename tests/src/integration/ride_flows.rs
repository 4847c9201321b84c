//! # Ride Flows
//!
//! Booking and lifecycle scenarios. The ride store learns whether a
//! passenger is signed in only through the session adapter, so every
//! scenario here also exercises that port.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{drop_point, pickup, Harness, CODE};
    use client_runtime::{ClientConfig, ErrorKind};
    use shared_types::{GatewayError, GeoPoint, LocationDetails, TimeSource, VehicleType};
    use sr_01_session::NewEmergencyContact;
    use sr_02_ride_tracking::{
        DriverLocationUpdate, PaymentMethod, PaymentStatus, RideRating, RideStatus,
        SafetyAlertKind,
    };

    async fn drive_to_completion(h: &Harness) {
        for status in [
            RideStatus::DriverArriving,
            RideStatus::DriverArrived,
            RideStatus::TripStarted,
            RideStatus::TripCompleted,
        ] {
            h.client.advance_status(status).await.unwrap();
        }
    }

    // =========================================================================
    // END-TO-END: BOOKING WITHOUT A SESSION
    // =========================================================================

    #[tokio::test]
    async fn test_booking_without_sign_in_never_reaches_dispatch() {
        let h = Harness::new();
        let err = h
            .client
            .start_booking(
                LocationDetails::from_address("A"),
                LocationDetails::from_address("B"),
                VehicleType::Bike,
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        assert_eq!(h.dispatch.find_calls(), 0);
        assert!(h.client.booking_draft().is_none());
    }

    #[tokio::test]
    async fn test_blank_pickup_is_missing_location() {
        let h = Harness::new();
        h.sign_in().await;
        let err = h
            .client
            .start_booking(
                LocationDetails::from_address("  "),
                drop_point(),
                VehicleType::Bike,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingLocation);
        assert_eq!(h.dispatch.find_calls(), 0);
    }

    #[tokio::test]
    async fn test_session_end_blocks_new_bookings() {
        let h = Harness::new();
        h.sign_in().await;
        h.client.sign_out().await.unwrap();

        let err = h
            .client
            .start_booking(pickup(), drop_point(), VehicleType::Bike)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_next_passenger_starts_with_no_rides() {
        let h = Harness::new();
        let first = h.sign_in().await;
        h.book().await;
        h.client.cancel_ride("").await.unwrap();
        let live = h.book().await;
        h.client.send_message("Coming down now").await.unwrap();
        assert_eq!(live.passenger_id, first.uid);

        h.client.sign_out().await.unwrap();
        assert!(h.client.current_ride().is_none());
        assert!(h.client.history().is_empty());
        assert!(h.client.messages(&live.id).is_empty());
        let err = h.client.cancel_ride("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);

        let token = h.client.request_challenge("9123456789").await.unwrap();
        let second = h.client.verify_challenge(&token, CODE).await.unwrap();
        assert_ne!(second.uid, first.uid);
        assert!(h.client.current_ride().is_none());
        assert!(h.client.booking_draft().is_none());
        assert!(h.client.history().is_empty());
        let err = h.client.cancel_ride("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // =========================================================================
    // BOOKING
    // =========================================================================

    #[tokio::test]
    async fn test_drivers_sorted_by_eta_and_ride_accepted() {
        let h = Harness::new();
        h.sign_in().await;

        let drivers = h
            .client
            .start_booking(pickup(), drop_point(), VehicleType::Bike)
            .await
            .unwrap();
        let etas: Vec<u32> = drivers.iter().map(|d| d.eta_secs).collect();
        assert_eq!(etas, vec![120, 300]);

        let ride = h
            .client
            .confirm_ride(&drivers[0].id, PaymentMethod::Upi)
            .await
            .unwrap();
        assert_eq!(ride.status, RideStatus::Accepted);
        assert_eq!(ride.payment_status, PaymentStatus::Pending);
        assert_eq!(
            ride.fare.total_amount,
            ride.fare.base_amount + ride.fare.distance_amount + ride.fare.time_amount
        );
        assert!(h.client.booking_draft().is_none());
    }

    #[tokio::test]
    async fn test_second_booking_while_ride_active() {
        let h = Harness::new();
        h.sign_in().await;
        h.book().await;

        let err = h
            .client
            .start_booking(pickup(), drop_point(), VehicleType::Bike)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_rejected_booking() {
        let h = Harness::new();
        h.sign_in().await;
        h.dispatch
            .fail_confirm(Some(GatewayError::Rejected("driver went offline".into())));

        let drivers = h
            .client
            .start_booking(pickup(), drop_point(), VehicleType::Bike)
            .await
            .unwrap();
        let err = h
            .client
            .confirm_ride(&drivers[0].id, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BookingFailed);
        assert!(h.client.current_ride().is_none());
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_status_never_moves_backwards() {
        let h = Harness::new();
        h.sign_in().await;
        h.book().await;
        h.client
            .advance_status(RideStatus::DriverArriving)
            .await
            .unwrap();

        for earlier in [RideStatus::Requested, RideStatus::Accepted, RideStatus::DriverArriving] {
            let err = h.client.advance_status(earlier).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidTransition, "{earlier:?}");
        }

        let err = h
            .client
            .advance_status(RideStatus::TripStarted)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(
            h.client.current_ride().map(|r| r.status),
            Some(RideStatus::DriverArriving)
        );
    }

    #[tokio::test]
    async fn test_complete_and_cancel_each_file_one_ride() {
        let h = Harness::new();
        h.sign_in().await;

        h.book().await;
        drive_to_completion(&h).await;
        h.time.advance_secs(60);
        let completed = h
            .client
            .complete_ride(Some(RideRating::stars(5)))
            .await
            .unwrap();
        assert_eq!(completed.status, RideStatus::TripCompleted);
        assert!(completed.started_at.is_some());
        assert!(completed.ended_at.is_some());
        assert!(h.client.current_ride().is_none());
        assert_eq!(h.client.history().len(), 1);

        let second = h.book().await;
        let cancelled = h.client.cancel_ride("Driver asked to cancel").await.unwrap();
        assert_eq!(cancelled.status, RideStatus::TripCancelled);
        assert_eq!(
            cancelled.cancellation_reason.as_deref(),
            Some("Driver asked to cancel")
        );

        let history = h.client.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, completed.id);
    }

    #[tokio::test]
    async fn test_complete_before_trip_ends() {
        let h = Harness::new();
        h.sign_in().await;
        h.book().await;

        let err = h.client.complete_ride(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert!(h.client.history().is_empty());
    }

    #[tokio::test]
    async fn test_default_history_keeps_every_filing() {
        let h = Harness::with_config(ClientConfig::default());
        h.sign_in().await;

        for filed in 1..=101 {
            h.book().await;
            h.client.cancel_ride("").await.unwrap();
            assert_eq!(h.client.history().len(), filed);
        }
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let h = Harness::new();
        let limit = h.client.config().ride.max_history;
        h.sign_in().await;

        for _ in 0..limit + 2 {
            h.book().await;
            h.client.cancel_ride("").await.unwrap();
        }
        assert_eq!(h.client.history().len(), limit);
    }

    #[tokio::test]
    async fn test_payment_after_filing() {
        let h = Harness::new();
        h.sign_in().await;
        h.book().await;
        drive_to_completion(&h).await;
        h.client.complete_ride(None).await.unwrap();

        let ride = h
            .client
            .update_payment_status(PaymentStatus::Failed)
            .unwrap();
        assert_eq!(ride.payment_status, PaymentStatus::Failed);
        h.client.update_payment_status(PaymentStatus::Pending).unwrap();
        h.client
            .update_payment_status(PaymentStatus::Completed)
            .unwrap();

        let err = h
            .client
            .update_payment_status(PaymentStatus::Failed)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(
            h.client.history()[0].payment_status,
            PaymentStatus::Completed
        );
    }

    // =========================================================================
    // DRIVER TRACKING
    // =========================================================================

    #[tokio::test]
    async fn test_driver_feed_updates_ride() {
        let h = Harness::new();
        h.sign_in().await;
        let ride = h.book().await;
        let mut feed = h.client.track_driver().await.unwrap();

        for (i, lat) in [12.930, 12.931, 12.932].into_iter().enumerate() {
            let delivered = h.dispatch.push_location(DriverLocationUpdate {
                driver_id: ride.driver_id.clone(),
                location: GeoPoint::new(lat, 77.62),
                heading: None,
                recorded_at: h.time.now() + i as u64,
            });
            assert_eq!(delivered, 1);
        }

        let latest = h.client.poll_driver_location(&mut feed).unwrap().unwrap();
        assert_eq!(latest.location.latitude, 12.932);
        assert!(h.client.poll_driver_location(&mut feed).unwrap().is_none());
    }

    // =========================================================================
    // SOS
    // =========================================================================

    #[tokio::test]
    async fn test_sos_reaches_emergency_contacts() {
        let h = Harness::new();
        h.sign_in().await;
        h.client
            .add_emergency_contact(NewEmergencyContact::new("Asha", "9812345678", "Sister"))
            .await
            .unwrap();
        let ride = h.book().await;

        let alert = h
            .client
            .raise_sos(SafetyAlertKind::PanicButton, GeoPoint::new(12.93, 77.62))
            .await
            .unwrap();
        assert_eq!(alert.ride_id, Some(ride.id));

        let dispatched = h.safety.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].1.len(), 1);
        assert_eq!(h.client.current_ride().unwrap().safety_alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_sos_failure_is_reported() {
        let h = Harness::new();
        h.sign_in().await;
        h.safety
            .fail_dispatch(Some(GatewayError::Unavailable("no signal".into())));

        let err = h
            .client
            .raise_sos(SafetyAlertKind::Sos, GeoPoint::new(12.93, 77.62))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
        assert!(h.client.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_min_rating_filters_drivers() {
        let mut config = ClientConfig::for_testing();
        config.ride.min_driver_rating = 4.7;
        let h = Harness::with_config(config);
        h.dispatch.set_drivers(vec![
            crate::integration::fixtures::driver("drv-low", 60),
            {
                let mut d = crate::integration::fixtures::driver("drv-high", 200);
                d.rating = 4.9;
                d
            },
        ]);
        h.sign_in().await;

        let drivers = h
            .client
            .start_booking(pickup(), drop_point(), VehicleType::Bike)
            .await
            .unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].id.0, "drv-high");
    }
}
