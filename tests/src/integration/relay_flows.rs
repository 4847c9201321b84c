//! # Relay Flows
//!
//! Chat and notification state driven by events on the shared bus.
//!
//! ```text
//! Ride store ──RideFiled──→ bus ──→ EventRouter ──→ clear chat + ride notifications
//! Session    ──SessionEnded──→ bus ──→ EventRouter ──→ clear account notifications
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::integration::fixtures::Harness;
    use client_runtime::{ErrorKind, EventRouter};
    use parking_lot::RwLock;
    use shared_bus::{
        EventFilter, EventPublisher, EventTopic, InMemoryEventBus, NoopPublisher, SafeRideEvent,
    };
    use shared_types::{ManualTimeSource, RideId};
    use sr_02_ride_tracking::{
        MockDispatchGateway, MockSafetyGateway, RideConfig, RideStatus, RideTrackingService,
        StaticIdentityProvider,
    };
    use sr_03_relay::{ChatRelay, NotificationKind, NotificationRelay, Origin, RelayConfig};
    use tokio::sync::watch;
    use tokio::time::timeout;

    // =========================================================================
    // CHAT UNREAD COUNTS
    // =========================================================================

    #[tokio::test]
    async fn test_unread_counts_follow_origin() {
        let h = Harness::new();
        h.sign_in().await;
        let ride = h.book().await;

        h.client
            .receive_message(&ride.id, "Driver", "At the main gate")
            .await
            .unwrap();
        assert_eq!(h.client.chat_unread(&ride.id), 1);

        h.client.send_message("Coming").await.unwrap();
        assert_eq!(h.client.chat_unread(&ride.id), 1);

        h.client
            .receive_message(&ride.id, "Driver", "White scooter")
            .await
            .unwrap();
        assert_eq!(h.client.chat_unread(&ride.id), 2);

        assert_eq!(h.client.mark_chat_read(&ride.id), 2);
        assert_eq!(h.client.chat_unread(&ride.id), 0);
        assert!(h.client.messages(&ride.id).iter().all(|m| m.read));
    }

    #[tokio::test]
    async fn test_chat_is_bounded_per_ride() {
        let h = Harness::new();
        let cap = h.client.config().relay.max_messages_per_ride;
        h.sign_in().await;
        let ride = h.book().await;

        for i in 0..cap + 3 {
            h.client
                .receive_message(&ride.id, "Driver", &format!("update {i}"))
                .await
                .unwrap();
        }

        let messages = h.client.messages(&ride.id);
        assert_eq!(messages.len(), cap);
        assert_eq!(messages[0].body, "update 3");
        assert_eq!(h.client.chat_unread(&ride.id), cap);
    }

    #[tokio::test]
    async fn test_messages_refused_after_filing() {
        let h = Harness::new();
        h.sign_in().await;
        let ride = h.book().await;
        h.client.cancel_ride("Wrong pickup").await.unwrap();

        let err = h
            .client
            .receive_message(&ride.id, "Driver", "Where are you?")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(h.client.messages(&ride.id).is_empty());
    }

    // =========================================================================
    // BUS-DRIVEN CLEANUP
    // =========================================================================

    #[tokio::test]
    async fn test_filing_clears_ride_scoped_state() {
        let h = Harness::new();
        h.sign_in().await;
        let ride = h.book().await;

        h.client
            .receive_message(&ride.id, "Driver", "Arriving")
            .await
            .unwrap();
        h.client
            .push_notification(NotificationKind::Message, "New message", "Arriving", Some(ride.id.clone()));
        h.client
            .push_notification(NotificationKind::System, "Offer", "10% off", None);
        h.client.advance_status(RideStatus::DriverArriving).await.unwrap();
        assert!(h.client.notifications().len() >= 3);

        h.client.cancel_ride("").await.unwrap();

        assert!(h.client.messages(&ride.id).is_empty());
        let left = h.client.notifications();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "Offer");
        assert_eq!(h.client.unread_notifications(), 1);
    }

    #[tokio::test]
    async fn test_bus_observers_see_lifecycle() {
        let h = Harness::new();
        let mut observer = h
            .client
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Ride]));

        h.sign_in().await;
        let ride = h.book().await;
        h.client.cancel_ride("").await.unwrap();

        let names: Vec<&str> = observer.drain().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["ride_status_changed", "ride_status_changed", "ride_filed"]
        );
    }

    #[tokio::test]
    async fn test_notification_read_tracking() {
        let h = Harness::new();
        let first = h
            .client
            .push_notification(NotificationKind::System, "One", "", None);
        h.client
            .push_notification(NotificationKind::System, "Two", "", None);
        assert_eq!(h.client.unread_notifications(), 2);

        h.client.mark_notification_read(&first.id).unwrap();
        h.client.mark_notification_read(&first.id).unwrap();
        assert_eq!(h.client.unread_notifications(), 1);

        h.client.mark_all_notifications_read();
        assert_eq!(h.client.unread_notifications(), 0);
    }

    // =========================================================================
    // BACKGROUND ROUTER
    // =========================================================================

    #[tokio::test]
    async fn test_background_router_clears_chat() {
        let time = Arc::new(ManualTimeSource::new(0));
        let config = RelayConfig::default();
        let bus = Arc::new(InMemoryEventBus::new());
        let chat = Arc::new(RwLock::new(ChatRelay::new(&config, time.clone())));
        let notifications = Arc::new(RwLock::new(NotificationRelay::new(&config, time.clone())));
        let rides = Arc::new(RideTrackingService::new(
            RideConfig::default(),
            Arc::new(MockDispatchGateway::new()),
            Arc::new(MockSafetyGateway::new()),
            Arc::new(StaticIdentityProvider::signed_out()),
            Arc::new(NoopPublisher),
            time,
        ));
        let ride_id = RideId("ride-bg".into());
        chat.write()
            .append_message(&ride_id, Origin::Remote("driver".into()), "Here")
            .unwrap();

        let router = EventRouter::new(&bus, rides, chat.clone(), notifications);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(router.run(shutdown_rx));

        bus.publish(SafeRideEvent::RideFiled {
            ride_id: ride_id.clone(),
            outcome: shared_bus::RideOutcome::Completed,
        })
        .await;

        timeout(Duration::from_secs(1), async {
            while !chat.read().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timeout waiting for router");

        shutdown_tx.send(true).unwrap();
        assert_eq!(task.await.unwrap(), 1);
    }
}
