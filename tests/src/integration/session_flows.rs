//! # Session Flows
//!
//! Sign-in and sign-out scenarios across the session store, the ride
//! store's identity port and the relay cleanup on sign-out.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{Harness, CODE, PHONE};
    use client_runtime::ErrorKind;
    use proptest::prelude::*;
    use shared_types::GatewayError;
    use sr_01_session::{NewEmergencyContact, ProfileUpdate, StateKind};
    use sr_03_relay::NotificationKind;

    // =========================================================================
    // END-TO-END: SIGN IN → SIGN OUT
    // =========================================================================

    #[tokio::test]
    async fn test_sign_in_then_sign_out_blocks_profile_updates() {
        let h = Harness::new();

        let token = h.client.request_challenge(PHONE).await.unwrap();
        assert_eq!(h.client.state_kind(), StateKind::ChallengeSent);

        let identity = h.client.verify_challenge(&token, CODE).await.unwrap();
        assert!(identity.is_verified);
        assert_eq!(identity.phone_number, "+919876543210");
        assert!(h.client.is_authenticated());

        h.client.sign_out().await.unwrap();
        assert_eq!(h.client.state_kind(), StateKind::Unauthenticated);

        let err = h
            .client
            .update_profile(ProfileUpdate::display_name("Priya"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        assert_eq!(h.auth.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_phone_with_spaces_is_accepted() {
        let h = Harness::new();
        h.client.request_challenge("98765 43210").await.unwrap();
        assert_eq!(h.auth.send_calls(), 1);
    }

    #[tokio::test]
    async fn test_rejected_code_keeps_challenge() {
        let h = Harness::new();
        h.auth.accept_only("654321");
        let token = h.client.request_challenge(PHONE).await.unwrap();

        let err = h.client.verify_challenge(&token, CODE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VerificationFailed);
        assert_eq!(h.client.state_kind(), StateKind::ChallengeSent);

        h.client.verify_challenge(&token, "654321").await.unwrap();
        assert!(h.client.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_challenge() {
        let h = Harness::new();
        let token = h.client.request_challenge(PHONE).await.unwrap();
        let ttl = h.client.config().session.challenge_ttl_secs;

        h.time.advance_secs(ttl + 1);
        let err = h.client.verify_challenge(&token, CODE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChallengeExpired);
        assert_eq!(h.client.state_kind(), StateKind::Unauthenticated);
    }

    // =========================================================================
    // RESEND COOLDOWN
    // =========================================================================

    #[tokio::test]
    async fn test_resend_within_cooldown_is_rate_limited() {
        let h = Harness::new();
        h.client.request_challenge(PHONE).await.unwrap();

        h.time.advance_secs(10);
        let err = h.client.resend_challenge(PHONE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        let wait = h.client.resend_available_in().unwrap();
        assert!((1..=30).contains(&wait), "wait was {wait}");

        h.time.advance_secs(20);
        h.client.resend_challenge(PHONE).await.unwrap();
        assert_eq!(h.auth.send_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_does_not_start_cooldown() {
        let h = Harness::new();
        h.auth
            .fail_send(Some(GatewayError::Unavailable("sms provider down".into())));
        let err = h.client.request_challenge(PHONE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
        assert_eq!(h.client.resend_available_in(), None);

        h.auth.fail_send(None);
        h.client.resend_challenge(PHONE).await.unwrap();
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    #[tokio::test]
    async fn test_profile_and_contacts_persist() {
        let h = Harness::new();
        let identity = h.sign_in().await;

        let updated = h
            .client
            .update_profile(ProfileUpdate::display_name("Priya"))
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Priya");

        let contact = h
            .client
            .add_emergency_contact(NewEmergencyContact::new("Asha", "9812345678", "Sister"))
            .await
            .unwrap();
        assert_eq!(contact.phone_number, "+919812345678");
        assert_eq!(h.profiles.stored_contacts(&identity.uid), vec![contact]);
        assert_eq!(h.client.identity().unwrap().emergency_contacts.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_account_notifications_only() {
        let h = Harness::new();
        h.sign_in().await;
        let ride = h.book().await;
        h.client
            .push_notification(NotificationKind::System, "Welcome", "Ride safe", None);

        h.client.sign_out().await.unwrap();

        let left = h.client.notifications();
        assert!(!left.is_empty());
        assert!(left.iter().all(|n| n.ride_id.as_ref() == Some(&ride.id)));
    }

    // =========================================================================
    // PROPERTY: MALFORMED NUMBERS NEVER CREATE A CHALLENGE
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_invalid_numbers_rejected(phone in "[0-5][0-9]{9}|[6-9][0-9]{0,8}|[6-9][0-9]{10,12}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let h = Harness::new();
                let err = h.client.request_challenge(&phone).await.unwrap_err();
                prop_assert_eq!(err.kind(), ErrorKind::InvalidPhoneNumber);
                prop_assert_eq!(h.client.state_kind(), StateKind::Unauthenticated);
                prop_assert_eq!(h.auth.send_calls(), 0);
                Ok(())
            })?;
        }

        #[test]
        fn prop_malformed_codes_never_reach_backend(code in "[0-9]{0,5}|[0-9]{7,9}|[a-z]{6}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let h = Harness::new();
                let token = h.client.request_challenge(PHONE).await.unwrap();
                let err = h.client.verify_challenge(&token, &code).await.unwrap_err();
                prop_assert_eq!(err.kind(), ErrorKind::InvalidCodeFormat);
                prop_assert_eq!(h.auth.verify_calls(), 0);
                Ok(())
            })?;
        }
    }
}
