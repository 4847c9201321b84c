//! # Session Identity Adapter
//!
//! Lets the ride tracker ask who is signed in without seeing the session
//! store.

use std::sync::Arc;

use sr_01_session::{SessionApi, StateKind};
use sr_02_ride_tracking::IdentityProvider;
use shared_types::Identity;

/// [`IdentityProvider`] backed by any [`SessionApi`].
pub struct SessionIdentityAdapter<S: SessionApi> {
    session: Arc<S>,
}

impl<S: SessionApi> SessionIdentityAdapter<S> {
    /// Wrap a session service.
    pub fn new(session: Arc<S>) -> Self {
        Self { session }
    }
}

impl<S: SessionApi> IdentityProvider for SessionIdentityAdapter<S> {
    fn current_identity(&self) -> Option<Identity> {
        match self.session.state_kind() {
            StateKind::Authenticated => self.session.identity(),
            StateKind::Unauthenticated | StateKind::ChallengeSent => None,
        }
    }
}
