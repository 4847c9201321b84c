//! # Integration Scenarios
//!
//! Every scenario builds a [`client_runtime::MockClient`] on a manual clock
//! so cooldowns and expiry are driven by the test, never by wall time.

pub mod fixtures;
pub mod relay_flows;
pub mod ride_flows;
pub mod session_flows;
