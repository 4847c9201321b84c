//! # Subsystem Wiring
//!
//! Event routing between the subsystem stores.

pub mod event_routing;

pub use event_routing::EventRouter;
