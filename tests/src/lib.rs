//! # SafeRide Test Suite
//!
//! Cross-subsystem scenarios driven through the client runtime.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # Shared harness and sample data
//!     ├── session_flows.rs  # Sign-in, resend cooldown, sign-out
//!     ├── ride_flows.rs     # Booking, lifecycle, history, SOS
//!     └── relay_flows.rs    # Chat and notifications driven by bus events
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sr-tests
//!
//! # By area
//! cargo test -p sr-tests integration::ride_flows::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
