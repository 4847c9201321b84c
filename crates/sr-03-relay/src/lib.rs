//! # Notification/Chat Relay Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Holds the transient, UI-facing message queues that belong to a ride:
//! the in-ride chat and the passenger's notifications. Nothing here talks
//! to a backend; the runtime feeds the relays and clears them when a ride
//! is filed or the passenger signs out.
//!
//! ## Rules
//!
//! | Rule | Enforcement Location |
//! |------|---------------------|
//! | Remote message raises unread by one, local leaves it | `domain/relay.rs` - `RideScopedRelay::append()` |
//! | `mark_read` zeroes a ride's unread count | `domain/relay.rs` - `RideScopedRelay::mark_read()` |
//! | Unread count equals unread entries retained | `domain/relay.rs` |
//! | Blank messages are refused | `application/chat.rs` - `append_message()` |
//! | Notifications are newest first | `application/notifications.rs` - `push()` |
//!
//! Both relays are plain owned values; the runtime shares them behind a
//! lock.

pub mod application;
pub mod config;
pub mod domain;

pub use application::{ChatRelay, NotificationRelay};
pub use config::RelayConfig;
pub use domain::{
    ChatMessage, MessageId, Notification, NotificationId, NotificationKind, Origin, RelayEntry,
    RelayError, RelayResult, RideScopedRelay,
};
