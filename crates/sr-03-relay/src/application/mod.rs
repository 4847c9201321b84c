//! # Application Module
//!
//! The chat and notification relays.

pub mod chat;
pub mod notifications;

pub use chat::ChatRelay;
pub use notifications::NotificationRelay;
