//! # Domain Entities
//!
//! Chat messages, notifications and the trait the ride-scoped relay is
//! generic over.

use serde::{Deserialize, Serialize};
use shared_types::{RideId, Timestamp};
use std::fmt;
use uuid::Uuid;

/// Who produced an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The passenger using this client.
    Local,
    /// Anyone else, labelled ("driver", "support", ...).
    Remote(String),
}

impl Origin {
    /// Whether the local passenger produced the entry.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    /// Label used in logs and metrics.
    pub fn label(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Remote(party) => party,
        }
    }
}

/// An entry a [`RideScopedRelay`](super::RideScopedRelay) can hold.
pub trait RelayEntry {
    /// Identifier type.
    type Id: PartialEq + fmt::Debug;

    /// Entry identifier.
    fn id(&self) -> &Self::Id;

    /// Who produced the entry.
    fn origin(&self) -> &Origin;

    /// Whether the passenger has seen the entry.
    fn is_read(&self) -> bool;

    /// Flag the entry as seen.
    fn mark_read(&mut self);
}

/// Chat message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// One message in a ride conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Conversation the message belongs to.
    pub ride_id: RideId,
    /// Sender.
    pub origin: Origin,
    /// Text, trimmed.
    pub body: String,
    /// When the message was appended.
    pub sent_at: Timestamp,
    /// Whether the passenger has seen it. Local messages start read.
    pub read: bool,
}

impl RelayEntry for ChatMessage {
    type Id = MessageId;

    fn id(&self) -> &MessageId {
        &self.id
    }

    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn is_read(&self) -> bool {
        self.read
    }

    fn mark_read(&mut self) {
        self.read = true;
    }
}

/// Notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notif-{}", self.0)
    }
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Ride progress ("driver arriving", "trip completed").
    RideUpdate,
    /// Safety alerts and check-ins.
    Safety,
    /// New chat message.
    Message,
    /// Account and app messages.
    System,
}

/// A notification shown to the passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Category.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Detail text.
    pub body: String,
    /// Ride the notification is about; `None` for account-wide ones.
    pub ride_id: Option<RideId>,
    /// When it arrived.
    pub received_at: Timestamp,
    /// Whether the passenger has seen it.
    pub read: bool,
}

impl Notification {
    /// Whether the notification is about a particular ride.
    pub fn is_ride_scoped(&self) -> bool {
        self.ride_id.is_some()
    }
}
