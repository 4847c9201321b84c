//! # Chat Relay
//!
//! In-ride conversation between the passenger and the driver or support.

use saferide_telemetry::log_ride_event;
use shared_types::{RideId, TimeSource};
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::{ChatMessage, MessageId, Origin, RelayError, RelayResult, RideScopedRelay};

const SUBSYSTEM: &str = "relay";

/// Ride-scoped chat message store.
pub struct ChatRelay {
    relay: RideScopedRelay<ChatMessage>,
    time: Arc<dyn TimeSource>,
}

impl ChatRelay {
    /// Create an empty relay.
    pub fn new(config: &RelayConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            relay: RideScopedRelay::new(config.max_messages_per_ride),
            time,
        }
    }

    /// Append a message to `ride_id`'s conversation.
    ///
    /// Remote messages raise the unread count by one; local ones leave it
    /// unchanged.
    pub fn append_message(
        &mut self,
        ride_id: &RideId,
        origin: Origin,
        body: &str,
    ) -> RelayResult<ChatMessage> {
        let body = body.trim();
        if body.is_empty() {
            return Err(RelayError::EmptyMessage);
        }

        let message = ChatMessage {
            id: MessageId::generate(),
            ride_id: ride_id.clone(),
            read: origin.is_local(),
            origin,
            body: body.to_string(),
            sent_at: self.time.now(),
        };
        let evicted = self.relay.append(ride_id, message.clone());

        log_ride_event!(
            debug,
            SUBSYSTEM,
            "Message appended",
            ride_id,
            origin = message.origin.label(),
            unread = self.relay.unread(ride_id),
            evicted = evicted
        );
        Ok(message)
    }

    /// Mark the whole conversation read.
    pub fn mark_read(&mut self, ride_id: &RideId) -> usize {
        self.relay.mark_read(ride_id)
    }

    /// Discard the conversation.
    pub fn clear(&mut self, ride_id: &RideId) -> usize {
        let removed = self.relay.clear(ride_id);
        if removed > 0 {
            log_ride_event!(debug, SUBSYSTEM, "Conversation cleared", ride_id, removed = removed);
        }
        removed
    }

    /// Messages for `ride_id`, oldest first.
    pub fn messages(&self, ride_id: &RideId) -> Vec<ChatMessage> {
        self.relay.entries(ride_id).cloned().collect()
    }

    /// Unread messages for `ride_id`.
    pub fn unread(&self, ride_id: &RideId) -> usize {
        self.relay.unread(ride_id)
    }

    /// Unread messages across every conversation.
    pub fn total_unread(&self) -> usize {
        self.relay.total_unread()
    }

    /// Whether no conversation is held.
    pub fn is_empty(&self) -> bool {
        self.relay.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualTimeSource;

    fn relay() -> (ChatRelay, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::new(100));
        (ChatRelay::new(&RelayConfig::default(), clock.clone()), clock)
    }

    fn ride() -> RideId {
        RideId("ride-1".into())
    }

    #[test]
    fn test_append_and_mark_read() {
        let (mut chat, clock) = relay();
        chat.append_message(&ride(), Origin::Remote("driver".into()), "I'm at the gate")
            .unwrap();
        assert_eq!(chat.unread(&ride()), 1);

        clock.advance(500);
        let reply = chat
            .append_message(&ride(), Origin::Local, " Coming! ")
            .unwrap();
        assert_eq!(reply.body, "Coming!");
        assert_eq!(reply.sent_at, 600);
        assert_eq!(chat.unread(&ride()), 1);

        assert_eq!(chat.mark_read(&ride()), 1);
        assert_eq!(chat.unread(&ride()), 0);
        assert!(chat.messages(&ride()).iter().all(|m| m.read));
    }

    #[test]
    fn test_blank_message_rejected() {
        let (mut chat, _) = relay();
        assert_eq!(
            chat.append_message(&ride(), Origin::Local, "   "),
            Err(RelayError::EmptyMessage)
        );
        assert!(chat.is_empty());
    }

    #[test]
    fn test_order_preserved_and_clear() {
        let (mut chat, _) = relay();
        for body in ["one", "two", "three"] {
            chat.append_message(&ride(), Origin::Remote("support".into()), body)
                .unwrap();
        }
        let bodies: Vec<_> = chat.messages(&ride()).into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
        assert_eq!(chat.total_unread(), 3);

        assert_eq!(chat.clear(&ride()), 3);
        assert!(chat.messages(&ride()).is_empty());
        assert_eq!(chat.total_unread(), 0);
    }

    #[test]
    fn test_per_ride_cap() {
        let clock = Arc::new(ManualTimeSource::new(0));
        let mut chat = ChatRelay::new(&RelayConfig::for_testing(), clock);
        for i in 0..6 {
            chat.append_message(&ride(), Origin::Remote("driver".into()), &format!("m{i}"))
                .unwrap();
        }
        let bodies: Vec<_> = chat.messages(&ride()).into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["m2", "m3", "m4", "m5"]);
        assert_eq!(chat.unread(&ride()), 4);
    }
}
