//! Broadcast dispatcher: fans events out to room topics.
//!
//! The broadcaster knows two things the store doesn't: which connections
//! are alive (their outbound channel senders) and which room topic each
//! connection has joined. Topic membership is gateway-level state — it is
//! established by `joinRoom` and survives room deletion, so observers of a
//! torn-down room keep hearing events if the key comes back to life.

use std::collections::{HashMap, HashSet};

use cluehost_protocol::{RoomKey, ServerEvent};
use cluehost_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender for delivering outbound events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Routes [`ServerEvent`]s to single connections or whole room topics.
#[derive(Debug, Default)]
pub struct Broadcaster {
    /// Per-connection outbound channels.
    senders: HashMap<ConnectionId, EventSender>,
    /// Room-topic membership.
    topics: HashMap<RoomKey, HashSet<ConnectionId>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live connection's outbound channel.
    pub fn register(&mut self, conn: ConnectionId, sender: EventSender) {
        self.senders.insert(conn, sender);
    }

    /// Drops a connection's channel and removes it from every topic.
    pub fn unregister(&mut self, conn: ConnectionId) {
        self.senders.remove(&conn);
        for members in self.topics.values_mut() {
            members.remove(&conn);
        }
        self.topics.retain(|_, members| !members.is_empty());
    }

    /// Adds `conn` to the topic for `key`. Idempotent.
    pub fn subscribe(&mut self, key: &RoomKey, conn: ConnectionId) {
        self.topics.entry(key.clone()).or_default().insert(conn);
    }

    /// Removes `conn` from the topic for `key`.
    pub fn unsubscribe(&mut self, key: &RoomKey, conn: ConnectionId) {
        if let Some(members) = self.topics.get_mut(key) {
            members.remove(&conn);
            if members.is_empty() {
                self.topics.remove(key);
            }
        }
    }

    /// Sends an event to a single connection. Silently drops it if the
    /// receiver is gone (connection already closed).
    pub fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(event);
        }
    }

    /// Sends an event to every connection subscribed to the room topic.
    pub fn broadcast(&self, key: &RoomKey, event: ServerEvent) {
        let Some(members) = self.topics.get(key) else {
            return;
        };
        for conn in members {
            if let Some(sender) = self.senders.get(conn) {
                let _ = sender.send(event.clone());
            }
        }
    }
}
