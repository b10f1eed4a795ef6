//! The room store: an owned registry of every live room.
//!
//! Rooms come into being the first time any connection references their
//! key and vanish only on explicit reset or host departure — there is no
//! idle-room collection, so the store must tolerate unbounded retention.
//!
//! The store is a plain value, not a process-wide static: the engine owns
//! one, and tests construct isolated stores per case.

use std::collections::HashMap;

use cluehost_protocol::RoomKey;
use cluehost_transport::ConnectionId;

use crate::Room;

/// Owns all [`Room`] instances, keyed by room code.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomKey, Room>,
}

impl RoomStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room for `key`, creating a fresh empty one on first
    /// reference. A recreated room has no memory of prior contents.
    pub fn resolve_or_create(&mut self, key: &RoomKey) -> &mut Room {
        if !self.rooms.contains_key(key) {
            tracing::info!(room = %key, "room created");
        }
        self.rooms.entry(key.clone()).or_default()
    }

    pub fn get(&self, key: &RoomKey) -> Option<&Room> {
        self.rooms.get(key)
    }

    pub fn get_mut(&mut self, key: &RoomKey) -> Option<&mut Room> {
        self.rooms.get_mut(key)
    }

    /// Removes the room and all its state. Subsequent references recreate
    /// the key from scratch.
    pub fn remove(&mut self, key: &RoomKey) -> Option<Room> {
        let room = self.rooms.remove(key);
        if room.is_some() {
            tracing::info!(room = %key, "room destroyed");
        }
        room
    }

    /// Finds the room whose host seat is held by `conn`.
    ///
    /// Used on disconnect to locate the room a departing host owns. A
    /// connection holds at most one host seat, so there is zero or one
    /// match.
    pub fn find_by_host(
        &self,
        conn: ConnectionId,
    ) -> Option<&RoomKey> {
        self.rooms
            .iter()
            .find(|(_, room)| room.host() == Some(conn))
            .map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
