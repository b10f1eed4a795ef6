//! The game engine: validates, mutates, broadcasts — one event at a time.
//!
//! Every inbound request flows through [`GameEngine::handle`], a single
//! exhaustive match over the closed request set. Each handler runs to
//! completion (validate → mutate → broadcast) before the next event is
//! processed, so room state is never observed mid-mutation.
//!
//! Rejected operations produce no event, no state change, and no
//! broadcast. The one exception the wire surfaces is a host claim on an
//! already-hosted room, which answers `roleRejected`. Everything else is
//! logged at debug level and dropped.

use cluehost_protocol::{
    ChatMessage, ClientRequest, Role, RoomKey, ServerEvent,
};
use cluehost_transport::ConnectionId;
use rand::Rng;

use crate::room::PLAYER_NAME_PREFIX;
use crate::{Broadcaster, EventSender, Rejection, RoomStore, HOST_NAME};

/// The per-process authority over all rooms.
///
/// Owns the [`RoomStore`], the [`Broadcaster`], and the map from each
/// connection to the room topic it has joined. Not thread-safe by itself:
/// it is driven by a single actor task (see
/// [`spawn_engine`](crate::spawn_engine)), which gives every room the
/// strict arrival-order serialization the design depends on.
#[derive(Debug, Default)]
pub struct GameEngine {
    store: RoomStore,
    broadcaster: Broadcaster,
    /// Which room topic each connection has joined. A connection is in at
    /// most one room at a time.
    joined: std::collections::HashMap<ConnectionId, RoomKey>,
}

impl GameEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection's outbound channel.
    pub fn connect(&mut self, conn: ConnectionId, sender: EventSender) {
        tracing::debug!(%conn, "connection registered");
        self.broadcaster.register(conn, sender);
    }

    /// Applies one inbound request from `conn`.
    pub fn handle(&mut self, conn: ConnectionId, request: ClientRequest) {
        let outcome = match request {
            ClientRequest::JoinRoom { room_key } => {
                self.join_room(conn, room_key)
            }
            ClientRequest::SelectRole { room_key, role } => {
                self.select_role(conn, room_key, role)
            }
            ClientRequest::UpdateQuestion {
                room_key,
                question_text,
            } => self.update_question(conn, room_key, question_text),
            ClientRequest::SendMessage {
                room_key,
                message_data,
            } => self.send_chat(conn, room_key, message_data),
            ClientRequest::AddClue {
                room_key,
                clue_text,
            } => self.add_clue(conn, room_key, clue_text),
            ClientRequest::DeleteClue { room_key, clue_id } => {
                self.delete_clue(conn, room_key, clue_id)
            }
            ClientRequest::ToggleHighlightClue { room_key, clue_id } => {
                self.toggle_highlight(conn, room_key, clue_id)
            }
            ClientRequest::AnnounceResult { room_key, result } => {
                self.announce_result(conn, room_key, result)
            }
            ClientRequest::ResetGame { room_key } => {
                self.reset_game(conn, room_key)
            }
        };

        if let Err(rejection) = outcome {
            tracing::debug!(%conn, %rejection, "request dropped");
            if matches!(rejection, Rejection::HostTaken) {
                self.broadcaster.send_to(
                    conn,
                    ServerEvent::RoleRejected { role: Role::Host },
                );
            }
        }
    }

    /// Handles the implicit disconnect event for `conn`.
    ///
    /// If the connection held a seat, the room hears a leave notice; if it
    /// held the host seat, the room is torn down entirely — no handoff.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        tracing::debug!(%conn, "connection gone");
        if let Some(key) = self.joined.remove(&conn) {
            // Unsubscribe first so the departing connection does not hear
            // its own leave notice.
            self.broadcaster.unsubscribe(&key, conn);
            self.depart(conn, &key);
        }
        self.broadcaster.unregister(conn);
    }

    /// Number of live rooms. Exposed for tests and diagnostics.
    pub fn room_count(&self) -> usize {
        self.store.len()
    }

    // -- Request handlers -------------------------------------------------

    fn join_room(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
    ) -> Result<(), Rejection> {
        self.ensure_joined(conn, &key);
        let has_host = self.store.resolve_or_create(&key).has_host();
        self.broadcaster
            .send_to(conn, ServerEvent::JoinSuccess { has_host });
        Ok(())
    }

    fn select_role(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        role: Role,
    ) -> Result<(), Rejection> {
        let name = match role {
            Role::Host => HOST_NAME.to_owned(),
            Role::Player => player_name(),
            Role::System => {
                return Err(Rejection::UnassignableRole(role));
            }
        };

        self.ensure_joined(conn, &key);
        let room = self.store.resolve_or_create(&key);

        if role == Role::Host {
            room.claim_host(conn)?;
            tracing::info!(room = %key, %conn, "host claimed");
        } else {
            room.seat_player(conn, name.clone());
            tracing::info!(room = %key, %conn, name = %name, "player seated");
        }

        // Snapshot before the join announcement so the replay reflects the
        // room as it was — unmodified by the join itself.
        let sync = ServerEvent::GameStateSync {
            question: room.question().to_owned(),
            clues: room.clue_list(),
            chat_history: room.chat_history().to_vec(),
            my_name: name.clone(),
        };
        self.broadcaster
            .send_to(conn, ServerEvent::RoleConfirmed { role });
        self.broadcaster.send_to(conn, sync);

        if role == Role::Host {
            self.broadcaster.broadcast(
                &key,
                ServerEvent::HostUpdate { connected: true },
            );
        }

        let message =
            room.push_system(format!("{name} joined the room"));
        self.broadcaster
            .broadcast(&key, ServerEvent::NewMessage { message });
        Ok(())
    }

    fn update_question(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        question_text: String,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        room.require_host(conn)?;
        room.set_question(question_text.clone());
        self.broadcaster.broadcast(
            &key,
            ServerEvent::QuestionUpdated { question_text },
        );
        Ok(())
    }

    fn send_chat(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        message_data: ChatMessage,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        // Only the text survives; sender and role come from the seat.
        let message = room.record_chat(conn, message_data.text)?;
        self.broadcaster
            .broadcast(&key, ServerEvent::NewMessage { message });
        Ok(())
    }

    fn add_clue(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        clue_text: String,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        room.require_host(conn)?;
        room.add_clue(clue_text);
        let clues = room.clue_list();
        self.broadcaster
            .broadcast(&key, ServerEvent::CluesUpdated { clues });
        Ok(())
    }

    fn delete_clue(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        clue_id: String,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        room.require_host(conn)?;
        room.delete_clue(&clue_id)?;
        let clues = room.clue_list();
        self.broadcaster
            .broadcast(&key, ServerEvent::CluesUpdated { clues });
        Ok(())
    }

    fn toggle_highlight(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        clue_id: String,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        room.require_host(conn)?;
        room.toggle_highlight(&clue_id)?;
        let clues = room.clue_list();
        self.broadcaster
            .broadcast(&key, ServerEvent::CluesUpdated { clues });
        Ok(())
    }

    fn announce_result(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        result: serde_json::Value,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        room.require_host(conn)?;
        // No state mutation — the payload passes through untouched.
        self.broadcaster
            .broadcast(&key, ServerEvent::ResultAnnounced { result });
        Ok(())
    }

    fn reset_game(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
    ) -> Result<(), Rejection> {
        let room = self.store.resolve_or_create(&key);
        room.require_host(conn)?;
        self.store.remove(&key);
        tracing::info!(room = %key, %conn, "room reset by host");
        self.broadcaster.broadcast(&key, ServerEvent::GameReset);
        Ok(())
    }

    // -- Internals --------------------------------------------------------

    /// Subscribes `conn` to the topic for `key`, departing any previously
    /// joined room first (a connection is in at most one room).
    fn ensure_joined(&mut self, conn: ConnectionId, key: &RoomKey) {
        let current = self.joined.get(&conn).cloned();
        match current {
            Some(ref joined) if joined == key => return,
            Some(previous) => {
                self.broadcaster.unsubscribe(&previous, conn);
                self.depart(conn, &previous);
            }
            None => {}
        }
        self.store.resolve_or_create(key);
        self.broadcaster.subscribe(key, conn);
        self.joined.insert(conn, key.clone());
    }

    /// Removes `conn`'s seat in `key`'s room, announcing the departure.
    /// If `conn` held the host seat, the whole room is deleted and the
    /// topic hears `gameReset` after the leave notice.
    fn depart(&mut self, conn: ConnectionId, key: &RoomKey) {
        let was_host = self
            .store
            .find_by_host(conn)
            .is_some_and(|owned| owned == key);

        if let Some(room) = self.store.get_mut(key) {
            if let Some(seat) = room.remove_seat(conn) {
                let message = room
                    .push_system(format!("{} left the room", seat.name));
                self.broadcaster
                    .broadcast(key, ServerEvent::NewMessage { message });
            }
        }

        if was_host {
            self.store.remove(key);
            tracing::info!(room = %key, %conn, "host left, room torn down");
            self.broadcaster.broadcast(key, ServerEvent::GameReset);
        }
    }
}

/// Generates a player display name: fixed prefix plus a 4-digit suffix
/// drawn uniformly from 1000–9999. Collisions are permitted and not
/// checked.
fn player_name() -> String {
    let mut rng = rand::rng();
    format!("{PLAYER_NAME_PREFIX}{}", rng.random_range(1000..=9999))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_format() {
        for _ in 0..100 {
            let name = player_name();
            let suffix = name
                .strip_prefix(PLAYER_NAME_PREFIX)
                .expect("name should carry the fixed prefix");
            let n: u16 = suffix.parse().expect("suffix should be numeric");
            assert!((1000..=9999).contains(&n), "got {n}");
        }
    }
}
