//! The `Room` entity: one isolated game session and its mutation rules.
//!
//! A room owns the host seat, the prompt, the clue board, the chat
//! history, and the seated participants. All methods are synchronous and
//! side-effect free beyond the room itself — deciding who hears about a
//! mutation is the engine's job.

use std::collections::{BTreeMap, HashMap};

use cluehost_protocol::{ChatMessage, Clue, Role};
use cluehost_transport::ConnectionId;

use crate::Rejection;

/// Prompt text a fresh room carries until the host asks something.
pub const NO_QUESTION: &str = "The host has not asked a question yet...";

/// Fixed display name for the host seat.
pub const HOST_NAME: &str = "Host";

/// Display name attached to server-generated chat notices.
pub const SYSTEM_NAME: &str = "System";

/// Prefix for randomly generated player display names.
pub(crate) const PLAYER_NAME_PREFIX: &str = "Player-";

/// A participant's server-assigned identity within one room.
#[derive(Debug, Clone)]
pub struct Seat {
    pub name: String,
    pub role: Role,
}

/// One game session.
///
/// Invariant: at most one connection holds the host seat at any time. A
/// room with no host accepts a claim from anyone; it is never deleted
/// merely for lacking one.
#[derive(Debug)]
pub struct Room {
    host: Option<ConnectionId>,
    question: String,
    /// Monotonic clue sequence. Never reset, never reused — a deleted
    /// clue's id stays retired so cached client references can't alias a
    /// later clue.
    clue_counter: u64,
    /// Keyed by the counter value, so iteration order is insertion order.
    clues: BTreeMap<u64, Clue>,
    /// Append-only for the room's lifetime.
    chat_history: Vec<ChatMessage>,
    players: HashMap<ConnectionId, Seat>,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            host: None,
            question: NO_QUESTION.to_owned(),
            clue_counter: 0,
            clues: BTreeMap::new(),
            chat_history: Vec::new(),
            players: HashMap::new(),
        }
    }
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the connection holding the host seat, if any.
    pub fn host(&self) -> Option<ConnectionId> {
        self.host
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_host(&self, conn: ConnectionId) -> bool {
        self.host == Some(conn)
    }

    /// Checks the host-only precondition shared by every mutating
    /// operation except chat.
    pub fn require_host(
        &self,
        conn: ConnectionId,
    ) -> Result<(), Rejection> {
        if self.is_host(conn) {
            Ok(())
        } else {
            Err(Rejection::NotHost)
        }
    }

    /// Claims the host seat for `conn`.
    ///
    /// Fails with [`Rejection::HostTaken`] — and changes nothing — if any
    /// connection (including `conn` itself) already holds the seat.
    pub fn claim_host(
        &mut self,
        conn: ConnectionId,
    ) -> Result<(), Rejection> {
        if self.host.is_some() {
            return Err(Rejection::HostTaken);
        }
        self.host = Some(conn);
        self.players.insert(
            conn,
            Seat {
                name: HOST_NAME.to_owned(),
                role: Role::Host,
            },
        );
        Ok(())
    }

    /// Seats `conn` as a player under the given display name. Reseating is
    /// allowed — a fresh role selection gets a fresh name.
    pub fn seat_player(&mut self, conn: ConnectionId, name: String) {
        self.players.insert(
            conn,
            Seat {
                name,
                role: Role::Player,
            },
        );
    }

    /// Removes `conn`'s seat, returning it if one existed.
    pub fn remove_seat(&mut self, conn: ConnectionId) -> Option<Seat> {
        if self.host == Some(conn) {
            self.host = None;
        }
        self.players.remove(&conn)
    }

    pub fn seat(&self, conn: ConnectionId) -> Option<&Seat> {
        self.players.get(&conn)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn set_question(&mut self, text: String) {
        self.question = text;
    }

    /// Appends a new clue and returns it. Ids are `"clue-" + counter`.
    pub fn add_clue(&mut self, text: String) -> &Clue {
        self.clue_counter += 1;
        let clue = Clue {
            id: format!("clue-{}", self.clue_counter),
            text,
            highlighted: false,
        };
        self.clues.insert(self.clue_counter, clue);
        &self.clues[&self.clue_counter]
    }

    /// Removes the clue with the given id.
    pub fn delete_clue(&mut self, clue_id: &str) -> Result<(), Rejection> {
        let seq = parse_clue_id(clue_id)
            .ok_or_else(|| Rejection::UnknownClue(clue_id.to_owned()))?;
        self.clues
            .remove(&seq)
            .map(|_| ())
            .ok_or_else(|| Rejection::UnknownClue(clue_id.to_owned()))
    }

    /// Flips the highlight flag on the clue with the given id.
    pub fn toggle_highlight(
        &mut self,
        clue_id: &str,
    ) -> Result<(), Rejection> {
        let seq = parse_clue_id(clue_id)
            .ok_or_else(|| Rejection::UnknownClue(clue_id.to_owned()))?;
        let clue = self
            .clues
            .get_mut(&seq)
            .ok_or_else(|| Rejection::UnknownClue(clue_id.to_owned()))?;
        clue.highlighted = !clue.highlighted;
        Ok(())
    }

    /// The complete clue board in insertion order. Clue mutations always
    /// re-broadcast this full list rather than deltas.
    pub fn clue_list(&self) -> Vec<Clue> {
        self.clues.values().cloned().collect()
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    /// Records a chat message from a seated participant.
    ///
    /// The sender name and role come from the seat, never from the client
    /// — this is the anti-spoofing boundary.
    pub fn record_chat(
        &mut self,
        conn: ConnectionId,
        text: String,
    ) -> Result<ChatMessage, Rejection> {
        let seat = self.players.get(&conn).ok_or(Rejection::NotSeated)?;
        let message = ChatMessage {
            text,
            sender: seat.name.clone(),
            role: seat.role,
        };
        self.chat_history.push(message.clone());
        Ok(message)
    }

    /// Appends a server-generated chat notice and returns it.
    pub fn push_system(&mut self, text: String) -> ChatMessage {
        let message = ChatMessage {
            text,
            sender: SYSTEM_NAME.to_owned(),
            role: Role::System,
        };
        self.chat_history.push(message.clone());
        message
    }
}

/// Parses `"clue-N"` back to the counter value it was minted from.
fn parse_clue_id(clue_id: &str) -> Option<u64> {
    clue_id.strip_prefix("clue-")?.parse().ok()
}
