//! Core protocol types for Cluehost's wire format.
//!
//! Every inbound message is a [`ClientRequest`]; every outbound message is
//! a [`ServerEvent`]. Both are internally tagged (`"type"` field, camelCase
//! names) so the JSON on the wire reads like
//! `{ "type": "addClue", "roomKey": "ABC123", "clueText": "knife" }`.
//!
//! Wire identity: a room is addressed by an opaque string code
//! ([`RoomKey`]); a connection never appears on the wire — the server
//! derives the acting connection from the socket the frame arrived on.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An opaque room code shared between participants.
///
/// Serialized as a plain string (`#[serde(transparent)]`), so
/// `RoomKey("ABC123")` is just `"ABC123"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomKey(pub String);

impl RoomKey {
    /// Returns the room code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for RoomKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Roles and room content
// ---------------------------------------------------------------------------

/// Who a participant (or a chat message author) is within a room.
///
/// `System` never arrives in a role selection from a well-behaved client;
/// it marks server-generated chat notices such as join/leave announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Player,
    System,
}

/// A host-authored hint item.
///
/// The `id` is stable for the room's lifetime: it is derived from a
/// monotonic per-room counter and is never reused, even after the clue is
/// deleted. Clients may cache it and issue delete/highlight operations
/// against it safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    pub text: String,
    pub highlighted: bool,
}

/// A single chat entry.
///
/// `sender` and `role` are server-assigned on the way through: whatever a
/// client puts in an inbound `sendMessage` is discarded and replaced with
/// the name and role the server seated that connection with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// ClientRequest — the closed set of inbound operations
// ---------------------------------------------------------------------------

/// Every operation a client can ask the server to perform.
///
/// One variant per wire event; the engine dispatches these through a single
/// exhaustive match. Disconnects are implicit (no payload, detected at the
/// transport) and therefore have no variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientRequest {
    /// Reference a room (creating it if needed) and subscribe to its topic.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_key: RoomKey },

    /// Claim the host seat, or take a player seat.
    #[serde(rename_all = "camelCase")]
    SelectRole { room_key: RoomKey, role: Role },

    /// Replace the room's prompt. Host only.
    #[serde(rename_all = "camelCase")]
    UpdateQuestion {
        room_key: RoomKey,
        question_text: String,
    },

    /// Send a chat message. `message_data.sender` and `.role` are ignored
    /// and overwritten server-side.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_key: RoomKey,
        message_data: ChatMessage,
    },

    /// Append a new clue. Host only.
    #[serde(rename_all = "camelCase")]
    AddClue { room_key: RoomKey, clue_text: String },

    /// Remove a clue by id. Host only.
    #[serde(rename_all = "camelCase")]
    DeleteClue { room_key: RoomKey, clue_id: String },

    /// Flip a clue's highlight flag. Host only.
    #[serde(rename_all = "camelCase")]
    ToggleHighlightClue { room_key: RoomKey, clue_id: String },

    /// Publish the solution. Host only; mutates nothing, the payload is
    /// opaque and passed through untouched.
    #[serde(rename_all = "camelCase")]
    AnnounceResult {
        room_key: RoomKey,
        result: serde_json::Value,
    },

    /// Tear the room down. Host only.
    #[serde(rename_all = "camelCase")]
    ResetGame { room_key: RoomKey },
}

// ---------------------------------------------------------------------------
// ServerEvent — everything the server sends back
// ---------------------------------------------------------------------------

/// Every event the server can deliver, whether to one caller or to a whole
/// room topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// To the caller after `joinRoom`: the room exists (possibly freshly
    /// created) and this is whether a host currently holds it.
    #[serde(rename_all = "camelCase")]
    JoinSuccess { has_host: bool },

    /// To the caller after role selection: the full room history, replayed
    /// exactly once so late joiners reconstruct the complete state.
    #[serde(rename_all = "camelCase")]
    GameStateSync {
        question: String,
        clues: Vec<Clue>,
        chat_history: Vec<ChatMessage>,
        my_name: String,
    },

    /// To the caller: the seat they asked for is theirs.
    RoleConfirmed { role: Role },

    /// To the caller: the host seat is already taken. This is the single
    /// authorization failure the protocol surfaces; every other rejected
    /// operation is a silent no-op.
    RoleRejected { role: Role },

    /// To the room: a host arrived (`true`).
    HostUpdate { connected: bool },

    /// To the room: the prompt changed.
    #[serde(rename_all = "camelCase")]
    QuestionUpdated { question_text: String },

    /// To the room: a chat message (player, host, or system notice).
    NewMessage { message: ChatMessage },

    /// To the room: the complete ordered clue list. Always the full list,
    /// never a delta.
    CluesUpdated { clues: Vec<Clue> },

    /// To the room: the host published the solution.
    ResultAnnounced { result: serde_json::Value },

    /// To the room: the room was torn down (host reset or host left).
    GameReset,
}

// =========================================================================
// Tests
// =========================================================================
