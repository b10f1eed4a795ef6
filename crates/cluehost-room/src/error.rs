//! Error types for the room layer.

use cluehost_protocol::Role;

/// Why the engine refused to apply an operation.
///
/// Rejections are an internal classification: apart from [`HostTaken`]
/// (which answers `roleRejected` to the caller), a rejected operation is
/// a silent no-op on the wire — no error event, no state change, no
/// broadcast.
///
/// [`HostTaken`]: Rejection::HostTaken
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Someone already holds the room's host seat.
    #[error("the room already has a host")]
    HostTaken,

    /// A host-only operation came from a connection that is not the host.
    #[error("caller is not the room's host")]
    NotHost,

    /// The referenced clue does not exist (deleted, or never minted).
    #[error("clue {0} does not exist")]
    UnknownClue(String),

    /// A chat message came from a connection with no seat in the room.
    #[error("caller has no seat in the room")]
    NotSeated,

    /// Only `host` and `player` can be requested in a role selection.
    #[error("role {0:?} cannot be requested")]
    UnassignableRole(Role),
}

/// The engine actor's command channel is closed — the server is shutting
/// down.
#[derive(Debug, thiserror::Error)]
#[error("game engine is not running")]
pub struct EngineClosed;
