//! Unified error type for the Cluehost server.

use cluehost_protocol::ProtocolError;
use cluehost_room::EngineClosed;
use cluehost_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Nothing here is fatal to a room: a failed connection just ends its
/// handler task. The `#[from]` attributes let `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CluehostError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The engine task is gone — the server is shutting down.
    #[error(transparent)]
    Engine(#[from] EngineClosed),
}
