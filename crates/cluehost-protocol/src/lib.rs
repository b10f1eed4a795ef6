//! Wire protocol for Cluehost.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientRequest`], [`ServerEvent`], [`Clue`],
//!   [`ChatMessage`], etc.) — the message structures that travel on the
//!   wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the game
//! engine (room state). It doesn't know about connections or rooms — it
//! only knows how to serialize and deserialize messages.
//!
//! Every inbound operation is a variant of the closed [`ClientRequest`]
//! enum, so the engine dispatches through a single exhaustive match
//! instead of routing on raw event-name strings.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChatMessage, ClientRequest, Clue, Role, RoomKey, ServerEvent,
};
