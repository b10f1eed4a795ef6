//! Room lifecycle, authorization, and broadcast fan-out for Cluehost.
//!
//! This is the authoritative core of the server. Rooms live in an
//! explicitly owned [`RoomStore`]; the [`GameEngine`] applies every inbound
//! [`ClientRequest`](cluehost_protocol::ClientRequest) through one
//! exhaustive dispatch, enforcing the single-host rule; the
//! [`Broadcaster`] fans resulting events out to room topics.
//!
//! # Key types
//!
//! - [`GameEngine`] — validates, mutates, broadcasts; one event at a time
//! - [`RoomStore`] — owns every [`Room`]; create-on-reference, delete-on-reset
//! - [`Broadcaster`] — per-connection senders plus room-topic membership
//! - [`EngineHandle`] — send commands to a running engine actor
//!
//! # Authorization model
//!
//! Every mutating operation except chat requires the caller to be the
//! room's host. A failed precondition is a silent no-op on the wire; the
//! engine still classifies it internally as a [`Rejection`] so the
//! contract stays explicit in code. The single surfaced failure is a host
//! claim on an already-hosted room, which answers `roleRejected`.

mod actor;
mod broadcast;
mod engine;
mod error;
mod room;
mod store;

pub use actor::{spawn_engine, EngineHandle};
pub use broadcast::{Broadcaster, EventSender};
pub use engine::GameEngine;
pub use error::{EngineClosed, Rejection};
pub use room::{Room, Seat, HOST_NAME, NO_QUESTION, SYSTEM_NAME};
pub use store::RoomStore;
