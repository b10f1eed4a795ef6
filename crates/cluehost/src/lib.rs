//! # Cluehost
//!
//! A small multiplayer mystery-host game server. One participant per room
//! holds the authoritative "host" role and publishes a prompt and a
//! growing set of clues; everyone else watches state changes and chats.
//!
//! This crate ties the layers together: transport → protocol → room
//! engine. The accept loop hands each WebSocket connection to a handler
//! task; handlers decode frames into requests and forward them to the
//! single engine task, which owns all room state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cluehost::ServerBuilder;
//!
//! # async fn run() -> Result<(), cluehost::CluehostError> {
//! let server = ServerBuilder::new().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::CluehostError;
pub use server::{Server, ServerBuilder};
