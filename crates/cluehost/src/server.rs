//! `Server` builder and accept loop.
//!
//! This is the entry point for running a Cluehost server. It binds the
//! WebSocket transport, spawns the engine actor, and hands each accepted
//! connection to its own handler task.

use cluehost_protocol::JsonCodec;
use cluehost_room::{spawn_engine, EngineHandle, GameEngine};
use cluehost_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::CluehostError;

/// Shared pieces each connection handler needs. Cheap to clone — the
/// engine handle is an mpsc sender and the codec is a unit struct.
#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) engine: EngineHandle,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Cluehost server.
pub struct ServerBuilder {
    bind_addr: String,
    engine_channel_size: usize,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            engine_channel_size: 64,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the engine command queue depth.
    pub fn engine_channel_size(mut self, size: usize) -> Self {
        self.engine_channel_size = size;
        self
    }

    /// Binds the transport and spawns the engine actor.
    pub async fn build(self) -> Result<Server, CluehostError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr).await?;
        let engine =
            spawn_engine(GameEngine::new(), self.engine_channel_size);

        Ok(Server {
            transport,
            state: ServerState {
                engine,
                codec: JsonCodec,
            },
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cluehost server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server {
    transport: WebSocketTransport,
    state: ServerState,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own handler task. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), CluehostError> {
        tracing::info!("cluehost server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
