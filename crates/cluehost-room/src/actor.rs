//! Engine actor: the single task that owns all room state.
//!
//! The [`GameEngine`] itself is a plain synchronous value. For the server
//! it runs inside one Tokio task, consuming commands from an mpsc channel
//! — the single logical thread of control that serializes every inbound
//! event in arrival order. Connection handlers only decode frames and
//! forward them here; they never touch room state directly.

use cluehost_protocol::ClientRequest;
use cluehost_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{EngineClosed, EventSender, GameEngine};

/// Commands delivered to the engine task. All fire-and-forget: responses
/// flow back through each connection's event channel, not through replies.
enum EngineCommand {
    Connect {
        conn: ConnectionId,
        sender: EventSender,
    },
    Request {
        conn: ConnectionId,
        request: ClientRequest,
    },
    Disconnect {
        conn: ConnectionId,
    },
}

/// Handle to the running engine actor. Cheap to clone — it's just an
/// `mpsc::Sender` wrapper; every connection handler holds one.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Registers a new connection's outbound event channel.
    pub async fn connect(
        &self,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), EngineClosed> {
        self.sender
            .send(EngineCommand::Connect { conn, sender })
            .await
            .map_err(|_| EngineClosed)
    }

    /// Forwards a decoded request for processing.
    pub async fn request(
        &self,
        conn: ConnectionId,
        request: ClientRequest,
    ) -> Result<(), EngineClosed> {
        self.sender
            .send(EngineCommand::Request { conn, request })
            .await
            .map_err(|_| EngineClosed)
    }

    /// Reports that a connection is gone.
    pub async fn disconnect(
        &self,
        conn: ConnectionId,
    ) -> Result<(), EngineClosed> {
        self.sender
            .send(EngineCommand::Disconnect { conn })
            .await
            .map_err(|_| EngineClosed)
    }
}

/// Spawns the engine task and returns a handle to it.
///
/// `channel_size` bounds the command queue — if handlers outpace the
/// engine, sends wait rather than piling up memory.
pub fn spawn_engine(
    mut engine: GameEngine,
    channel_size: usize,
) -> EngineHandle {
    let (tx, mut rx) = mpsc::channel(channel_size);

    tokio::spawn(async move {
        tracing::info!("game engine started");
        while let Some(cmd) = rx.recv().await {
            match cmd {
                EngineCommand::Connect { conn, sender } => {
                    engine.connect(conn, sender);
                }
                EngineCommand::Request { conn, request } => {
                    engine.handle(conn, request);
                }
                EngineCommand::Disconnect { conn } => {
                    engine.disconnect(conn);
                }
            }
        }
        tracing::info!("game engine stopped");
    });

    EngineHandle { sender: tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluehost_protocol::{RoomKey, ServerEvent};

    #[tokio::test]
    async fn test_actor_processes_commands_in_order() {
        let handle = spawn_engine(GameEngine::new(), 8);
        let conn = ConnectionId::new(1);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle.connect(conn, tx).await.unwrap();
        handle
            .request(
                conn,
                ClientRequest::JoinRoom {
                    room_key: RoomKey::from("ABC123"),
                },
            )
            .await
            .unwrap();

        let event = rx.recv().await.expect("join should answer");
        assert_eq!(event, ServerEvent::JoinSuccess { has_host: false });
    }

    #[tokio::test]
    async fn test_disconnect_after_engine_registration() {
        let handle = spawn_engine(GameEngine::new(), 8);
        let conn = ConnectionId::new(1);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle.connect(conn, tx).await.unwrap();
        handle.disconnect(conn).await.unwrap();

        // A request after disconnect produces nothing for this channel.
        handle
            .request(
                conn,
                ClientRequest::JoinRoom {
                    room_key: RoomKey::from("ABC123"),
                },
            )
            .await
            .unwrap();

        // The channel was unregistered before the join was processed, so
        // the join answer has nowhere to go.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
