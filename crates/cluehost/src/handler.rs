//! Per-connection handler: the gateway between one socket and the engine.
//!
//! Each accepted connection runs this handler in its own task. It does no
//! game logic at all:
//!
//! 1. Register the connection's outbound event channel with the engine.
//! 2. Spawn a writer task pumping engine events back out as text frames.
//! 3. Loop: receive frames, decode them, forward requests to the engine.
//! 4. On close (or error), report the implicit disconnect.
//!
//! Malformed frames — bad JSON, unknown event type, missing room key —
//! are dropped here at the gateway boundary and never reach the engine.

use cluehost_protocol::{ClientRequest, Codec};
use cluehost_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::CluehostError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: ServerState,
) -> Result<(), CluehostError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    state.engine.connect(conn_id, event_tx).await?;

    // Writer task: engine events → text frames. Runs until the event
    // channel closes (engine dropped the sender) or the socket dies.
    let writer_conn = conn.clone();
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match codec.encode(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&text).await.is_err() {
                break;
            }
        }
    });

    // Read loop: text frames → requests.
    loop {
        match conn.recv().await {
            Ok(Some(text)) => {
                let request: ClientRequest =
                    match state.codec.decode(&text) {
                        Ok(request) => request,
                        Err(e) => {
                            tracing::debug!(
                                %conn_id,
                                error = %e,
                                "dropping malformed frame"
                            );
                            continue;
                        }
                    };
                if state.engine.request(conn_id, request).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        }
    }

    // The implicit disconnect event: unseat, announce, tear down if host.
    let _ = state.engine.disconnect(conn_id).await;
    writer.abort();
    Ok(())
}
