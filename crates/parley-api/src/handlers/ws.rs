//! WebSocket upgrade handler.
//!
//! The client authenticates with its first text frame, `{ "token": ... }`.
//! A refused socket receives one `connect_error` frame and is closed.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use parley_entity::user::UserProfile;
use parley_realtime::{HandshakeError, RealtimeEngine};

use crate::state::AppState;

/// GET /ws — WebSocket upgrade
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Runs one socket from handshake to disconnect.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let engine = state.realtime.clone();
    let (mut ws_tx, mut ws_rx) = socket.split();

    // ── Handshake ────────────────────────────────────────────────
    let profile = match read_handshake(&engine, &mut ws_rx).await {
        Ok(profile) => profile,
        Err(err) => {
            let frame = RealtimeEngine::connect_error_frame(&err);
            let _ = ws_tx.send(Message::Text(frame.into())).await;
            let _ = ws_tx.close().await;
            return;
        }
    };

    let (handle, mut outbound_rx) = engine.connect(profile).await;
    let conn_id = handle.id;
    let heartbeat = engine.heartbeat();
    let mut shutdown_rx = engine.shutdown_receiver();

    // ── Outbound forwarder + keepalive ───────────────────────────
    let writer = handle.clone();
    let mut outbound_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(heartbeat.ping_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if heartbeat.is_expired(&writer) {
                        warn!(conn_id = %writer.id, idle = ?writer.idle_for(), "Heartbeat timeout");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = ws_tx.close().await;
    });

    // ── Inbound loop ─────────────────────────────────────────────
    loop {
        tokio::select! {
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    engine.handle_inbound(&conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Pong(_))) | Some(Ok(Message::Ping(_))) => handle.touch(),
                Some(Ok(Message::Binary(_))) => {
                    handle.touch();
                    debug!(conn_id = %conn_id, "Ignoring binary frame");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut outbound_task => break,
            _ = shutdown_rx.recv() => break,
        }
    }

    // ── Cleanup ──────────────────────────────────────────────────
    outbound_task.abort();
    engine.disconnect(&conn_id).await;

    info!(conn_id = %conn_id, user_id = %handle.user_id(), "WebSocket connection closed");
}

/// Waits for the handshake frame and authenticates it. Silence past the
/// deadline counts as a missing token.
async fn read_handshake(
    engine: &RealtimeEngine,
    ws_rx: &mut SplitStream<WebSocket>,
) -> Result<UserProfile, HandshakeError> {
    match tokio::time::timeout(engine.handshake_timeout(), next_text(ws_rx)).await {
        Ok(Some(raw)) => engine.authenticate(&raw).await,
        Ok(None) | Err(_) => {
            let err = HandshakeError::MissingToken;
            engine.reject(&err);
            Err(err)
        }
    }
}

/// Next text frame, skipping control frames. `None` once the peer leaves.
async fn next_text(ws_rx: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => return Some(text.to_string()),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
    None
}
