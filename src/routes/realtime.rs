// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Realtime gateway: WebSocket endpoint with an in-band authentication
//! handshake and presence bookkeeping.
//!
//! Each connection moves through `AwaitingAuth` → `Authenticated` →
//! closed. The only frame accepted before authentication is the
//! authenticate message itself; anything else closes the socket. A
//! connection that never authenticates is dropped after a deadline.
//! Frame classification is a pure function so the handshake rules are
//! testable without a transport.

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::services::presence::ConnectionHandle;
use crate::AppState;

/// How long an unauthenticated connection may sit before being dropped.
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Close code for rejected handshakes (policy violation).
const CLOSE_POLICY: u16 = 1008;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(ws_upgrade))
}

// ─── Wire Protocol ───────────────────────────────────────────

/// Messages a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Authenticate { token: String },
}

/// Messages the server sends over the socket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Authenticated,
}

impl ServerMessage {
    fn to_message(&self) -> Message {
        // ServerMessage variants are plain tags; serialization cannot fail.
        let json = serde_json::to_string(self).expect("server message serializes");
        Message::Text(json.into())
    }
}

// ─── Handshake Classification ────────────────────────────────

/// What the gateway should do with a frame received before
/// authentication has completed.
#[derive(Debug, PartialEq)]
pub enum HandshakeAction {
    /// Run verification with this token.
    Authenticate(String),
    /// Transparent control traffic; answer pings, stay in AwaitingAuth.
    Control,
    /// Anything else: close the connection (fail closed).
    Reject,
    /// Client closed the socket.
    Disconnected,
}

/// Classify a pre-authentication frame. Pure; no I/O.
pub fn classify_handshake_frame(message: &Message) -> HandshakeAction {
    match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
            Ok(ClientMessage::Authenticate { token }) => HandshakeAction::Authenticate(token),
            Err(_) => HandshakeAction::Reject,
        },
        Message::Binary(_) => HandshakeAction::Reject,
        Message::Ping(_) | Message::Pong(_) => HandshakeAction::Control,
        Message::Close(_) => HandshakeAction::Disconnected,
    }
}

// ─── Gateway ─────────────────────────────────────────────────

/// GET /ws
/// WebSocket upgrade endpoint. Authentication happens in-band after the
/// upgrade, so this route sits outside the HTTP auth middleware.
async fn ws_upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_gateway(socket, state))
}

/// Drive one connection through its lifecycle.
async fn run_gateway(socket: WebSocket, state: Arc<AppState>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Writer task owns the sink; everything else sends through `tx`.
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    tracing::debug!("Realtime connection opened");

    // State: AwaitingAuth. Nothing but the handshake is processed here.
    let identity = match timeout(AUTH_TIMEOUT, await_authentication(&mut ws_receiver, &tx, &state))
        .await
    {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            // Rejected or disconnected during handshake. Dropping the
            // sender lets the writer flush any queued close frame.
            drop(tx);
            let _ = writer_handle.await;
            return;
        }
        Err(_) => {
            tracing::info!("Closing connection: no authentication within deadline");
            let _ = tx.send(close_frame("authentication timeout"));
            drop(tx);
            let _ = writer_handle.await;
            return;
        }
    };

    // State: Authenticated. Register presence and acknowledge.
    let handle = ConnectionHandle::new(tx.clone());
    let connection_id = handle.id;
    state.presence.register(&identity, handle);

    let _ = tx.send(ServerMessage::Authenticated.to_message());

    tracing::info!(
        identity = %identity,
        connection_id = %connection_id,
        "Realtime connection authenticated"
    );

    // Idle until the client goes away; registry-routed messages flow
    // through the writer task independently of this loop.
    loop {
        match ws_receiver.next().await {
            Some(Ok(Message::Ping(data))) => {
                let _ = tx.send(Message::Pong(data));
            }
            Some(Ok(Message::Pong(_))) => {}
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!(identity = %identity, "Realtime connection closed");
                break;
            }
            Some(Ok(_)) => {
                tracing::debug!(identity = %identity, "Ignoring inbound frame");
            }
            Some(Err(e)) => {
                tracing::warn!(identity = %identity, error = %e, "Realtime receive error");
                break;
            }
        }
    }

    // State: closed. Cleanup runs no matter how the loop exited.
    state.presence.unregister(connection_id);
    drop(tx);
    let _ = writer_handle.await;
}

/// Read frames until the client authenticates, fails, or goes away.
///
/// Returns the verified identity, or `None` when the connection should
/// be torn down without registering presence.
async fn await_authentication(
    ws_receiver: &mut SplitStream<WebSocket>,
    tx: &mpsc::UnboundedSender<Message>,
    state: &AppState,
) -> Option<String> {
    loop {
        let message = match ws_receiver.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Receive error before authentication");
                return None;
            }
            None => return None,
        };

        match classify_handshake_frame(&message) {
            HandshakeAction::Authenticate(token) => {
                return match state.verifier.verify(&token).await {
                    Ok(identity) => Some(identity),
                    Err(_) => {
                        // Uniform failure: close, never explain.
                        tracing::info!("Closing connection: authentication failed");
                        let _ = tx.send(close_frame("authentication failed"));
                        None
                    }
                };
            }
            HandshakeAction::Control => {
                if let Message::Ping(data) = message {
                    let _ = tx.send(Message::Pong(data));
                }
            }
            HandshakeAction::Reject => {
                tracing::info!("Closing connection: traffic before authentication");
                let _ = tx.send(close_frame("not authenticated"));
                return None;
            }
            HandshakeAction::Disconnected => {
                tracing::debug!("Client disconnected before authenticating");
                return None;
            }
        }
    }
}

/// Writer task: forwards queued messages to the WebSocket sink until the
/// channel closes or the sink errors.
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        let is_close = matches!(message, Message::Close(_));
        if ws_sender.send(message).await.is_err() {
            break;
        }
        if is_close {
            break;
        }
    }
}

fn close_frame(reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code: CLOSE_POLICY,
        reason: reason.into(),
    }))
}
