// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! End-to-end tests for the realtime gateway handshake.
//!
//! These run a real server on an ephemeral port and speak WebSocket to
//! it. With the offline mock database every verification fails the
//! account check, which is exactly the uniform-failure path the gateway
//! must fail closed on.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

mod common;

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Start the app on a random port and return its address plus the state.
async fn start_test_server() -> (SocketAddr, Arc<courtside::AppState>) {
    let (app, state) = common::create_test_app();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("WebSocket connect failed");
    stream
}

/// Wait until the server closes the connection (close frame or EOF).
async fn expect_closed(stream: &mut WsStream) {
    match tokio::time::timeout(Duration::from_secs(5), stream.next()).await {
        Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {}
        Ok(Some(Ok(other))) => panic!("expected close, got {:?}", other),
        Ok(Some(Err(_))) => {} // connection reset counts as closed
        Err(_) => panic!("connection was not closed within timeout"),
    }
}

#[tokio::test]
async fn test_invalid_token_closes_connection_without_presence() {
    let (addr, state) = start_test_server().await;
    let mut stream = connect(addr).await;

    stream
        .send(Message::Text(
            r#"{"type":"authenticate","token":"garbage.token.here"}"#.into(),
        ))
        .await
        .unwrap();

    expect_closed(&mut stream).await;
    assert_eq!(state.presence.online_count(), 0);
}

#[tokio::test]
async fn test_valid_token_for_missing_account_closes_uniformly() {
    let (addr, state) = start_test_server().await;
    let mut stream = connect(addr).await;

    // Structurally valid token; the account check fails on the offline
    // mock. The client must see the same silent close as a bad token.
    let token = common::create_test_jwt("user-123", &state.config.jwt_signing_key);
    let frame = format!(r#"{{"type":"authenticate","token":"{}"}}"#, token);

    stream.send(Message::Text(frame.into())).await.unwrap();

    expect_closed(&mut stream).await;
    assert_eq!(state.presence.online_count(), 0);
}

#[tokio::test]
async fn test_traffic_before_auth_closes_connection() {
    let (addr, state) = start_test_server().await;
    let mut stream = connect(addr).await;

    stream
        .send(Message::Text(r#"{"hello":"world"}"#.into()))
        .await
        .unwrap();

    expect_closed(&mut stream).await;
    assert_eq!(state.presence.online_count(), 0);
}

#[tokio::test]
async fn test_client_disconnect_before_auth_is_clean() {
    let (addr, state) = start_test_server().await;
    let mut stream = connect(addr).await;

    stream.close(None).await.unwrap();

    // Give the server a beat to run its teardown path.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.presence.online_count(), 0);
}
