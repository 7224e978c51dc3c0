//! Transport integration tests against an in-process WebSocket server

use crate::common::*;
use collabpad::shared::delta::{Cursor, Delta, Operation};
use collabpad::shared::error::SyncError;
use collabpad::shared::message::ServerMessage;
use collabpad::sync::connection::{ConnectionState, ReconnectPolicy};
use collabpad::sync::transport::{SyncTransport, TransportEvent};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        enabled: true,
        interval: Duration::from_millis(20),
        max_attempts,
    }
}

fn is_open(event: &TransportEvent) -> bool {
    matches!(event, TransportEvent::StateChanged(status) if status.state == ConnectionState::Open)
}

#[tokio::test]
async fn test_connect_receives_init_and_sends_operation() {
    let mut server = TestServer::start(ServerOptions::default()).await;
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut transport, mut link_rx) = SyncTransport::new(server.ws_url(), fast_policy(5), events_tx);

    transport.connect();
    pump_until(&mut transport, &mut link_rx, &mut events, is_open).await;
    let init = pump_until(&mut transport, &mut link_rx, &mut events, |e| {
        matches!(e, TransportEvent::Message(_))
    })
    .await;

    match init {
        TransportEvent::Message(ServerMessage::Init { document, .. }) => {
            assert_eq!(document.content, "hello");
            assert_eq!(document.version, 3);
        }
        other => panic!("expected init, got {:?}", other),
    }

    let delta = Delta::new("test-client", 3, vec![Operation::retain(0, 5), Operation::insert(5, "!")]).unwrap();
    let cursor = Cursor {
        client_id: "test-client".to_string(),
        position: 6,
        name: "Ada".to_string(),
    };
    transport.send_operation(delta, Some(cursor)).unwrap();

    let frame = next_frame(&mut server.frames).await;
    assert_eq!(frame["type"], "operation");
    assert_eq!(frame["delta"]["version"], 3);
    assert_eq!(
        frame["delta"]["ops"],
        json!([{ "type": "retain", "pos": 0, "length": 5 }, { "type": "insert", "pos": 5, "text": "!" }])
    );
    assert_eq!(frame["cursor"]["position"], 6);

    assert!(server.request_uris()[0].contains("docId=doc-1"));
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let server = TestServer::start(ServerOptions::default()).await;
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut transport, mut link_rx) = SyncTransport::new(server.ws_url(), fast_policy(5), events_tx);

    transport.connect();
    pump_until(&mut transport, &mut link_rx, &mut events, |e| {
        matches!(e, TransportEvent::Message(ServerMessage::Init { .. }))
    })
    .await;

    server.push_raw("{ not json");
    let event = pump_until(&mut transport, &mut link_rx, &mut events, |e| {
        matches!(e, TransportEvent::Error(_))
    })
    .await;

    assert!(matches!(event, TransportEvent::Error(SyncError::MalformedMessage { .. })));
    assert!(transport.is_open());
}

#[tokio::test]
async fn test_reconnect_gives_up_after_ceiling() {
    let addr = unused_addr().await;
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut transport, mut link_rx) =
        SyncTransport::new(format!("ws://{}/ws", addr), fast_policy(3), events_tx);

    transport.connect();
    let event = pump_until(&mut transport, &mut link_rx, &mut events, |e| {
        matches!(e, TransportEvent::Error(SyncError::ReconnectExhausted { .. }))
    })
    .await;

    assert_eq!(event, TransportEvent::Error(SyncError::ReconnectExhausted { attempts: 3 }));
    assert_eq!(transport.status().state, ConnectionState::Closed);
    assert!(transport.status().exhausted);

    // Terminal: nothing else is scheduled.
    let quiet = tokio::time::timeout(Duration::from_millis(200), link_rx.recv()).await;
    assert!(quiet.is_err());
}

#[tokio::test]
async fn test_reconnect_resets_attempts_on_open() {
    let server = TestServer::start(ServerOptions {
        drop_first: 2,
        ..ServerOptions::default()
    })
    .await;
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut transport, mut link_rx) = SyncTransport::new(server.ws_url(), fast_policy(5), events_tx);

    transport.connect();
    let mut highest_attempt = 0;
    pump_until(&mut transport, &mut link_rx, &mut events, |e| {
        if let TransportEvent::StateChanged(status) = e {
            highest_attempt = highest_attempt.max(status.reconnect_attempts);
        }
        is_open(e)
    })
    .await;

    assert_eq!(highest_attempt, 2);
    assert_eq!(transport.status().reconnect_attempts, 0);
    assert_eq!(server.connection_count(), 3);
}

#[tokio::test]
async fn test_disconnect_does_not_reconnect() {
    let server = TestServer::start(ServerOptions::default()).await;
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (mut transport, mut link_rx) = SyncTransport::new(server.ws_url(), fast_policy(5), events_tx);

    transport.connect();
    pump_until(&mut transport, &mut link_rx, &mut events, is_open).await;

    transport.shutdown().await;
    assert_eq!(transport.status().state, ConnectionState::Closed);

    let cursor = Cursor {
        client_id: "test-client".to_string(),
        position: 0,
        name: String::new(),
    };
    assert_eq!(transport.send_cursor(cursor), Err(SyncError::NotConnected));

    // Drain what the closed link reports; none of it may reopen the connection.
    tokio::time::sleep(Duration::from_millis(200)).await;
    while let Ok(link) = link_rx.try_recv() {
        transport.handle_link_event(link);
    }
    assert_eq!(transport.status().state, ConnectionState::Closed);
    assert_eq!(server.connection_count(), 1);
}
