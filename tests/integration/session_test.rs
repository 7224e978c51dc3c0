//! Session integration tests: UI commands in, frames on the wire out

use crate::common::*;
use collabpad::shared::config::SyncConfig;
use collabpad::shared::delta::{Cursor, Delta, Operation};
use collabpad::shared::diff::apply_edit_script;
use collabpad::shared::message::ServerMessage;
use collabpad::sync::buffer::EditKey;
use collabpad::sync::session::{Session, SessionCommand, SessionHandle, SessionUpdate};
use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn config(server: &TestServer) -> SyncConfig {
    SyncConfig::builder()
        .server_url(server.base_url())
        .build()
        .unwrap()
}

async fn open_session(server: &TestServer) -> (SessionHandle, UnboundedReceiver<SessionUpdate>, String) {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let session = Session::new(config(server), "doc-1", "Ada", updates_tx).unwrap();
    let client_id = session.client_id().to_string();
    let handle = session.spawn();

    let seeded = next_update(&mut updates, |u| matches!(u, SessionUpdate::Seeded(_))).await;
    assert_eq!(
        seeded,
        SessionUpdate::Seeded(ServerOptions::default().document)
    );
    (handle, updates, client_id)
}

#[tokio::test]
async fn test_enter_flushes_against_seeded_text() {
    let mut server = TestServer::start(ServerOptions::default()).await;
    let (handle, mut updates, client_id) = open_session(&server).await;

    handle
        .send(SessionCommand::CursorMoved { position: 5 })
        .unwrap();
    let cursor_frame = next_frame(&mut server.frames).await;
    assert_eq!(
        cursor_frame,
        json!({ "type": "cursor", "cursor": { "client_id": client_id, "position": 5, "name": "Ada" } })
    );

    handle
        .send(SessionCommand::LocalChange {
            text: "hello\n".to_string(),
            key: Some(EditKey::Enter),
        })
        .unwrap();

    let frame = next_frame(&mut server.frames).await;
    assert_eq!(frame["type"], "operation");
    assert_eq!(frame["delta"]["client_id"], client_id.as_str());
    assert_eq!(frame["delta"]["version"], 3);
    assert_eq!(
        frame["delta"]["ops"],
        json!([{ "type": "retain", "pos": 0, "length": 5 }, { "type": "insert", "pos": 5, "text": "\n" }])
    );
    assert_eq!(frame["cursor"]["position"], 5);

    let flushed = next_update(&mut updates, |u| matches!(u, SessionUpdate::Flushed { .. })).await;
    assert_eq!(flushed, SessionUpdate::Flushed { ops: 2, version: 3 });

    let uri = &server.request_uris()[0];
    assert!(uri.contains(&format!("clientId={}", client_id)));
    assert!(uri.contains("clientName=Ada"));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_backspace_sends_delete_against_seeded_text() {
    let mut server = TestServer::start(ServerOptions::default()).await;
    let (handle, mut updates, _client_id) = open_session(&server).await;

    handle
        .send(SessionCommand::LocalChange {
            text: "hell".to_string(),
            key: Some(EditKey::Backspace),
        })
        .unwrap();

    let frame = next_frame(&mut server.frames).await;
    assert_eq!(frame["type"], "operation");
    assert_eq!(
        frame["delta"]["ops"],
        json!([{ "type": "retain", "pos": 0, "length": 4 }, { "type": "delete", "pos": 4, "length": 1 }])
    );

    let ops: Vec<Operation> = serde_json::from_value(frame["delta"]["ops"].clone()).unwrap();
    assert_eq!(apply_edit_script("hello", &ops).unwrap(), "hell");

    let flushed = next_update(&mut updates, |u| matches!(u, SessionUpdate::Flushed { .. })).await;
    assert_eq!(flushed, SessionUpdate::Flushed { ops: 2, version: 3 });

    // Replacing a selection ships delete then insert at the same position.
    handle
        .send(SessionCommand::LocalChange {
            text: "help".to_string(),
            key: Some(EditKey::Delete),
        })
        .unwrap();
    let frame = next_frame(&mut server.frames).await;
    let ops: Vec<Operation> = serde_json::from_value(frame["delta"]["ops"].clone()).unwrap();
    assert_eq!(
        ops,
        vec![Operation::retain(0, 3), Operation::delete(3, 1), Operation::insert(3, "p")]
    );
    assert_eq!(apply_edit_script("hell", &ops).unwrap(), "help");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_remote_activity_is_reported() {
    let server = TestServer::start(ServerOptions::default()).await;
    let (handle, mut updates, client_id) = open_session(&server).await;

    let remote = Delta::new("someone-else", 3, vec![Operation::insert(0, "x")]).unwrap();
    server.push(&ServerMessage::Operation { delta: remote.clone() });
    let update = next_update(&mut updates, |u| matches!(u, SessionUpdate::RemoteOperation(_))).await;
    assert_eq!(update, SessionUpdate::RemoteOperation(remote));

    let bob = Cursor {
        client_id: "someone-else".to_string(),
        position: 2,
        name: "Bob".to_string(),
    };
    server.push(&ServerMessage::Cursor { cursor: bob.clone() });
    let update = next_update(&mut updates, |u| {
        matches!(u, SessionUpdate::Participants(list) if !list.is_empty())
    })
    .await;
    assert_eq!(update, SessionUpdate::Participants(vec![bob]));

    // The server echoes our own operations back; they are not remote activity.
    let own = Delta::new(client_id, 3, vec![Operation::insert(0, "y")]).unwrap();
    server.push(&ServerMessage::Operation { delta: own });
    server.push(&ServerMessage::Error { error: "marker".to_string() });
    let update = next_update(&mut updates, |u| {
        matches!(u, SessionUpdate::RemoteOperation(_) | SessionUpdate::Error(_))
    })
    .await;
    assert!(matches!(update, SessionUpdate::Error(_)));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_flushes_pending_and_ends() {
    let mut server = TestServer::start(ServerOptions::default()).await;
    let (handle, mut updates, _client_id) = open_session(&server).await;

    handle
        .send(SessionCommand::LocalChange {
            text: "hello world".to_string(),
            key: None,
        })
        .unwrap();
    handle.shutdown().await;

    let frame = next_frame(&mut server.frames).await;
    assert_eq!(
        frame["delta"]["ops"],
        json!([{ "type": "retain", "pos": 0, "length": 5 }, { "type": "insert", "pos": 5, "text": " world" }])
    );

    next_update(&mut updates, |u| matches!(u, SessionUpdate::Ended)).await;
}
