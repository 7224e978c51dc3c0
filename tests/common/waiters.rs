//! Deadline-bounded helpers for event-driven tests

use collabpad::sync::session::SessionUpdate;
use collabpad::sync::transport::{LinkEvent, SyncTransport, TransportEvent};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

pub const DEADLINE: Duration = Duration::from_secs(10);

/// Feed link events into the transport until a transport event matches `pred`
pub async fn pump_until<F>(
    transport: &mut SyncTransport,
    link_rx: &mut UnboundedReceiver<LinkEvent>,
    events: &mut UnboundedReceiver<TransportEvent>,
    mut pred: F,
) -> TransportEvent
where
    F: FnMut(&TransportEvent) -> bool,
{
    let wait = async {
        loop {
            tokio::select! {
                Some(link) = link_rx.recv() => transport.handle_link_event(link),
                Some(event) = events.recv() => {
                    if pred(&event) {
                        return event;
                    }
                }
            }
        }
    };
    timeout(DEADLINE, wait).await.expect("no matching transport event before deadline")
}

/// Wait for a session update matching `pred`, skipping others
pub async fn next_update<F>(updates: &mut UnboundedReceiver<SessionUpdate>, mut pred: F) -> SessionUpdate
where
    F: FnMut(&SessionUpdate) -> bool,
{
    let wait = async {
        while let Some(update) = updates.recv().await {
            if pred(&update) {
                return update;
            }
        }
        panic!("session updates closed");
    };
    timeout(DEADLINE, wait).await.expect("no matching session update before deadline")
}

/// Next text frame the server received, parsed as JSON
pub async fn next_frame(frames: &mut UnboundedReceiver<String>) -> serde_json::Value {
    let frame = timeout(DEADLINE, frames.recv())
        .await
        .expect("no frame before deadline")
        .expect("server stopped");
    serde_json::from_str(&frame).unwrap()
}
