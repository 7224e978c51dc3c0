//! # Sync Transport
//!
//! One logical WebSocket connection to the document server, with bounded
//! fixed-interval reconnects.
//!
//! ## Features
//!
//! - **Lifecycle**: `Idle → Connecting → Open → Closed`, tracked by [`ConnectionMachine`]
//! - **Reconnect**: scheduled through a [`TimerHandle`], suppressed after teardown
//! - **Outbound**: tagged JSON envelopes, only while `Open`
//! - **Inbound**: every text frame is parsed into a [`ServerMessage`]
//!
//! ## Architecture
//!
//! The socket lives in a spawned link task. The link task reports what
//! happens on the socket as [`LinkEvent`]s, each tagged with the generation of
//! the connect attempt that produced it. The owner of the transport reads
//! those events in its own loop and passes them to
//! [`SyncTransport::handle_link_event`], so every state change happens on the
//! owner's task. Outcomes are published as [`TransportEvent`]s.

use crate::shared::delta::{Cursor, Delta};
use crate::shared::error::SyncError;
use crate::shared::message::{ClientMessage, ServerMessage};
use crate::sync::buffer::DeltaSink;
use crate::sync::connection::{ConnectionMachine, ConnectionStatus, ReconnectDecision, ReconnectPolicy};
use crate::sync::timer::TimerHandle;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// How long [`SyncTransport::shutdown`] waits for the close handshake
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Report from the link task
#[derive(Debug)]
pub enum LinkEvent {
    /// Handshake done; frames sent on `outbound` go to the socket
    Opened {
        generation: u64,
        outbound: UnboundedSender<String>,
    },
    /// One inbound text frame
    Frame { generation: u64, text: String },
    /// The socket closed or could not be opened
    Closed {
        generation: u64,
        error: Option<String>,
    },
    /// The reconnect interval elapsed
    ReconnectDue { generation: u64 },
}

impl LinkEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation, .. }
            | Self::Frame { generation, .. }
            | Self::Closed { generation, .. }
            | Self::ReconnectDue { generation } => *generation,
        }
    }
}

/// What the transport tells its owner
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    StateChanged(ConnectionStatus),
    Message(ServerMessage),
    Error(SyncError),
}

pub struct SyncTransport {
    url: String,
    machine: ConnectionMachine,
    generation: u64,
    link_tx: UnboundedSender<LinkEvent>,
    events: UnboundedSender<TransportEvent>,
    outbound: Option<UnboundedSender<String>>,
    link_task: Option<JoinHandle<()>>,
    reconnect_timer: Option<TimerHandle>,
}

impl SyncTransport {
    /// Create an idle transport.
    ///
    /// The returned receiver yields the [`LinkEvent`]s that must be fed back
    /// into [`handle_link_event`](Self::handle_link_event).
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        events: UnboundedSender<TransportEvent>,
    ) -> (Self, UnboundedReceiver<LinkEvent>) {
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let transport = Self {
            url: url.into(),
            machine: ConnectionMachine::new(policy),
            generation: 0,
            link_tx,
            events,
            outbound: None,
            link_task: None,
            reconnect_timer: None,
        };
        (transport, link_rx)
    }

    pub fn status(&self) -> &ConnectionStatus {
        self.machine.status()
    }

    pub fn is_open(&self) -> bool {
        self.machine.status().is_open() && self.outbound.is_some()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start a connect attempt. Does nothing after [`disconnect`](Self::disconnect).
    pub fn connect(&mut self) {
        if !self.machine.begin_connect() {
            debug!("connect ignored after teardown");
            return;
        }

        self.generation += 1;
        self.outbound = None;
        self.reconnect_timer = None;
        if let Some(task) = self.link_task.take() {
            task.abort();
        }

        info!(url = %self.url, generation = self.generation, "connecting");
        self.link_task = Some(tokio::spawn(run_link(
            self.url.clone(),
            self.generation,
            self.link_tx.clone(),
        )));
        self.publish_status();
    }

    /// Apply one event from the link task or the reconnect timer
    pub fn handle_link_event(&mut self, event: LinkEvent) {
        if event.generation() != self.generation {
            debug!(
                stale = event.generation(),
                current = self.generation,
                "ignoring event from superseded connection"
            );
            return;
        }

        match event {
            LinkEvent::Opened { outbound, .. } => {
                if self.machine.is_stopped() {
                    return;
                }
                info!(url = %self.url, "connection open");
                self.outbound = Some(outbound);
                self.machine.opened();
                self.publish_status();
            }
            LinkEvent::Frame { text, .. } => self.dispatch_frame(&text),
            LinkEvent::Closed { error, .. } => self.on_closed(error),
            LinkEvent::ReconnectDue { .. } => {
                self.reconnect_timer = None;
                self.connect();
            }
        }
    }

    fn dispatch_frame(&mut self, text: &str) {
        match ServerMessage::parse(text) {
            Ok(message) => {
                debug!(kind = message.kind(), "received message");
                if let ServerMessage::Error { error } = &message {
                    warn!(%error, "server reported an error");
                    self.machine.record_error(error.clone());
                }
                self.emit(TransportEvent::Message(message));
            }
            Err(err) => {
                warn!(error = %err, "dropping malformed frame");
                self.machine.record_error(err.to_string());
                self.emit(TransportEvent::Error(err));
            }
        }
    }

    fn on_closed(&mut self, error: Option<String>) {
        self.outbound = None;
        self.link_task = None;

        if self.machine.is_stopped() {
            debug!("connection closed after teardown");
            return;
        }

        let reason = error.clone().unwrap_or_else(|| "connection closed".to_string());
        let decision = self.machine.closed(error);
        self.publish_status();
        self.emit(TransportEvent::Error(SyncError::connection_lost(reason.clone())));

        match decision {
            ReconnectDecision::Retry { attempt, delay } => {
                info!(
                    %reason,
                    attempt,
                    max_attempts = self.machine.policy().max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "connection lost, scheduling reconnect"
                );
                self.reconnect_timer = Some(TimerHandle::after(
                    delay,
                    self.link_tx.clone(),
                    LinkEvent::ReconnectDue {
                        generation: self.generation,
                    },
                ));
            }
            ReconnectDecision::Exhausted { attempts } => {
                warn!(attempts, "giving up on reconnecting");
                self.emit(TransportEvent::Error(SyncError::ReconnectExhausted { attempts }));
            }
            ReconnectDecision::Disabled => {
                info!(%reason, "connection lost, auto-reconnect disabled");
            }
            ReconnectDecision::Stopped => {}
        }
    }

    /// Send an edit script, with the sender's caret if known
    pub fn send_operation(&mut self, delta: Delta, cursor: Option<Cursor>) -> Result<(), SyncError> {
        self.send(&ClientMessage::Operation { delta, cursor })
    }

    pub fn send_cursor(&mut self, cursor: Cursor) -> Result<(), SyncError> {
        self.send(&ClientMessage::Cursor { cursor })
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), SyncError> {
        if !self.is_open() {
            return Err(self.not_connected());
        }

        let frame = message.to_frame()?;
        let sent = self
            .outbound
            .as_ref()
            .is_some_and(|outbound| outbound.send(frame).is_ok());
        if !sent {
            return Err(self.not_connected());
        }
        Ok(())
    }

    fn not_connected(&mut self) -> SyncError {
        let error = SyncError::NotConnected;
        self.machine.record_error(error.to_string());
        error
    }

    /// Intentional disconnect: no further reconnects, socket closed.
    ///
    /// Dropping the outbound sender makes the link task send a close frame and
    /// exit.
    pub fn disconnect(&mut self) {
        if self.machine.is_stopped() {
            return;
        }
        info!(url = %self.url, "disconnecting");
        self.machine.teardown();
        self.reconnect_timer = None;
        self.outbound = None;
        self.publish_status();
    }

    /// Disconnect and wait briefly for the link task to finish the close handshake
    pub async fn shutdown(&mut self) {
        self.disconnect();
        if let Some(mut task) = self.link_task.take() {
            if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
                debug!("close handshake timed out");
                task.abort();
            }
        }
    }

    fn publish_status(&self) {
        self.emit(TransportEvent::StateChanged(self.machine.status().clone()));
    }

    fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for SyncTransport {
    fn drop(&mut self) {
        if let Some(task) = self.link_task.take() {
            task.abort();
        }
    }
}

impl DeltaSink for SyncTransport {
    fn is_open(&self) -> bool {
        SyncTransport::is_open(self)
    }

    fn send_delta(&mut self, delta: Delta) -> Result<(), SyncError> {
        self.send_operation(delta, None)
    }
}

/// Own one socket for its whole life and report what happens on it
async fn run_link(url: String, generation: u64, link_tx: UnboundedSender<LinkEvent>) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(error = %e, "failed to connect");
            let _ = link_tx.send(LinkEvent::Closed {
                generation,
                error: Some(e.to_string()),
            });
            return;
        }
    };

    let (mut write, mut read) = stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    if link_tx
        .send(LinkEvent::Opened {
            generation,
            outbound: out_tx,
        })
        .is_err()
    {
        return;
    }

    let error = loop {
        tokio::select! {
            outgoing = out_rx.recv() => match outgoing {
                Some(frame) => {
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        break Some(e.to_string());
                    }
                }
                None => {
                    // Owner dropped the sender: intentional close.
                    let _ = write.send(Message::Close(None)).await;
                    let _ = write.close().await;
                    break None;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let event = LinkEvent::Frame {
                        generation,
                        text: text.as_str().to_owned(),
                    };
                    if link_tx.send(event).is_err() {
                        break None;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        break Some(e.to_string());
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_owned())
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| "closed by server".to_string());
                    break Some(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Some(e.to_string()),
                None => break Some("connection closed".to_string()),
            },
        }
    };

    let _ = link_tx.send(LinkEvent::Closed { generation, error });
}
