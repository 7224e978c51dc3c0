//! # Session Coordinator
//!
//! Binds one document and one random client id to one [`OperationBuffer`] and
//! one [`SyncTransport`] for as long as the document is open.
//!
//! ## Event loop
//!
//! A single `tokio::select!` loop reads four sources:
//!
//! 1. [`SessionCommand`]s from the UI
//! 2. [`FlushTrigger`]s from the buffer's timers
//! 3. [`LinkEvent`](crate::sync::transport::LinkEvent)s from the socket task and the reconnect timer
//! 4. [`TransportEvent`]s published by the transport
//!
//! Everything the UI should show is sent back as a [`SessionUpdate`]. Remote
//! `operation` messages are counted and forwarded but not merged into the
//! local text.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use collabpad::shared::config::SyncConfig;
//! use collabpad::sync::session::{Session, SessionCommand};
//!
//! # async fn demo() -> Result<(), collabpad::shared::error::SyncError> {
//! let (updates_tx, mut updates) = tokio::sync::mpsc::unbounded_channel();
//! let session = Session::new(SyncConfig::default(), "doc-id", "Ada", updates_tx)?;
//! let handle = session.spawn();
//!
//! handle.send(SessionCommand::LocalChange { text: "hi".to_string(), key: None })?;
//! while let Some(update) = updates.recv().await {
//!     println!("{:?}", update);
//! }
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

use crate::shared::config::SyncConfig;
use crate::shared::delta::{Cursor, Delta};
use crate::shared::error::SyncError;
use crate::shared::message::{Document, ServerMessage};
use crate::sync::buffer::{BufferConfig, DeltaSink, EditKey, FlushOutcome, FlushTrigger, OperationBuffer};
use crate::sync::connection::{ConnectionStatus, ReconnectPolicy};
use crate::sync::transport::{SyncTransport, TransportEvent};
use std::collections::BTreeMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Input from the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// The editor text changed; `key` is the key that caused it, if known
    LocalChange { text: String, key: Option<EditKey> },
    /// The local caret moved
    CursorMoved { position: usize },
    /// Send pending changes now
    Flush,
    /// Leave the document
    Shutdown,
}

/// Output to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The server sent the document snapshot; replace the editor text
    Seeded(Document),
    Status(ConnectionStatus),
    /// Remote participants, sorted by name
    Participants(Vec<Cursor>),
    /// Another participant's edit script (observed, not applied)
    RemoteOperation(Delta),
    /// A delta left for the server
    Flushed { ops: usize, version: u64 },
    Error(SyncError),
    /// The session loop exited
    Ended,
}

/// Session-side view of the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentView {
    pub document_id: String,
    pub name: String,
    pub text: String,
    /// Base version attached to outgoing deltas
    pub revision: u64,
    pub participants: BTreeMap<String, Cursor>,
    pub remote_operations: u64,
}

impl DocumentView {
    fn participant_list(&self) -> Vec<Cursor> {
        let mut list: Vec<Cursor> = self.participants.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.client_id.cmp(&b.client_id)));
        list
    }
}

/// Sink that sends flushed deltas with the local caret attached
struct OutboundLink<'a> {
    transport: &'a mut SyncTransport,
    cursor: Option<&'a Cursor>,
}

impl DeltaSink for OutboundLink<'_> {
    fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    fn send_delta(&mut self, delta: Delta) -> Result<(), SyncError> {
        self.transport.send_operation(delta, self.cursor.cloned())
    }
}

/// One open document
pub struct Session {
    config: SyncConfig,
    document_id: String,
    client_id: String,
    user_name: String,
    url: String,
    updates: UnboundedSender<SessionUpdate>,
}

impl Session {
    /// Prepare a session with a fresh client id. Nothing connects until
    /// [`run`](Self::run) or [`spawn`](Self::spawn).
    pub fn new(
        config: SyncConfig,
        document_id: impl Into<String>,
        user_name: impl Into<String>,
        updates: UnboundedSender<SessionUpdate>,
    ) -> Result<Self, SyncError> {
        let document_id = document_id.into();
        let user_name = user_name.into();
        let client_id = Uuid::new_v4().to_string();

        let name = (!user_name.is_empty()).then_some(user_name.as_str());
        let url = config.websocket_url(&document_id, &client_id, name)?;

        Ok(Self {
            config,
            document_id,
            client_id,
            user_name,
            url,
            updates,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the session on the current tokio runtime
    pub fn spawn(self) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(commands_rx));
        SessionHandle {
            commands: commands_tx,
            task,
        }
    }

    /// Drive the session until `Shutdown` arrives or every command sender is gone
    pub async fn run(self, mut commands: UnboundedReceiver<SessionCommand>) {
        let (trigger_tx, mut triggers) = mpsc::unbounded_channel();
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let (transport, mut link_events) =
            SyncTransport::new(self.url.clone(), ReconnectPolicy::from(&self.config), events_tx);

        let mut coordinator = Coordinator {
            buffer: OperationBuffer::new(
                self.client_id.clone(),
                BufferConfig::from(&self.config),
                trigger_tx,
            ),
            transport,
            view: DocumentView {
                document_id: self.document_id.clone(),
                ..DocumentView::default()
            },
            updates: self.updates,
            client_id: self.client_id,
            user_name: self.user_name,
            last_cursor: None,
            cursor_offline_reported: false,
        };

        info!(document = %self.document_id, client = %coordinator.client_id, "session started");
        coordinator.start();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => coordinator.on_command(command),
                },
                Some(trigger) = triggers.recv() => coordinator.on_trigger(trigger),
                Some(event) = link_events.recv() => coordinator.transport.handle_link_event(event),
                Some(event) = events.recv() => coordinator.on_transport_event(event),
            }
        }

        coordinator.teardown().await;
        info!(document = %self.document_id, "session ended");
    }
}

/// Command side of a spawned session
pub struct SessionHandle {
    commands: UnboundedSender<SessionCommand>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .map_err(|_| SyncError::SessionClosed)
    }

    pub fn commands(&self) -> UnboundedSender<SessionCommand> {
        self.commands.clone()
    }

    /// Ask the loop to stop and wait for teardown to finish
    pub async fn shutdown(self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        if let Err(e) = self.task.await {
            warn!(error = %e, "session task failed");
        }
    }
}

struct Coordinator {
    buffer: OperationBuffer,
    transport: SyncTransport,
    view: DocumentView,
    updates: UnboundedSender<SessionUpdate>,
    client_id: String,
    user_name: String,
    last_cursor: Option<Cursor>,
    cursor_offline_reported: bool,
}

impl Coordinator {
    fn start(&mut self) {
        self.buffer.start();
        self.transport.connect();
    }

    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::LocalChange { text, key } => {
                self.view.text = text.clone();
                let mut link = OutboundLink {
                    transport: &mut self.transport,
                    cursor: self.last_cursor.as_ref(),
                };
                let result = self
                    .buffer
                    .on_local_change(text, key, self.view.revision, &mut link);
                self.report_flush(result);
            }
            SessionCommand::CursorMoved { position } => {
                let cursor = Cursor {
                    client_id: self.client_id.clone(),
                    position,
                    name: self.user_name.clone(),
                };
                match self.transport.send_cursor(cursor.clone()) {
                    Ok(()) => {}
                    // Reported once per outage; every move would flood the UI.
                    Err(SyncError::NotConnected) if self.cursor_offline_reported => {}
                    Err(e) => {
                        self.cursor_offline_reported = e == SyncError::NotConnected;
                        debug!(error = %e, "cursor not sent");
                        self.publish(SessionUpdate::Error(e));
                    }
                }
                self.last_cursor = Some(cursor);
            }
            SessionCommand::Flush => self.flush(),
            SessionCommand::Shutdown => {}
        }
    }

    fn on_trigger(&mut self, trigger: FlushTrigger) {
        let mut link = OutboundLink {
            transport: &mut self.transport,
            cursor: self.last_cursor.as_ref(),
        };
        let result = self.buffer.on_timer(trigger, self.view.revision, &mut link);
        self.report_flush(result);
    }

    fn flush(&mut self) {
        let mut link = OutboundLink {
            transport: &mut self.transport,
            cursor: self.last_cursor.as_ref(),
        };
        let result = self.buffer.flush(self.view.revision, &mut link);
        self.report_flush(result);
    }

    fn report_flush(&mut self, result: Result<FlushOutcome, SyncError>) {
        match result {
            Ok(FlushOutcome::Sent { ops, version }) => {
                self.publish(SessionUpdate::Flushed { ops, version });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "flush failed");
                self.publish(SessionUpdate::Error(e));
            }
        }
    }

    fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::StateChanged(status) => {
                if status.is_open() {
                    self.cursor_offline_reported = false;
                }
                self.publish(SessionUpdate::Status(status));
            }
            TransportEvent::Message(message) => self.on_message(message),
            TransportEvent::Error(e) => self.publish(SessionUpdate::Error(e)),
        }
    }

    fn on_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Init { document, clients } => {
                info!(
                    document = %document.id,
                    version = document.version,
                    participants = clients.len(),
                    "document seeded"
                );
                self.view.document_id = document.id.clone();
                self.view.name = document.name.clone();
                self.view.text = document.content.clone();
                self.view.revision = document.version;
                self.buffer.reset_baseline(document.content.clone());

                self.view.participants = clients
                    .into_iter()
                    .filter(|cursor| cursor.client_id != self.client_id)
                    .map(|cursor| (cursor.client_id.clone(), cursor))
                    .collect();

                self.publish(SessionUpdate::Seeded(document));
                self.publish(SessionUpdate::Participants(self.view.participant_list()));
            }
            ServerMessage::Operation { delta } => {
                if delta.client_id == self.client_id {
                    debug!(version = delta.version, "skipping echo of own operation");
                    return;
                }
                self.view.remote_operations += 1;
                debug!(
                    from = %delta.client_id,
                    ops = delta.ops.len(),
                    total = self.view.remote_operations,
                    "remote operation observed"
                );
                self.publish(SessionUpdate::RemoteOperation(delta));
            }
            ServerMessage::Cursor { cursor } => {
                if cursor.client_id == self.client_id {
                    return;
                }
                self.view.participants.insert(cursor.client_id.clone(), cursor);
                self.publish(SessionUpdate::Participants(self.view.participant_list()));
            }
            ServerMessage::Error { error } => {
                self.publish(SessionUpdate::Error(SyncError::Server { message: error }));
            }
        }
    }

    /// Final flush, then stop timers and close the connection
    async fn teardown(&mut self) {
        if self.buffer.has_pending() {
            self.flush();
        }
        self.buffer.stop();
        self.transport.shutdown().await;
        self.publish(SessionUpdate::Status(self.transport.status().clone()));
        self.publish(SessionUpdate::Ended);
    }

    fn publish(&self, update: SessionUpdate) {
        let _ = self.updates.send(update);
    }
}
