//! Editor state for one open document.
//!
//! The session loop runs on its own thread with a current-thread tokio
//! runtime. The UI sends [`SessionCommand`]s and drains [`SessionUpdate`]s
//! once per frame without blocking.

use crate::shared::config::SyncConfig;
use crate::shared::delta::Cursor;
use crate::shared::error::SyncError;
use crate::shared::message::Document;
use crate::sync::buffer::EditKey;
use crate::sync::connection::ConnectionStatus;
use crate::sync::session::{Session, SessionCommand, SessionUpdate};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, warn};

pub struct EditorState {
    pub document: Document,
    pub user_name: String,
    /// Text bound to the text area
    pub text: String,
    pub revision: u64,
    /// The server snapshot arrived; editing is enabled from then on
    pub seeded: bool,
    pub status: ConnectionStatus,
    pub participants: Vec<Cursor>,
    pub remote_operations: u64,
    pub flushed_deltas: u64,
    pub last_error: Option<String>,
    pub ended: bool,
    last_cursor: Option<usize>,
    commands: UnboundedSender<SessionCommand>,
    updates: UnboundedReceiver<SessionUpdate>,
}

impl EditorState {
    /// Start a session for `document` on a background thread
    pub fn open(config: &SyncConfig, document: Document, user_name: &str) -> Result<Self, SyncError> {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let session = Session::new(config.clone(), document.id.clone(), user_name, updates_tx)?;

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();
            match runtime {
                Ok(runtime) => runtime.block_on(session.run(commands_rx)),
                Err(e) => error!(error = %e, "failed to start session runtime"),
            }
        });

        Ok(Self::with_channels(document, user_name, commands_tx, updates_rx))
    }

    fn with_channels(
        document: Document,
        user_name: &str,
        commands: UnboundedSender<SessionCommand>,
        updates: UnboundedReceiver<SessionUpdate>,
    ) -> Self {
        Self {
            text: document.content.clone(),
            revision: document.version,
            document,
            user_name: user_name.to_string(),
            seeded: false,
            status: ConnectionStatus::default(),
            participants: Vec::new(),
            remote_operations: 0,
            flushed_deltas: 0,
            last_error: None,
            ended: false,
            last_cursor: None,
            commands,
            updates,
        }
    }

    /// Apply everything the session has published since the last frame
    pub fn poll_updates(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.apply_update(update);
        }
    }

    pub fn apply_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Seeded(document) => {
                self.text = document.content.clone();
                self.revision = document.version;
                self.document = document;
                self.seeded = true;
            }
            SessionUpdate::Status(status) => {
                if status.is_open() {
                    self.last_error = None;
                }
                self.status = status;
            }
            SessionUpdate::Participants(participants) => self.participants = participants,
            SessionUpdate::RemoteOperation(_) => self.remote_operations += 1,
            SessionUpdate::Flushed { .. } => self.flushed_deltas += 1,
            SessionUpdate::Error(e) => self.last_error = Some(e.to_string()),
            SessionUpdate::Ended => self.ended = true,
        }
    }

    /// The text area changed; `key` is the structural key pressed this frame
    pub fn text_changed(&mut self, key: Option<EditKey>) {
        self.send(SessionCommand::LocalChange {
            text: self.text.clone(),
            key,
        });
    }

    /// Report the caret, only when it moved
    pub fn cursor_moved(&mut self, position: usize) {
        if self.last_cursor == Some(position) {
            return;
        }
        self.last_cursor = Some(position);
        self.send(SessionCommand::CursorMoved { position });
    }

    pub fn flush(&mut self) {
        self.send(SessionCommand::Flush);
    }

    /// Stop the session; it flushes, closes the socket and exits its thread
    pub fn close(&mut self) {
        if !self.ended {
            let _ = self.commands.send(SessionCommand::Shutdown);
        }
    }

    fn send(&mut self, command: SessionCommand) {
        if self.commands.send(command).is_err() {
            warn!("session is no longer running");
            self.ended = true;
            self.last_error = Some(SyncError::SessionClosed.to_string());
        }
    }
}

impl Drop for EditorState {
    fn drop(&mut self) {
        self.close();
    }
}
