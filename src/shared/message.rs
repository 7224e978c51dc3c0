/**
 * WebSocket Envelopes
 *
 * Tagged JSON envelopes exchanged with the document server. The `type` field
 * selects the variant in both directions.
 */

use crate::shared::delta::{Cursor, Delta};
use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};

/// Document snapshot as held by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub version: u64,
}

/// Envelopes sent by this client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A local edit script, optionally with the sender's caret
    Operation {
        delta: Delta,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        cursor: Option<Cursor>,
    },
    /// Caret moved without an edit
    Cursor { cursor: Cursor },
}

impl ClientMessage {
    /// Serialize to the JSON text frame sent on the wire
    pub fn to_frame(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Envelopes received from the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot sent right after connecting
    Init {
        document: Document,
        #[serde(default)]
        clients: Vec<Cursor>,
    },
    /// Another participant's edit script
    Operation { delta: Delta },
    /// Another participant's caret
    Cursor { cursor: Cursor },
    /// Server-side diagnostic; does not close the connection
    Error { error: String },
}

impl ServerMessage {
    /// Parse one inbound text frame
    pub fn parse(frame: &str) -> Result<Self, SyncError> {
        serde_json::from_str(frame).map_err(|e| SyncError::malformed(e.to_string()))
    }

    /// Envelope discriminator, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Operation { .. } => "operation",
            Self::Cursor { .. } => "cursor",
            Self::Error { .. } => "error",
        }
    }
}
