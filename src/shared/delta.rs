/**
 * Edit Script Types
 *
 * Defines the operations and edit scripts exchanged with the document server.
 * Positions and lengths count characters (Unicode scalar values) and are
 * expressed in the coordinate space of the script's base snapshot.
 */

use serde::{Deserialize, Serialize};

/// A single step of an edit script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    /// Keep `length` characters starting at `pos`
    Retain {
        pos: usize,
        #[serde(default)]
        length: usize,
    },
    /// Remove `length` characters starting at `pos`
    Delete {
        pos: usize,
        #[serde(default)]
        length: usize,
    },
    /// Insert `text` at `pos`
    Insert {
        pos: usize,
        #[serde(default)]
        text: String,
    },
}

impl Operation {
    pub fn retain(pos: usize, length: usize) -> Self {
        Self::Retain { pos, length }
    }

    pub fn delete(pos: usize, length: usize) -> Self {
        Self::Delete { pos, length }
    }

    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            pos,
            text: text.into(),
        }
    }

    /// Position in base-snapshot coordinates
    pub fn pos(&self) -> usize {
        match self {
            Self::Retain { pos, .. } | Self::Delete { pos, .. } | Self::Insert { pos, .. } => *pos,
        }
    }
}

/// An edit script plus the metadata the server needs to place it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delta {
    /// Session that produced the script
    pub client_id: String,
    /// Revision the script was computed against
    pub version: u64,
    /// Ordered operations, never empty
    pub ops: Vec<Operation>,
    /// Wall-clock creation time in milliseconds
    pub timestamp: i64,
}

impl Delta {
    /// Wrap `ops` into a delta stamped with the current time.
    ///
    /// Returns `None` for an empty script, which is never sent.
    pub fn new(client_id: impl Into<String>, version: u64, ops: Vec<Operation>) -> Option<Self> {
        if ops.is_empty() {
            return None;
        }
        Some(Self {
            client_id: client_id.into(),
            version,
            ops,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }
}

/// Caret position of one participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    pub client_id: String,
    pub position: usize,
    pub name: String,
}
