//! Shared Error Types
//!
//! This module defines the error type used by the synchronization engine and
//! the document API client. Every failure the codec, scheduler or transport
//! can report is a variant here, so the session coordinator has exactly one
//! type to present to the user.
//!
//! # Error Categories
//!
//! - `MalformedMessage` - inbound frame could not be parsed; the connection stays open
//! - `NotConnected` - a send was attempted while the connection was not open
//! - `ConnectionLost` - the socket closed unexpectedly; reconnect policy applies
//! - `ReconnectExhausted` - the reconnect ceiling was reached; terminal for the session
//! - `InvalidPatchPosition` - an edit script referenced text outside the snapshot
//! - `Server` - diagnostic pushed by the server; the connection stays open
//! - `NotFound` / `Http` - document API failures
//! - `Config` - the configured server URL cannot be turned into an endpoint
//!
//! # Usage
//!
//! ```rust
//! use collabpad::shared::error::SyncError;
//!
//! let error = SyncError::malformed("expected value at line 1 column 1");
//! assert!(error.is_recoverable());
//! ```
use crate::shared::config::ConfigError;
use thiserror::Error;

/// Errors produced by the synchronization engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Inbound envelope failed to parse
    #[error("Malformed message: {message}")]
    MalformedMessage {
        /// Parser diagnostic
        message: String,
    },

    /// Send attempted while the connection is not open
    #[error("WebSocket is not connected")]
    NotConnected,

    /// The connection closed without being asked to
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// Close reason or transport error
        reason: String,
    },

    /// Reconnect attempt ceiling reached
    #[error("Max reconnection attempts reached ({attempts})")]
    ReconnectExhausted {
        /// Number of reconnect attempts made
        attempts: u32,
    },

    /// An operation's position falls outside the current text
    #[error("Invalid patch position {position} (text length {length})")]
    InvalidPatchPosition {
        /// Offending position, in characters
        position: usize,
        /// Length of the text being patched, in characters
        length: usize,
    },

    /// Diagnostic pushed by the server over the open connection
    #[error("Server error: {message}")]
    Server {
        /// Text of the server's `error` envelope
        message: String,
    },

    /// Document does not exist on the server
    #[error("Document not found: {id}")]
    NotFound {
        /// Requested document id
        id: String,
    },

    /// HTTP request failed
    #[error("HTTP error: {message}")]
    Http {
        /// Human-readable error message
        message: String,
    },

    /// JSON serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// Configuration could not be turned into a working endpoint
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable error message
        message: String,
    },

    /// The session loop is no longer running
    #[error("Session closed")]
    SessionClosed,
}

impl SyncError {
    /// Create a new malformed message error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
        }
    }

    /// Create a new connection lost error
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        Self::ConnectionLost {
            reason: reason.into(),
        }
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether the session can keep going after this error.
    ///
    /// Only an exhausted reconnect budget and a dead session loop are terminal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::ReconnectExhausted { .. } | Self::SessionClosed
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

impl From<ConfigError> for SyncError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_error() {
        let error = SyncError::malformed("bad frame");
        match error {
            SyncError::MalformedMessage { message } => assert_eq!(message, "bad frame"),
            _ => panic!("Expected MalformedMessage"),
        }
    }

    #[test]
    fn test_error_display() {
        let error = SyncError::InvalidPatchPosition {
            position: 12,
            length: 4,
        };
        let display = format!("{}", error);
        assert!(display.contains("12"));
        assert!(display.contains("length 4"));

        assert_eq!(
            SyncError::NotConnected.to_string(),
            "WebSocket is not connected"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(SyncError::NotConnected.is_recoverable());
        assert!(SyncError::malformed("x").is_recoverable());
        assert!(SyncError::connection_lost("reset").is_recoverable());
        assert!(!SyncError::ReconnectExhausted { attempts: 5 }.is_recoverable());
        assert!(!SyncError::SessionClosed.is_recoverable());
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let error: SyncError = result.unwrap_err().into();
        match error {
            SyncError::Serialization { .. } => {}
            _ => panic!("Expected Serialization from serde error"),
        }
    }
}
