//! Shared Module
//!
//! Types and pure functions shared by the synchronization engine, the document
//! API client and the desktop shell: the wire model, the diff/patch codec,
//! configuration and errors.
//!
//! # Overview
//!
//! Nothing in this module performs I/O or holds session state. Everything is
//! serializable or a pure function over snapshots.

/// Edit script types
pub mod delta;

/// Diff/patch codec
pub mod diff;

/// WebSocket envelopes
pub mod message;

/// Shared error types
pub mod error;

/// Client configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{ConfigError, SyncConfig, SyncConfigBuilder};
pub use delta::{Cursor, Delta, Operation};
pub use diff::{apply_edit_script, compute_edit_script};
pub use error::SyncError;
pub use message::{ClientMessage, Document, ServerMessage};
