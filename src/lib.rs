//! Collabpad - Main Library
//!
//! Collabpad is a desktop client for collaborative plain-text documents. Local
//! edits are diffed into edit scripts, buffered while the user is typing and
//! sent to the document server over a WebSocket that reconnects on its own.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire model, diff/patch codec, configuration and errors
//!   - No I/O, no session state
//!
//! - **`sync`** - The synchronization engine
//!   - Operation buffer and flush policy
//!   - WebSocket transport with bounded reconnect
//!   - Per-document session loop
//!
//! - **`egui_app`** - Native desktop app (egui/eframe)
//!   - Document HTTP API client
//!   - Create / join / edit views
//!
//! # Usage
//!
//! ```rust,no_run
//! use collabpad::shared::config::SyncConfig;
//! use collabpad::sync::{Session, SessionCommand};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::load(None)?;
//! let (updates_tx, _updates) = tokio::sync::mpsc::unbounded_channel();
//! let handle = Session::new(config, "doc-id", "Ada", updates_tx)?.spawn();
//! handle.send(SessionCommand::Flush)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Known Gaps
//!
//! Remote edit scripts are observed and reported, never merged into the local
//! text. Concurrent edits are not transformed against each other.

/// Shared types and pure functions
pub mod shared;

/// Synchronization engine
pub mod sync;

/// egui native desktop app
pub mod egui_app;
