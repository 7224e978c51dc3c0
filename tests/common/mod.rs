//! Common test utilities and helpers
//!
//! - In-process WebSocket document server
//! - Helpers that wait for a matching event with a deadline

pub mod waiters;
pub mod ws_server;

pub use waiters::*;
pub use ws_server::*;
