//! Synchronization Engine
//!
//! Client-side change synchronization for one open document: the buffer that
//! decides when local edits leave, the WebSocket transport that carries them,
//! and the session loop that ties both to the UI.
//!
//! # Module Structure
//!
//! - **`timer`** - cancel-on-drop timers that deliver values on a channel
//! - **`buffer`** - adaptive buffering of keystrokes into edit scripts
//! - **`connection`** - connection lifecycle and reconnect bookkeeping
//! - **`transport`** - WebSocket link task and envelope dispatch
//! - **`session`** - the per-document event loop
//!
//! # Thread Safety
//!
//! A session runs on one task. All state lives in that task and changes only
//! in response to a channel message, so nothing here is behind a lock.

pub mod buffer;
pub mod connection;
pub mod session;
pub mod timer;
pub mod transport;

pub use buffer::{BufferConfig, DeltaSink, EditKey, FlushOutcome, FlushTrigger, OperationBuffer};
pub use connection::{ConnectionMachine, ConnectionState, ConnectionStatus, ReconnectDecision, ReconnectPolicy};
pub use session::{DocumentView, Session, SessionCommand, SessionHandle, SessionUpdate};
pub use timer::TimerHandle;
pub use transport::{LinkEvent, SyncTransport, TransportEvent};
