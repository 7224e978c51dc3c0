//! egui Native Desktop App Module
//!
//! Desktop shell around the synchronization engine: pick a display name,
//! create or join a document, then edit it while the session keeps it in
//! sync with the server.
//!
//! # Module Structure
//!
//! ```text
//! egui_app/
//! ├── mod.rs      - Module exports and documentation
//! ├── main.rs     - Binary entry point
//! ├── api.rs      - Document HTTP API client
//! ├── types.rs    - View states
//! ├── state/      - App and editor state
//! ├── views/      - Name, home and editor views
//! └── theme/      - Colors and frames
//! ```

pub mod api;
pub mod state;
pub mod theme;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use api::{CreateDocumentRequest, DocumentApi, DocumentKind};
pub use state::{AppState, EditorState};
pub use types::AppView;
