use std::sync::mpsc::{channel, Receiver};

use crate::egui_app::api::{CreateDocumentRequest, DocumentApi, DocumentKind};
use crate::egui_app::AppView;
use crate::shared::config::{ConfigError, SyncConfig};
use crate::shared::error::SyncError;
use crate::shared::message::Document;
use tokio::runtime::Runtime;
use tracing::info;

pub mod editor;

pub use editor::EditorState;

/// Central application state shared across egui views.
pub struct AppState {
    pub config: SyncConfig,
    pub api: DocumentApi,
    pub current_view: AppView,
    pub user_name_input: String,
    pub user_name: String,
    pub title_input: String,
    pub kind_input: DocumentKind,
    pub password_input: String,
    pub join_id_input: String,
    pub loading: bool,
    pub error: Option<String>,
    pub open_result: Option<Receiver<Result<Document, SyncError>>>,
    pub editor: Option<EditorState>,
}

impl AppState {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            api: DocumentApi::new(config.clone()),
            config,
            current_view: AppView::Name,
            user_name_input: String::new(),
            user_name: String::new(),
            title_input: String::new(),
            kind_input: DocumentKind::Public,
            password_input: String::new(),
            join_id_input: String::new(),
            loading: false,
            error: None,
            open_result: None,
            editor: None,
        }
    }

    /// Show configuration problems found at startup on the first screen
    pub fn report_config_problems(&mut self, problems: &[ConfigError]) {
        if problems.is_empty() {
            return;
        }
        let details: Vec<String> = problems.iter().map(ToString::to_string).collect();
        self.error = Some(format!(
            "Configuration problem, using fallbacks: {}",
            details.join("; ")
        ));
    }

    pub fn submit_name(&mut self) {
        let name = self.user_name_input.trim();
        if name.is_empty() {
            self.error = Some("Please enter your name".to_string());
            return;
        }
        self.user_name = name.to_string();
        self.error = None;
        self.current_view = AppView::Home;
    }

    pub fn can_create(&self) -> bool {
        !self.title_input.trim().is_empty()
            && (self.kind_input == DocumentKind::Public || !self.password_input.trim().is_empty())
    }

    pub fn handle_create(&mut self) {
        if !self.can_create() {
            self.error = Some("A title is required, and a password for private documents".to_string());
            return;
        }

        let request = CreateDocumentRequest {
            name: self.title_input.trim().to_string(),
            content: String::new(),
            kind: self.kind_input,
            password: (self.kind_input == DocumentKind::Private).then(|| self.password_input.clone()),
        };
        let api = self.api.clone();
        self.run_in_background(move |rt| rt.block_on(api.create_document(&request)));
    }

    pub fn handle_join(&mut self) {
        let id = self.join_id_input.trim().to_string();
        if id.is_empty() {
            self.error = Some("Document id is required".to_string());
            return;
        }

        let api = self.api.clone();
        self.run_in_background(move |rt| rt.block_on(api.get_document(&id)));
    }

    fn run_in_background<F>(&mut self, job: F)
    where
        F: FnOnce(&Runtime) -> Result<Document, SyncError> + Send + 'static,
    {
        self.loading = true;
        self.error = None;

        let (tx, rx) = channel();
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|e| SyncError::http(format!("Failed to create runtime: {}", e)))
                .and_then(|rt| job(&rt));
            let _ = tx.send(result);
        });

        self.open_result = Some(rx);
    }

    /// Pick up a finished create/join request and open the editor
    pub fn check_open_result(&mut self) {
        let Some(rx) = &self.open_result else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };

        self.open_result = None;
        self.loading = false;

        match result.and_then(|document| self.open_document(document)) {
            Ok(()) => {
                self.error = None;
                self.current_view = AppView::Editor;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn open_document(&mut self, document: Document) -> Result<(), SyncError> {
        info!(document = %document.id, name = %document.name, "opening document");
        let editor = EditorState::open(&self.config, document, &self.user_name)?;
        self.editor = Some(editor);
        Ok(())
    }

    /// Per-frame work that does not depend on the current view
    pub fn tick(&mut self) {
        self.check_open_result();
        if let Some(editor) = self.editor.as_mut() {
            editor.poll_updates();
        }
    }

    pub fn leave_document(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.close();
        }
        self.current_view = AppView::Home;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}
