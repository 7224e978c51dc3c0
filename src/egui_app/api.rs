/**
 * Document API Module
 *
 * HTTP client for the document server: create a document, fetch one by id
 * and check server health. Fetching retries on 404 because a freshly created
 * document may not be visible yet.
 */

use crate::shared::config::SyncConfig;
use crate::shared::error::SyncError;
use crate::shared::message::Document;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Who can open a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Public,
    Private,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentApi {
    client: Client,
    config: SyncConfig,
}

impl DocumentApi {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// `POST /create`
    pub async fn create_document(&self, request: &CreateDocumentRequest) -> Result<Document, SyncError> {
        let url = self.config.api_url("/create");
        debug!(%url, name = %request.name, "creating document");

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(SyncError::http(format!("Create failed: {} - {}", status, error_text)));
        }

        Ok(response.json::<Document>().await?)
    }

    /// `GET /document?id=`, retried up to `fetch_attempts` times
    pub async fn get_document(&self, id: &str) -> Result<Document, SyncError> {
        let attempts = self.config.fetch_attempts.max(1);
        let mut last_error = SyncError::NotFound { id: id.to_string() };

        for attempt in 1..=attempts {
            match self.fetch_once(id).await {
                Ok(document) => return Ok(document),
                Err(e) => {
                    warn!(error = %e, attempt, attempts, "failed to fetch document");
                    last_error = e;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.fetch_retry_delay).await;
            }
        }

        Err(last_error)
    }

    async fn fetch_once(&self, id: &str) -> Result<Document, SyncError> {
        let url = self.config.api_url("/document");
        let response = self
            .client
            .get(&url)
            .query(&[("id", id)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SyncError::NotFound { id: id.to_string() }),
            status if !status.is_success() => Err(SyncError::http(format!("HTTP error! status: {}", status))),
            _ => Ok(response.json::<Document>().await?),
        }
    }

    /// `GET /health`; any failure counts as unhealthy
    pub async fn health_check(&self) -> bool {
        match self.client.get(self.config.api_url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }
}
