//! Client configuration module
//!
//! Provides the explicitly constructed configuration that is injected into the
//! transport, the scheduler and the document API client at session start.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`<config dir>/collabpad/config.toml`)
//! 3. the `COLLABPAD_API_URL` environment variable
//!
//! ```toml
//! server_url = "https://docs.example.com"
//!
//! [buffer]
//! quiet_period_ms = 800
//! max_pending_ms = 1000
//! periodic_flush_ms = 1000
//!
//! [connection]
//! auto_reconnect = true
//! reconnect_interval_ms = 3000
//! max_reconnect_attempts = 5
//!
//! [api]
//! fetch_attempts = 3
//! fetch_retry_delay_ms = 1000
//! ```

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Environment variable overriding the server URL
pub const SERVER_URL_ENV: &str = "COLLABPAD_API_URL";

/// Synchronization engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the document server (http or https)
    pub server_url: String,
    /// Flush after this long without a keystroke
    pub quiet_period: Duration,
    /// Force a flush once the oldest pending change is this old
    pub max_pending: Duration,
    /// Period of the safety-net flush timer
    pub periodic_flush: Duration,
    /// Reconnect automatically after an unexpected close
    pub auto_reconnect: bool,
    /// Delay before each reconnect attempt
    pub reconnect_interval: Duration,
    /// Reconnect attempts before giving up
    pub max_reconnect_attempts: u32,
    /// Attempts made by `get_document` before reporting failure
    pub fetch_attempts: u32,
    /// Delay between `get_document` attempts
    pub fetch_retry_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            quiet_period: Duration::from_millis(800),
            max_pending: Duration::from_millis(1000),
            periodic_flush: Duration::from_millis(1000),
            auto_reconnect: true,
            reconnect_interval: Duration::from_millis(3000),
            max_reconnect_attempts: 5,
            fetch_attempts: 3,
            fetch_retry_delay: Duration::from_millis(1000),
        }
    }
}

impl SyncConfig {
    /// Create a new SyncConfigBuilder
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// An explicit `path` must exist. Without one, the default location is used
    /// when present and silently skipped otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Some(file) = read_file_layer(path)? {
            builder = builder.file(file);
        }
        builder.env().build()
    }

    /// Like [`SyncConfig::load`], but never fails.
    ///
    /// An unreadable file is skipped, an invalid `COLLABPAD_API_URL` is
    /// ignored in favour of the file's URL, and each field that fails
    /// validation keeps its default. Every problem is returned for display.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Vec<ConfigError>) {
        let mut problems = Vec::new();
        let mut builder = Self::builder();

        match read_file_layer(path) {
            Ok(Some(file)) => builder = builder.file(file),
            Ok(None) => {}
            Err(e) => problems.push(e),
        }

        let (builder, env_problem) = builder.env_checked();
        problems.extend(env_problem);

        let (config, field_problems) = builder.build_lenient();
        problems.extend(field_problems);
        (config, problems)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.field_problems().into_iter().next() {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    fn field_problems(&self) -> Vec<(&'static str, ConfigError)> {
        let mut problems = Vec::new();

        if let Err(e) = check_server_url(&self.server_url) {
            problems.push(("server_url", e));
        }

        let durations = [
            ("quiet_period", self.quiet_period),
            ("max_pending", self.max_pending),
            ("periodic_flush", self.periodic_flush),
            ("reconnect_interval", self.reconnect_interval),
        ];
        for (field, value) in durations {
            if value.is_zero() {
                problems.push((
                    field,
                    ConfigError::InvalidValue {
                        field,
                        message: "must be greater than zero".to_string(),
                    },
                ));
            }
        }

        if self.fetch_attempts == 0 {
            problems.push((
                "fetch_attempts",
                ConfigError::InvalidValue {
                    field: "fetch_attempts",
                    message: "must be at least 1".to_string(),
                },
            ));
        }

        problems
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }

    /// WebSocket endpoint for one document session.
    ///
    /// The scheme mirrors the API base: `http` becomes `ws`, `https` becomes `wss`.
    pub fn websocket_url(
        &self,
        doc_id: &str,
        client_id: &str,
        client_name: Option<&str>,
    ) -> Result<String, ConfigError> {
        let mut url = Url::parse(&self.server_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.server_url, e)))?;

        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ConfigError::InvalidUrl(self.server_url.clone()))?;

        let path = format!("{}/ws", url.path().trim_end_matches('/'));
        url.set_path(&path);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("docId", doc_id);
            query.append_pair("clientId", client_id);
            if let Some(name) = client_name {
                query.append_pair("clientName", name);
            }
        }

        Ok(url.to_string())
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("collabpad").join("config.toml"))
}

fn read_file_layer(path: Option<&Path>) -> Result<Option<FileConfig>, ConfigError> {
    if let Some(path) = path {
        return FileConfig::read(path).map(Some);
    }
    match default_config_path().filter(|p| p.exists()) {
        Some(default_path) => {
            tracing::debug!(path = %default_path.display(), "loading config file");
            FileConfig::read(&default_path).map(Some)
        }
        None => Ok(None),
    }
}

fn check_server_url(server_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(server_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", server_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            server_url
        )));
    }
    Ok(())
}

/// Builder for SyncConfig
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    server_url: Option<String>,
    quiet_period: Option<Duration>,
    max_pending: Option<Duration>,
    periodic_flush: Option<Duration>,
    auto_reconnect: Option<bool>,
    reconnect_interval: Option<Duration>,
    max_reconnect_attempts: Option<u32>,
    fetch_attempts: Option<u32>,
    fetch_retry_delay: Option<Duration>,
}

impl SyncConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn quiet_period(mut self, value: Duration) -> Self {
        self.quiet_period = Some(value);
        self
    }

    pub fn max_pending(mut self, value: Duration) -> Self {
        self.max_pending = Some(value);
        self
    }

    pub fn periodic_flush(mut self, value: Duration) -> Self {
        self.periodic_flush = Some(value);
        self
    }

    pub fn auto_reconnect(mut self, value: bool) -> Self {
        self.auto_reconnect = Some(value);
        self
    }

    pub fn reconnect_interval(mut self, value: Duration) -> Self {
        self.reconnect_interval = Some(value);
        self
    }

    pub fn max_reconnect_attempts(mut self, value: u32) -> Self {
        self.max_reconnect_attempts = Some(value);
        self
    }

    pub fn fetch_attempts(mut self, value: u32) -> Self {
        self.fetch_attempts = Some(value);
        self
    }

    pub fn fetch_retry_delay(mut self, value: Duration) -> Self {
        self.fetch_retry_delay = Some(value);
        self
    }

    /// Layer values from a parsed config file
    pub fn file(mut self, file: FileConfig) -> Self {
        if let Some(url) = file.server_url {
            self.server_url = Some(url);
        }
        let ms = Duration::from_millis;
        if let Some(buffer) = file.buffer {
            self.quiet_period = buffer.quiet_period_ms.map(ms).or(self.quiet_period);
            self.max_pending = buffer.max_pending_ms.map(ms).or(self.max_pending);
            self.periodic_flush = buffer.periodic_flush_ms.map(ms).or(self.periodic_flush);
        }
        if let Some(connection) = file.connection {
            self.auto_reconnect = connection.auto_reconnect.or(self.auto_reconnect);
            self.reconnect_interval = connection
                .reconnect_interval_ms
                .map(ms)
                .or(self.reconnect_interval);
            self.max_reconnect_attempts = connection
                .max_reconnect_attempts
                .or(self.max_reconnect_attempts);
        }
        if let Some(api) = file.api {
            self.fetch_attempts = api.fetch_attempts.or(self.fetch_attempts);
            self.fetch_retry_delay = api.fetch_retry_delay_ms.map(ms).or(self.fetch_retry_delay);
        }
        self
    }

    /// Layer values from the environment
    pub fn env(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server_url = Some(url.trim().to_string());
            }
        }
        self
    }

    /// Layer the environment, skipping a URL that would not validate
    pub fn env_checked(self) -> (Self, Option<ConfigError>) {
        match std::env::var(SERVER_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => match check_server_url(url.trim()) {
                Ok(()) => (self.server_url(url.trim()), None),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring {}", SERVER_URL_ENV);
                    (self, Some(e))
                }
            },
            _ => (self, None),
        }
    }

    /// Build the configuration
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let config = self.assemble();
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration, resetting each invalid field to its default
    pub fn build_lenient(self) -> (SyncConfig, Vec<ConfigError>) {
        let defaults = SyncConfig::default();
        let mut config = self.assemble();
        let problems = config.field_problems();

        for (field, _) in &problems {
            match *field {
                "server_url" => config.server_url = defaults.server_url.clone(),
                "quiet_period" => config.quiet_period = defaults.quiet_period,
                "max_pending" => config.max_pending = defaults.max_pending,
                "periodic_flush" => config.periodic_flush = defaults.periodic_flush,
                "reconnect_interval" => config.reconnect_interval = defaults.reconnect_interval,
                "fetch_attempts" => config.fetch_attempts = defaults.fetch_attempts,
                _ => {}
            }
        }

        (config, problems.into_iter().map(|(_, error)| error).collect())
    }

    fn assemble(self) -> SyncConfig {
        let defaults = SyncConfig::default();
        SyncConfig {
            server_url: self.server_url.unwrap_or(defaults.server_url),
            quiet_period: self.quiet_period.unwrap_or(defaults.quiet_period),
            max_pending: self.max_pending.unwrap_or(defaults.max_pending),
            periodic_flush: self.periodic_flush.unwrap_or(defaults.periodic_flush),
            auto_reconnect: self.auto_reconnect.unwrap_or(defaults.auto_reconnect),
            reconnect_interval: self.reconnect_interval.unwrap_or(defaults.reconnect_interval),
            max_reconnect_attempts: self
                .max_reconnect_attempts
                .unwrap_or(defaults.max_reconnect_attempts),
            fetch_attempts: self.fetch_attempts.unwrap_or(defaults.fetch_attempts),
            fetch_retry_delay: self.fetch_retry_delay.unwrap_or(defaults.fetch_retry_delay),
        }
    }
}

/// On-disk configuration layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub buffer: Option<BufferSection>,
    pub connection: Option<ConnectionSection>,
    pub api: Option<ApiSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferSection {
    pub quiet_period_ms: Option<u64>,
    pub max_pending_ms: Option<u64>,
    pub periodic_flush_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSection {
    pub auto_reconnect: Option<bool>,
    pub reconnect_interval_ms: Option<u64>,
    pub max_reconnect_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    pub fetch_attempts: Option<u32>,
    pub fetch_retry_delay_ms: Option<u64>,
}

impl FileConfig {
    /// Parse a TOML document
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&source)
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("failed to read config: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
}
