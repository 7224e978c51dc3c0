//! Connection lifecycle state machine
//!
//! Pure bookkeeping for one logical connection: current state, the reconnect
//! attempt counter, the last error and whether reconnecting is still allowed.
//! No I/O happens here; [`SyncTransport`](crate::sync::transport::SyncTransport)
//! drives the machine from socket events and acts on the [`ReconnectDecision`]s
//! it returns.
//!
//! ```text
//! Idle ──begin_connect──▶ Connecting ──opened──▶ Open
//!                              ▲                   │
//!                              │ Retry             │ closed
//!                              └──── Closed ◀──────┘
//! ```

use crate::shared::config::SyncConfig;
use crate::shared::error::SyncError;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Snapshot of the connection published to the session and UI
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub reconnect_attempts: u32,
    pub last_error: Option<String>,
    /// The attempt ceiling was reached; no more reconnects will happen
    pub exhausted: bool,
}

impl ConnectionStatus {
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Short text for the connection indicator
    pub fn label(&self) -> String {
        match self.state {
            ConnectionState::Idle => "Not connected".to_string(),
            ConnectionState::Connecting if self.reconnect_attempts > 0 => {
                format!("Reconnecting (attempt {})", self.reconnect_attempts)
            }
            ConnectionState::Connecting => "Connecting...".to_string(),
            ConnectionState::Open => "Connected".to_string(),
            ConnectionState::Closed if self.exhausted => "Offline".to_string(),
            ConnectionState::Closed => "Disconnected".to_string(),
        }
    }
}

/// Fixed-interval reconnect policy with an attempt ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for ReconnectPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            enabled: config.auto_reconnect,
            interval: config.reconnect_interval,
            max_attempts: config.max_reconnect_attempts,
        }
    }
}

/// What to do after the connection closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reconnect after `delay`; `attempt` is the 1-based attempt number
    Retry { attempt: u32, delay: Duration },
    /// The ceiling was reached; the connection stays closed
    Exhausted { attempts: u32 },
    /// Teardown was requested; the close was intentional
    Stopped,
    /// Auto-reconnect is turned off
    Disabled,
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    status: ConnectionStatus,
    policy: ReconnectPolicy,
    /// Set by teardown; suppresses every later reconnect
    stopped: bool,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            status: ConnectionStatus::default(),
            policy,
            stopped: false,
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn state(&self) -> ConnectionState {
        self.status.state
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Enter `Connecting`. Returns false when teardown already happened.
    pub fn begin_connect(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.status.state = ConnectionState::Connecting;
        true
    }

    /// Handshake finished
    pub fn opened(&mut self) {
        self.status.state = ConnectionState::Open;
        self.status.reconnect_attempts = 0;
        self.status.last_error = None;
        self.status.exhausted = false;
    }

    /// The socket closed or the connect attempt failed
    pub fn closed(&mut self, error: Option<String>) -> ReconnectDecision {
        self.status.state = ConnectionState::Closed;
        if let Some(error) = error {
            self.status.last_error = Some(error);
        }

        if self.stopped {
            return ReconnectDecision::Stopped;
        }
        if !self.policy.enabled {
            return ReconnectDecision::Disabled;
        }

        if self.status.reconnect_attempts >= self.policy.max_attempts {
            let attempts = self.status.reconnect_attempts;
            self.status.exhausted = true;
            self.status.last_error = Some(SyncError::ReconnectExhausted { attempts }.to_string());
            return ReconnectDecision::Exhausted { attempts };
        }

        self.status.reconnect_attempts += 1;
        ReconnectDecision::Retry {
            attempt: self.status.reconnect_attempts,
            delay: self.policy.interval,
        }
    }

    /// Intentional disconnect
    pub fn teardown(&mut self) {
        self.stopped = true;
        self.status.state = ConnectionState::Closed;
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.status.last_error = Some(error.into());
    }
}
