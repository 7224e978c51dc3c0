//! # Operation Buffer
//!
//! Coalesces rapid keystrokes into one edit script and decides when to hand it
//! to the transport.
//!
//! ## Flush policy
//!
//! - **Quiet period**: flush once no keystroke has arrived for `quiet_period`
//! - **Max wait**: flush once the oldest unflushed keystroke is `max_pending` old,
//!   even while the user keeps typing
//! - **Periodic**: an independent `periodic_flush` timer for the whole session
//! - **Immediate keys**: `Enter`, `Delete` and `Backspace` flush right away
//!
//! Timers do not call back into the buffer. They deliver a [`FlushTrigger`] on
//! a channel that the session loop reads and passes to [`OperationBuffer::on_timer`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use collabpad::sync::buffer::{OperationBuffer, BufferConfig, EditKey};
//!
//! let (tx, mut triggers) = tokio::sync::mpsc::unbounded_channel();
//! let mut buffer = OperationBuffer::new("client-id", BufferConfig::default(), tx);
//! buffer.start();
//!
//! // on every keystroke
//! buffer.on_local_change("hello".to_string(), Some(EditKey::Other), revision, &mut transport)?;
//!
//! // in the session loop
//! while let Some(trigger) = triggers.recv().await {
//!     buffer.on_timer(trigger, revision, &mut transport)?;
//! }
//! ```

use crate::shared::config::SyncConfig;
use crate::shared::delta::Delta;
use crate::shared::diff::compute_edit_script;
use crate::shared::error::SyncError;
use crate::sync::timer::TimerHandle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// Timing thresholds for the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    pub quiet_period: Duration,
    pub max_pending: Duration,
    pub periodic_flush: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for BufferConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            quiet_period: config.quiet_period,
            max_pending: config.max_pending,
            periodic_flush: config.periodic_flush,
        }
    }
}

/// Key that produced a local change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Delete,
    Backspace,
    Other,
}

impl EditKey {
    /// Structural edits are propagated without waiting for a timer
    pub fn flushes_immediately(self) -> bool {
        matches!(self, Self::Enter | Self::Delete | Self::Backspace)
    }
}

/// Timer event delivered to the session loop.
///
/// Quiet-period and max-wait triggers carry the sequence number of the timer
/// that produced them so that a trigger from a timer that was reset in the
/// meantime is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    QuietPeriod(u64),
    MaxWait(u64),
    Periodic,
}

/// Why a flush was attempted, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    MaxWait,
    ImmediateKey,
    QuietPeriod,
    Periodic,
    Manual,
}

/// Result of a change or flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// A delta was handed to the sink
    Sent { ops: usize, version: u64 },
    /// The change was recorded and the quiet-period timer restarted
    Deferred,
    /// The sink is not open; pending text is kept
    Offline,
    /// Nothing differs from the last sent text
    NothingPending,
    /// A trigger from a timer that has since been reset or cancelled
    Ignored,
}

/// Destination of flushed deltas
pub trait DeltaSink {
    /// Whether sending is currently possible
    fn is_open(&self) -> bool;

    /// Hand one delta over for transmission
    fn send_delta(&mut self, delta: Delta) -> Result<(), SyncError>;
}

/// Pending-change buffer for one document session
#[derive(Debug)]
pub struct OperationBuffer {
    client_id: String,
    config: BufferConfig,
    /// Latest locally typed text
    current_text: String,
    /// Text as of the last delta handed to the sink
    last_sent_text: String,
    /// When the oldest unflushed change happened
    first_pending_at: Option<Instant>,
    triggers: UnboundedSender<FlushTrigger>,
    quiet_timer: Option<(u64, TimerHandle)>,
    max_wait_timer: Option<(u64, TimerHandle)>,
    periodic_timer: Option<TimerHandle>,
    next_timer_seq: u64,
}

impl OperationBuffer {
    /// Create an idle buffer; no timer runs until [`start`](Self::start)
    pub fn new(
        client_id: impl Into<String>,
        config: BufferConfig,
        triggers: UnboundedSender<FlushTrigger>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            config,
            current_text: String::new(),
            last_sent_text: String::new(),
            first_pending_at: None,
            triggers,
            quiet_timer: None,
            max_wait_timer: None,
            periodic_timer: None,
            next_timer_seq: 0,
        }
    }

    /// Start the periodic flush timer
    pub fn start(&mut self) {
        if self.periodic_timer.is_none() {
            self.periodic_timer = Some(TimerHandle::every(
                self.config.periodic_flush,
                self.triggers.clone(),
                FlushTrigger::Periodic,
            ));
        }
    }

    /// Cancel every timer. Pending text is kept but will not be flushed by a timer.
    pub fn stop(&mut self) {
        self.quiet_timer = None;
        self.max_wait_timer = None;
        self.periodic_timer = None;
    }

    pub fn is_running(&self) -> bool {
        self.periodic_timer.is_some()
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn last_sent_text(&self) -> &str {
        &self.last_sent_text
    }

    pub fn first_pending_at(&self) -> Option<Instant> {
        self.first_pending_at
    }

    /// Whether local text differs from what was last sent
    pub fn has_pending(&self) -> bool {
        self.current_text != self.last_sent_text
    }

    /// Adopt `text` as both the current and the last sent snapshot.
    ///
    /// Used when the server seeds the document, so the next delta is computed
    /// against the server's content.
    pub fn reset_baseline(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.current_text = text.clone();
        self.last_sent_text = text;
        self.clear_pending();
    }

    /// Record a local edit and flush if the policy says so.
    ///
    /// Precedence: max wait exceeded, then immediate key, else the quiet-period
    /// timer is restarted. At most one flush happens per call.
    pub fn on_local_change<S: DeltaSink>(
        &mut self,
        new_text: String,
        key: Option<EditKey>,
        version: u64,
        sink: &mut S,
    ) -> Result<FlushOutcome, SyncError> {
        self.current_text = new_text;

        let now = Instant::now();
        let first = *self.first_pending_at.get_or_insert(now);
        let waited = now.duration_since(first);

        if waited >= self.config.max_pending {
            tracing::debug!(waited_ms = waited.as_millis() as u64, "max wait exceeded");
            return self.flush_for(FlushReason::MaxWait, version, sink);
        }

        if key.is_some_and(EditKey::flushes_immediately) {
            return self.flush_for(FlushReason::ImmediateKey, version, sink);
        }

        if self.max_wait_timer.is_none() {
            let seq = self.next_seq();
            let timer = TimerHandle::after(
                self.config.max_pending - waited,
                self.triggers.clone(),
                FlushTrigger::MaxWait(seq),
            );
            self.max_wait_timer = Some((seq, timer));
        }

        let seq = self.next_seq();
        let timer = TimerHandle::after(
            self.config.quiet_period,
            self.triggers.clone(),
            FlushTrigger::QuietPeriod(seq),
        );
        // Replacing the handle drops, and so cancels, the previous quiet timer.
        self.quiet_timer = Some((seq, timer));

        Ok(FlushOutcome::Deferred)
    }

    /// Handle a trigger read from the timer channel
    pub fn on_timer<S: DeltaSink>(
        &mut self,
        trigger: FlushTrigger,
        version: u64,
        sink: &mut S,
    ) -> Result<FlushOutcome, SyncError> {
        match trigger {
            FlushTrigger::QuietPeriod(seq) => {
                if !matches!(self.quiet_timer, Some((current, _)) if current == seq) {
                    return Ok(FlushOutcome::Ignored);
                }
                self.quiet_timer = None;
                self.flush_for(FlushReason::QuietPeriod, version, sink)
            }
            FlushTrigger::MaxWait(seq) => {
                if !matches!(self.max_wait_timer, Some((current, _)) if current == seq) {
                    return Ok(FlushOutcome::Ignored);
                }
                self.max_wait_timer = None;
                self.flush_for(FlushReason::MaxWait, version, sink)
            }
            FlushTrigger::Periodic => {
                if self.periodic_timer.is_none() {
                    return Ok(FlushOutcome::Ignored);
                }
                self.flush_for(FlushReason::Periodic, version, sink)
            }
        }
    }

    /// Send everything typed since the last flush.
    ///
    /// No-op when the sink is closed or nothing is pending. Calling it twice
    /// without an intervening change sends nothing the second time.
    pub fn flush<S: DeltaSink>(
        &mut self,
        version: u64,
        sink: &mut S,
    ) -> Result<FlushOutcome, SyncError> {
        self.flush_for(FlushReason::Manual, version, sink)
    }

    fn flush_for<S: DeltaSink>(
        &mut self,
        reason: FlushReason,
        version: u64,
        sink: &mut S,
    ) -> Result<FlushOutcome, SyncError> {
        if !sink.is_open() {
            if self.has_pending() {
                tracing::debug!(?reason, "flush skipped, transport not open");
            }
            return Ok(FlushOutcome::Offline);
        }

        if !self.has_pending() {
            self.clear_pending();
            return Ok(FlushOutcome::NothingPending);
        }

        let ops = compute_edit_script(&self.last_sent_text, &self.current_text);
        let Some(delta) = Delta::new(self.client_id.clone(), version, ops) else {
            self.clear_pending();
            return Ok(FlushOutcome::NothingPending);
        };

        let count = delta.ops.len();
        sink.send_delta(delta)?;
        tracing::debug!(?reason, ops = count, version, "flushed pending changes");

        self.last_sent_text = self.current_text.clone();
        self.clear_pending();

        Ok(FlushOutcome::Sent {
            ops: count,
            version,
        })
    }

    fn clear_pending(&mut self) {
        self.first_pending_at = None;
        self.quiet_timer = None;
        self.max_wait_timer = None;
    }

    fn next_seq(&mut self) -> u64 {
        self.next_timer_seq += 1;
        self.next_timer_seq
    }
}
