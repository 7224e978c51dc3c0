//! # Cancelable Timers
//!
//! Timers are spawned tasks that deliver a value on a channel when they fire.
//! The owner keeps the [`TimerHandle`]; dropping it aborts the task, so a timer
//! can never fire after its owner has gone away.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owned handle to a running timer task
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Send `value` on `tx` once, after `delay`
    pub fn after<T>(delay: Duration, tx: UnboundedSender<T>, value: T) -> Self
    where
        T: Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value);
        });
        Self { task }
    }

    /// Send `value` on `tx` every `period`, first tick one period from now
    pub fn every<T>(period: Duration, tx: UnboundedSender<T>, value: T) -> Self
    where
        T: Clone + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(value.clone()).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }

    /// Stop the timer; equivalent to dropping the handle
    pub fn cancel(self) {}

    /// Whether the task has run to completion (or was aborted)
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let _timer = TimerHandle::after(Duration::from_millis(800), tx, "quiet");

        assert_eq!(rx.recv().await, Some("quiet"));
        assert_eq!(start.elapsed(), Duration::from_millis(800));
        // Sender moved into the finished task, so the channel closes.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_repeats() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let _timer = TimerHandle::every(Duration::from_millis(1000), tx, 7u8);

        for n in 1..=3 {
            assert_eq!(rx.recv().await, Some(7));
            assert_eq!(start.elapsed(), Duration::from_millis(1000 * n));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let timer = TimerHandle::after(Duration::from_millis(100), tx, 1);
        timer.cancel();

        // The aborted task drops its sender without sending.
        assert_eq!(rx.recv().await, None);
    }
}
