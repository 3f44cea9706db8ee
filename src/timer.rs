//! Inactivity timer: a pure elapsed-time tracker plus the task that ticks it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

/// Result of applying a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCheck {
    /// Timer not running.
    Idle,
    /// Less than one tick since the last reset; the tick raced a reset.
    Stale,
    /// Still within the threshold.
    Remaining(Duration),
    /// Threshold reached.
    Expired,
}

/// Tracks inactivity since the last reset.
#[derive(Debug, Clone)]
pub struct InactivityTimer {
    tick: Duration,
    limit: Duration,
    last_reset: Option<Instant>,
}

impl InactivityTimer {
    pub fn new(tick: Duration, limit: Duration) -> Self {
        Self {
            tick,
            limit,
            last_reset: None,
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn is_running(&self) -> bool {
        self.last_reset.is_some()
    }

    /// Start counting from zero at `now`. Also used to reset.
    pub fn reset(&mut self, now: Instant) {
        self.last_reset = Some(now);
    }

    pub fn stop(&mut self) {
        self.last_reset = None;
    }

    /// Inactivity accumulated as of `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.last_reset
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default()
    }

    /// Apply a tick observed at `now`.
    pub fn check(&self, now: Instant) -> TimerCheck {
        if !self.is_running() {
            return TimerCheck::Idle;
        }
        let elapsed = self.elapsed(now);
        if elapsed < self.tick {
            TimerCheck::Stale
        } else if elapsed >= self.limit {
            TimerCheck::Expired
        } else {
            TimerCheck::Remaining(self.limit - elapsed)
        }
    }
}

/// Whole seconds left, rounded to nearest.
pub fn whole_seconds(d: Duration) -> u64 {
    (d.as_millis() as u64 + 500) / 1000
}

/// Handle to a running tick task.
#[derive(Debug)]
pub struct TimerDriver {
    task: JoinHandle<()>,
    reset: Arc<Notify>,
}

impl TimerDriver {
    /// Spawn a task that calls `on_tick` every `tick` until it returns `false`.
    /// A reset restarts the current interval.
    pub fn spawn<F, Fut>(tick: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let reset = Arc::new(Notify::new());
        let signal = Arc::clone(&reset);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sleep(tick) => {
                        if !on_tick().await {
                            break;
                        }
                    }
                    _ = signal.notified() => continue,
                }
            }
        });
        Self { task, reset }
    }

    /// Restart the current interval.
    pub fn restart(&self) {
        self.reset.notify_one();
    }

    /// Abort the task. Never call this from inside `on_tick`; return `false`
    /// there instead.
    pub fn stop(self) {
        self.task.abort();
    }
}
