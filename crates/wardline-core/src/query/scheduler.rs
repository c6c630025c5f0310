// Cancelable one-shot timers
//
// The query controller schedules its debounced fetch through this trait so
// tests and embedders can drive time themselves.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Work to run once a timer elapses.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task after a delay unless the returned handle is cancelled first.
pub trait Scheduler: Send + Sync {
    fn schedule_after(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Handle to a pending timer. Dropping it cancels the timer.
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Wrap the token a scheduler watches for cancellation.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Prevent the task from running. A no-op if it already ran.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Timers backed by `tokio::time`. Must be used inside a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => {}
                () = tokio::time::sleep(delay) => task(),
            }
        });
        TimerHandle::new(token)
    }
}
