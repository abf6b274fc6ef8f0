//! Tokio-backed scheduler.
//!
//! This module requires the `tokio` feature:
//!
//! ```toml
//! [dependencies]
//! lattice-selection-core = { version = "0.1", features = ["tokio"] }
//! ```
//!
//! Each delayed task is a spawned future that sleeps and then runs the task
//! unless its token was cancelled in the meantime. Cancelling the handle also
//! aborts the sleeping future. Under `tokio::time::pause` the delay is
//! virtual, which is how the tests drive it.

use std::time::Duration;

use tokio::runtime::Handle;

use crate::cancel::CancellationToken;
use crate::logging::targets;
use crate::scheduler::{BoxedTask, ScheduleHandle, Scheduler};

/// A [`Scheduler`] that runs delayed tasks on a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler that spawns onto `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime the caller is running inside.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: BoxedTask) -> ScheduleHandle {
        let token = CancellationToken::new();
        let guard = token.clone();

        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if guard.is_cancelled() {
                tracing::trace!(target: targets::ASYNC, "delayed task cancelled while sleeping");
                return;
            }
            task();
        });
        let abort = join.abort_handle();

        ScheduleHandle::with_canceller(token, move || abort.abort())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_after_delay() {
        let scheduler = TokioScheduler::current();
        let executed = Arc::new(AtomicUsize::new(0));
        let executed_clone = executed.clone();

        let _handle = scheduler.schedule_after(
            Duration::from_secs(1),
            Box::new(move || {
                executed_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(executed.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(executed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let scheduler = TokioScheduler::current();
        let executed = Arc::new(AtomicUsize::new(0));
        let executed_clone = executed.clone();

        let mut handle = scheduler.schedule_after(
            Duration::from_secs(1),
            Box::new(move || {
                executed_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(executed.load(Ordering::SeqCst), 0);
    }
}
