//! Delayed task scheduling with cancellable handles.
//!
//! [`TaskScheduler`] keeps a min-heap of one-shot tasks keyed by the instant
//! they become ready. It reads time from a [`Clock`], so the same scheduler
//! runs against the wall clock in an application and against a
//! [`ManualClock`] in tests. Nothing runs on its own: the host pumps
//! [`SharedTaskScheduler::process_ready`] from its event loop, or a test calls
//! [`SharedTaskScheduler::advance`].
//!
//! The [`Scheduler`] trait is the seam the selection loader depends on. It
//! returns a [`ScheduleHandle`] whose cancellation both flips the task's
//! [`CancellationToken`] and drops the queued entry.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lattice_selection_core::{ManualClock, Scheduler, SharedTaskScheduler};
//!
//! let scheduler = SharedTaskScheduler::new(ManualClock::new());
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = fired.clone();
//!
//! let _handle = scheduler.schedule_after(
//!     Duration::from_secs(1),
//!     Box::new(move || flag.store(true, Ordering::SeqCst)),
//! );
//!
//! scheduler.advance(Duration::from_millis(999));
//! assert!(!fired.load(Ordering::SeqCst));
//! scheduler.advance(Duration::from_millis(1));
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::cancel::CancellationToken;
use crate::clock::{Clock, ManualClock, SystemClock};
use crate::error::{Result, SchedulerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a scheduled task.
    pub struct ScheduledTaskId;
}

/// A boxed task closure.
pub type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a task once after a delay.
pub trait Scheduler: Send + Sync + 'static {
    /// Queue `task` to run once `delay` has elapsed.
    ///
    /// The task is skipped if the returned handle is cancelled first.
    fn schedule_after(&self, delay: Duration, task: BoxedTask) -> ScheduleHandle;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule_after(&self, delay: Duration, task: BoxedTask) -> ScheduleHandle {
        (**self).schedule_after(delay, task)
    }
}

/// A handle to a pending delayed task.
///
/// Dropping the handle does not cancel the task; call [`cancel`](Self::cancel).
pub struct ScheduleHandle {
    token: CancellationToken,
    on_cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl ScheduleHandle {
    /// Create a handle that only flips `token` when cancelled.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            on_cancel: None,
        }
    }

    /// Create a handle that also runs `on_cancel` when cancelled, e.g. to
    /// remove the entry from a queue or abort a spawned task.
    pub fn with_canceller<F>(token: CancellationToken, on_cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            token,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// The token the task checks before running.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Check if the handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the task. Safe to call more than once and after the task ran.
    pub fn cancel(&mut self) {
        self.token.cancel();
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

impl fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

struct ScheduledTaskData {
    run_at: Instant,
    task: BoxedTask,
}

/// An entry in the scheduler queue (min-heap by run time, FIFO on ties).
#[derive(Debug, Clone, Copy)]
struct SchedulerQueueEntry {
    id: ScheduledTaskId,
    run_time: Instant,
    seq: u64,
}

impl PartialEq for SchedulerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_time == other.run_time && self.seq == other.seq
    }
}

impl Eq for SchedulerQueueEntry {}

impl PartialOrd for SchedulerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchedulerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .run_time
            .cmp(&self.run_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manages one-shot delayed tasks against a clock.
pub struct TaskScheduler<C: Clock = SystemClock> {
    clock: C,
    tasks: SlotMap<ScheduledTaskId, ScheduledTaskData>,
    queue: BinaryHeap<SchedulerQueueEntry>,
    next_seq: u64,
}

impl<C: Clock> TaskScheduler<C> {
    /// Create a new task scheduler reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tasks: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// The clock this scheduler reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Schedule a one-shot task to execute after the specified delay.
    pub fn schedule_once<F>(&mut self, delay: Duration, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let run_at = self.clock.now() + delay;
        self.schedule_at(run_at, task)
    }

    /// Schedule a task to execute at a specific instant.
    ///
    /// If the instant is in the past, the task runs on the next processing
    /// cycle.
    pub fn schedule_at<F>(&mut self, instant: Instant, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.tasks.insert(ScheduledTaskData {
            run_at: instant,
            task: Box::new(task),
        });
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(SchedulerQueueEntry {
            id,
            run_time: instant,
            seq,
        });
        tracing::trace!(target: targets::SCHEDULER, ?id, "task scheduled");
        id
    }

    /// Cancel and remove a scheduled task.
    ///
    /// Returns an error if the task already ran or was already cancelled.
    pub fn cancel(&mut self, id: ScheduledTaskId) -> Result<()> {
        if self.tasks.remove(id).is_some() {
            tracing::trace!(target: targets::SCHEDULER, ?id, "task cancelled");
            Ok(())
        } else {
            Err(SchedulerError::InvalidTaskId)
        }
    }

    /// Check if a scheduled task is still pending.
    pub fn is_active(&self, id: ScheduledTaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Get the number of pending tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    fn prune_front(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.tasks.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }

    /// Get the duration until the next task should execute, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.prune_front();
        let now = self.clock.now();
        self.queue
            .peek()
            .map(|entry| entry.run_time.saturating_duration_since(now))
    }

    /// Check if there are any tasks ready to execute now.
    pub fn has_ready(&mut self) -> bool {
        self.prune_front();
        let now = self.clock.now();
        self.queue.peek().is_some_and(|entry| entry.run_time <= now)
    }

    /// Remove every task that is due and hand them back in run order.
    ///
    /// The caller runs them, typically after releasing any lock around the
    /// scheduler.
    pub fn take_ready(&mut self) -> Vec<BoxedTask> {
        let now = self.clock.now();
        let mut ready = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.run_time > now {
                break;
            }
            let Some(entry) = self.queue.pop() else {
                break;
            };
            let Some(data) = self.tasks.remove(entry.id) else {
                continue;
            };
            debug_assert_eq!(data.run_at, entry.run_time);
            ready.push(data.task);
        }

        ready
    }

    /// Run every task that is due.
    ///
    /// Returns the number of tasks that were executed.
    #[tracing::instrument(skip(self), target = "lattice_selection_core::scheduler", level = "trace")]
    pub fn process_ready(&mut self) -> usize {
        let ready = self.take_ready();
        let count = ready.len();
        for task in ready {
            task();
        }
        count
    }
}

impl Default for TaskScheduler<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

/// A thread-safe, cloneable wrapper around [`TaskScheduler`].
///
/// Due tasks run after the internal lock is released, so a task may schedule
/// or cancel further tasks.
pub struct SharedTaskScheduler<C: Clock = SystemClock> {
    inner: Arc<Mutex<TaskScheduler<C>>>,
}

impl<C: Clock> Clone for SharedTaskScheduler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Clock> SharedTaskScheduler<C> {
    /// Create a shared scheduler reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TaskScheduler::new(clock))),
        }
    }

    pub fn schedule_once<F>(&self, delay: Duration, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.lock().schedule_once(delay, task)
    }

    pub fn cancel(&self, id: ScheduledTaskId) -> Result<()> {
        self.inner.lock().cancel(id)
    }

    pub fn is_active(&self, id: ScheduledTaskId) -> bool {
        self.inner.lock().is_active(id)
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.inner.lock().time_until_next()
    }

    pub fn has_ready(&self) -> bool {
        self.inner.lock().has_ready()
    }

    /// Run every task that is due, including tasks that become due because
    /// an earlier task scheduled them with a zero delay.
    pub fn process_ready(&self) -> usize {
        let mut executed = 0;
        loop {
            let ready = self.inner.lock().take_ready();
            if ready.is_empty() {
                return executed;
            }
            executed += ready.len();
            for task in ready {
                task();
            }
        }
    }
}

impl SharedTaskScheduler<ManualClock> {
    /// Advance the virtual clock and run whatever became due.
    ///
    /// Returns the number of tasks that were executed.
    pub fn advance(&self, by: Duration) -> usize {
        self.inner.lock().clock().advance(by);
        self.process_ready()
    }
}

impl Default for SharedTaskScheduler<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Scheduler for SharedTaskScheduler<C> {
    fn schedule_after(&self, delay: Duration, task: BoxedTask) -> ScheduleHandle {
        let token = CancellationToken::new();
        let guard = token.clone();
        let id = self.schedule_once(delay, move || {
            if guard.is_cancelled() {
                tracing::trace!(target: targets::SCHEDULER, "skipping cancelled task");
                return;
            }
            task();
        });

        let queue: Weak<Mutex<TaskScheduler<C>>> = Arc::downgrade(&self.inner);
        ScheduleHandle::with_canceller(token, move || {
            if let Some(queue) = queue.upgrade() {
                // Already ran or already removed: nothing left to drop.
                let _ = queue.lock().cancel(id);
            }
        })
    }
}
