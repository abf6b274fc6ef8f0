//! Runtime building blocks for the selection loader.
//!
//! This crate provides the pieces the loader is assembled from:
//!
//! - **Clocks**: wall-clock and virtual time sources
//! - **Scheduler**: one-shot delayed tasks with cancellable handles
//! - **Cancellation**: shared tokens checked by a task before it takes effect
//! - **Signals**: change notification for a presentation layer
//! - **Tokio integration** (feature `tokio`): a scheduler backed by a runtime
//!
//! # Scheduler Example
//!
//! ```
//! use std::time::Duration;
//! use lattice_selection_core::{ManualClock, Scheduler, SharedTaskScheduler};
//!
//! let scheduler = SharedTaskScheduler::new(ManualClock::new());
//! let mut handle = scheduler.schedule_after(Duration::from_secs(1), Box::new(|| {
//!     println!("never printed");
//! }));
//!
//! handle.cancel();
//! assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
//! ```

#[cfg(feature = "tokio")]
pub mod async_runtime;
mod cancel;
mod clock;
mod error;
pub mod logging;
mod scheduler;
pub mod signal;

#[cfg(feature = "tokio")]
pub use async_runtime::TokioScheduler;
pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, SchedulerError};
pub use scheduler::{
    BoxedTask, ScheduleHandle, ScheduledTaskId, Scheduler, SharedTaskScheduler, TaskScheduler,
};
pub use signal::{ConnectionId, Signal};

static_assertions::assert_impl_all!(SharedTaskScheduler<ManualClock>: Send, Sync, Clone);
static_assertions::assert_impl_all!(ScheduleHandle: Send);
static_assertions::assert_impl_all!(Signal<i64>: Send, Sync);
