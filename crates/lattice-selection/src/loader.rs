//! The selection loader: the reducer wired to a scheduler.
//!
//! A [`SelectionLoader`] owns a [`LoaderState`] behind a single mutex together
//! with the handle of the one pending load. Every public operation becomes a
//! [`LoaderAction`]; the resulting [`Effect`] is carried out while the lock is
//! still held, so cancelling a superseded load and recording the new one
//! happen atomically with the state change. The delayed task takes the same
//! lock and checks its token and generation before it completes, so a
//! cancelled load can never mutate state.
//!
//! Signals are emitted after the lock is released. Notifications are queued
//! under the lock in transition order and delivered by whichever call finds
//! the queue idle, so observers see phases in the order they happened even
//! when a slot calls back into the loader or two threads race. A call made
//! from inside a slot returns before its own notifications are delivered.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use lattice_selection::{LoadPhase, RowCollection, SelectionLoader};
//! use lattice_selection_core::{ManualClock, SharedTaskScheduler};
//!
//! let scheduler = SharedTaskScheduler::new(ManualClock::new());
//! let mut rows = RowCollection::new();
//! let a = rows.push(1);
//!
//! let loader = SelectionLoader::new(rows, scheduler.clone(), Duration::from_secs(1));
//! loader.select(a);
//! assert_eq!(loader.phase(), LoadPhase::Loading(a));
//!
//! scheduler.advance(Duration::from_secs(1));
//! assert_eq!(loader.phase(), LoadPhase::Loaded(a, 1));
//!
//! loader.detail_updated(99);
//! loader.deselect();
//! assert_eq!(loader.row(a).map(|row| row.count), Some(99));
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use lattice_selection_core::{ScheduleHandle, Scheduler, Signal};
use parking_lot::Mutex;

use crate::config::LoaderConfig;
use crate::detail::DetailAction;
use crate::error::ConfigResult;
use crate::logging::targets;
use crate::model::{LoadPhase, Row, RowId, Selection};
use crate::reducer::{Effect, LoaderAction, LoaderState};
use crate::rows::RowCollection;

/// A signal emission recorded under the lock, delivered after it.
#[derive(Debug, Clone, Copy)]
enum Notification {
    Phase(LoadPhase),
    Committed(RowId, i64),
}

/// Everything the single state lock guards.
struct Guarded {
    state: LoaderState,
    pending: Option<ScheduleHandle>,
    notifications: VecDeque<Notification>,
    draining: bool,
}

impl Guarded {
    fn record(&mut self, before: LoadPhase, committed: Option<Row>) {
        let after = self.state.phase();
        if before != after {
            tracing::debug!(target: targets::LOADER, ?before, ?after, "phase changed");
            self.notifications.push_back(Notification::Phase(after));
        }
        if let Some(row) = committed {
            tracing::debug!(target: targets::LOADER, id = %row.id, count = row.count, "committed detail to row");
            self.notifications
                .push_back(Notification::Committed(row.id, row.count));
        }
    }
}

struct Inner<S> {
    guarded: Mutex<Guarded>,
    scheduler: S,
    delay: Duration,
    phase_changed: Signal<LoadPhase>,
    row_committed: Signal<(RowId, i64)>,
}

/// Owns rows and the optional selection; loads detail after a delay.
///
/// Cloning is cheap and every clone drives the same state.
pub struct SelectionLoader<S: Scheduler> {
    inner: Arc<Inner<S>>,
}

impl<S: Scheduler> Clone for SelectionLoader<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Scheduler> SelectionLoader<S> {
    /// Create a loader over `rows` that waits `delay` before each load.
    ///
    /// The scheduler must not run a task synchronously from inside
    /// `schedule_after`; the loader holds its state lock while scheduling.
    pub fn new(rows: RowCollection, scheduler: S, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                guarded: Mutex::new(Guarded {
                    state: LoaderState::new(rows),
                    pending: None,
                    notifications: VecDeque::new(),
                    draining: false,
                }),
                scheduler,
                delay,
                phase_changed: Signal::new(),
                row_committed: Signal::new(),
            }),
        }
    }

    /// Create a loader seeded and timed from `config`.
    pub fn from_config(config: &LoaderConfig, scheduler: S) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::new(config.seed_rows(), scheduler, config.load_delay()))
    }

    /// Select a row and start loading its detail.
    ///
    /// Any load still pending for an earlier selection is cancelled first.
    /// An id that matches no row is accepted; its detail loads with count 0.
    #[tracing::instrument(skip(self), target = "lattice_selection::loader", level = "trace")]
    pub fn select(&self, id: RowId) {
        self.dispatch(LoaderAction::Select(id));
    }

    /// Leave the detail, committing its count into the row if it had loaded.
    #[tracing::instrument(skip(self), target = "lattice_selection::loader", level = "trace")]
    pub fn deselect(&self) {
        self.dispatch(LoaderAction::Deselect);
    }

    /// Set the loaded detail's count. Ignored unless a detail is loaded.
    pub fn detail_updated(&self, count: i64) {
        self.send_detail(DetailAction::Set(count));
    }

    /// Forward an action from the detail screen into the active detail.
    pub fn send_detail(&self, action: DetailAction) {
        self.dispatch(LoaderAction::Detail(action));
    }

    pub fn phase(&self) -> LoadPhase {
        self.inner.guarded.lock().state.phase()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.inner.guarded.lock().state.selection().copied()
    }

    /// A snapshot of the rows in display order.
    pub fn rows(&self) -> Vec<Row> {
        self.inner.guarded.lock().state.rows().to_vec()
    }

    pub fn row(&self, id: RowId) -> Option<Row> {
        self.inner.guarded.lock().state.rows().get(id).copied()
    }

    /// Append a row and return its id.
    pub fn add_row(&self, count: i64) -> RowId {
        self.inner.guarded.lock().state.rows_mut().push(count)
    }

    /// Remove a row. A selection pointing at it goes stale: its load yields
    /// count 0 and its deselect commits nothing.
    pub fn remove_row(&self, id: RowId) -> Option<Row> {
        self.inner.guarded.lock().state.rows_mut().remove(id)
    }

    /// Whether a delayed load is waiting to complete.
    pub fn has_pending_load(&self) -> bool {
        self.inner.guarded.lock().pending.is_some()
    }

    pub fn load_delay(&self) -> Duration {
        self.inner.delay
    }

    /// Emitted with the new phase after every transition that changes it.
    pub fn phase_changed(&self) -> &Signal<LoadPhase> {
        &self.inner.phase_changed
    }

    /// Emitted with `(row, count)` when a deselect writes a count back.
    pub fn row_committed(&self) -> &Signal<(RowId, i64)> {
        &self.inner.row_committed
    }

    /// Read the full state under the lock.
    ///
    /// `f` runs with the state lock held; calling back into the loader from
    /// it deadlocks.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&LoaderState) -> R,
    {
        f(&self.inner.guarded.lock().state)
    }

    fn dispatch(&self, action: LoaderAction) {
        Self::dispatch_inner(&self.inner, action);
    }

    fn dispatch_inner(inner: &Arc<Inner<S>>, action: LoaderAction) {
        {
            let mut guarded = inner.guarded.lock();
            let before = guarded.state.phase();
            let committed = match action {
                LoaderAction::Deselect => guarded.state.pending_commit(),
                _ => None,
            };

            let effect = guarded.state.reduce(action);
            Self::apply_effect(inner, &mut guarded, effect);
            guarded.record(before, committed);
        }

        Self::drain(inner);
    }

    /// Deliver queued notifications in order, unless another call already is.
    fn drain(inner: &Inner<S>) {
        {
            let mut guarded = inner.guarded.lock();
            if guarded.draining {
                return;
            }
            guarded.draining = true;
        }
        let _reset = DrainReset(&inner.guarded);

        loop {
            let next = {
                let mut guarded = inner.guarded.lock();
                match guarded.notifications.pop_front() {
                    Some(notification) => notification,
                    None => {
                        guarded.draining = false;
                        return;
                    }
                }
            };

            match next {
                Notification::Phase(phase) => inner.phase_changed.emit(phase),
                Notification::Committed(id, count) => inner.row_committed.emit((id, count)),
            }
        }
    }

    fn apply_effect(inner: &Arc<Inner<S>>, guarded: &mut Guarded, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::CancelLoad => {
                if let Some(mut handle) = guarded.pending.take() {
                    handle.cancel();
                    tracing::trace!(target: targets::LOADER, "pending load cancelled");
                }
            }
            Effect::ScheduleLoad { generation } => {
                if let Some(mut handle) = guarded.pending.take() {
                    handle.cancel();
                    tracing::trace!(target: targets::LOADER, "superseded load cancelled");
                }

                let weak = Arc::downgrade(inner);
                let handle = inner.scheduler.schedule_after(
                    inner.delay,
                    Box::new(move || Self::on_load_elapsed(weak, generation)),
                );
                guarded.pending = Some(handle);
                tracing::trace!(target: targets::LOADER, generation, delay = ?inner.delay, "load scheduled");
            }
        }
    }

    /// Runs on whatever thread the scheduler fires on.
    fn on_load_elapsed(inner: Weak<Inner<S>>, generation: u64) {
        let Some(inner) = inner.upgrade() else {
            return;
        };

        {
            let mut guarded = inner.guarded.lock();
            let live = guarded
                .pending
                .as_ref()
                .is_some_and(|handle| !handle.is_cancelled());
            if !live || guarded.state.pending_generation() != Some(generation) {
                tracing::trace!(target: targets::LOADER, generation, "dropping stale load completion");
                return;
            }
            guarded.pending = None;

            let before = guarded.state.phase();
            let effect = guarded.state.reduce(LoaderAction::LoadCompleted { generation });
            debug_assert_eq!(effect, Effect::None);
            guarded.record(before, None);
        }

        Self::drain(&inner);
    }
}

/// Clears the draining flag if a slot panics mid-delivery.
struct DrainReset<'a>(&'a Mutex<Guarded>);

impl Drop for DrainReset<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}
