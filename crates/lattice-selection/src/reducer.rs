//! The selection state machine as a pure transition function.
//!
//! [`LoaderState::reduce`] takes an action, mutates the state and returns the
//! [`Effect`] the runtime must carry out. It never touches a clock or a
//! scheduler, which makes every transition testable without time.
//!
//! ```text
//! Empty ──select(id)──▶ Loading(id) ──load completed──▶ Loaded(id, n)
//!   ▲                    │  ▲   │                         │    ▲
//!   │                    │  └───┘ select(id2)             │    │ detail action
//!   │                    │        (cancels prior load)    │    └─┘
//!   └────deselect────────┴────────────────────────────────┘
//!                        (commits n into the row when Loaded)
//! ```
//!
//! Every scheduled load carries a generation number. A completion whose
//! generation is not the pending one was superseded and changes nothing.

use crate::detail::{Detail, DetailAction};
use crate::logging::targets;
use crate::model::{LoadPhase, Row, RowId, Selection};
use crate::rows::RowCollection;

/// An input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderAction {
    /// The user picked a row.
    Select(RowId),
    /// The user navigated away from the detail.
    Deselect,
    /// The delayed load with this generation elapsed without cancellation.
    LoadCompleted { generation: u64 },
    /// An action for the active detail, forwarded from the child screen.
    Detail(DetailAction),
}

/// What the runtime must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Cancel the pending load, if any.
    CancelLoad,
    /// Cancel the pending load, if any, and schedule a new one.
    ScheduleLoad { generation: u64 },
}

/// Rows plus the optional selection slot.
#[derive(Debug, Clone, Default)]
pub struct LoaderState {
    rows: RowCollection,
    selection: Option<Selection>,
    generation: u64,
    pending: Option<u64>,
}

impl LoaderState {
    /// Start in the `Empty` phase over `rows`.
    pub fn new(rows: RowCollection) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &RowCollection {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut RowCollection {
        &mut self.rows
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn phase(&self) -> LoadPhase {
        LoadPhase::from(self.selection.as_ref())
    }

    /// Generation of the load still waiting to complete.
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending
    }

    /// The row a `Deselect` would write into right now, with the count it
    /// would write.
    pub fn pending_commit(&self) -> Option<Row> {
        let selection = self.selection.as_ref()?;
        let detail = selection.detail?;
        self.rows
            .contains(selection.id)
            .then(|| Row::with_id(selection.id, detail.count))
    }

    /// Apply one action.
    pub fn reduce(&mut self, action: LoaderAction) -> Effect {
        match action {
            LoaderAction::Select(id) => self.select(id),
            LoaderAction::Deselect => self.deselect(),
            LoaderAction::LoadCompleted { generation } => {
                self.load_completed(generation);
                Effect::None
            }
            LoaderAction::Detail(action) => {
                self.forward_to_detail(action);
                Effect::None
            }
        }
    }

    fn select(&mut self, id: RowId) -> Effect {
        if !self.rows.contains(id) {
            tracing::debug!(target: targets::REDUCER, %id, "selecting unknown row");
        }
        self.generation += 1;
        self.selection = Some(Selection::loading(id));
        self.pending = Some(self.generation);
        Effect::ScheduleLoad {
            generation: self.generation,
        }
    }

    fn deselect(&mut self) -> Effect {
        if let Some(Selection {
            id,
            detail: Some(detail),
        }) = self.selection.take()
        {
            if !self.rows.set_count(id, detail.count) {
                tracing::debug!(target: targets::REDUCER, %id, "selected row is gone, nothing to commit");
            }
        }

        match self.pending.take() {
            Some(_) => Effect::CancelLoad,
            None => Effect::None,
        }
    }

    fn load_completed(&mut self, generation: u64) {
        if self.pending != Some(generation) {
            tracing::trace!(
                target: targets::REDUCER,
                generation,
                pending = ?self.pending,
                "ignoring superseded load"
            );
            return;
        }
        self.pending = None;

        if let Some(selection) = self.selection.as_mut() {
            let count = self.rows.count_of(selection.id).unwrap_or(0);
            selection.detail = Some(Detail::new(count));
        }
    }

    /// Forward a child action into the active detail by key.
    fn forward_to_detail(&mut self, action: DetailAction) {
        match self.selection.as_mut() {
            Some(Selection {
                detail: Some(detail),
                ..
            }) => detail.reduce(action),
            _ => {
                tracing::trace!(target: targets::REDUCER, ?action, "no loaded detail, ignoring");
            }
        }
    }
}
