//! Data model shared by the row collection, the reducer and the loader.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::detail::Detail;

/// A stable, opaque identifier for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

/// Global counter for generating unique row IDs.
static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(1);

impl RowId {
    /// Allocate a fresh identifier, unique within the process.
    pub fn next() -> Self {
        RowId(NEXT_ROW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an identifier that was allocated elsewhere.
    pub const fn from_raw(raw: u64) -> Self {
        RowId(raw)
    }

    /// Get the raw u64 value of this row ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// A list element with a stable identity and a mutable count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    pub count: i64,
}

impl Row {
    /// Create a row with a freshly allocated id.
    pub fn new(count: i64) -> Self {
        Self {
            id: RowId::next(),
            count,
        }
    }

    /// Create a row with a known id.
    pub fn with_id(id: RowId, count: i64) -> Self {
        Self { id, count }
    }
}

/// The currently chosen row plus its detail once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: RowId,
    pub detail: Option<Detail>,
}

impl Selection {
    /// A selection whose detail has not loaded yet.
    pub fn loading(id: RowId) -> Self {
        Self { id, detail: None }
    }
}

/// What the presentation layer needs to decide between a placeholder and the
/// detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing selected.
    #[default]
    Empty,
    /// A row is selected and its detail is still loading.
    Loading(RowId),
    /// A row is selected and its detail holds `count`.
    Loaded(RowId, i64),
}

impl LoadPhase {
    /// The selected row, if any.
    pub fn selected(self) -> Option<RowId> {
        match self {
            LoadPhase::Empty => None,
            LoadPhase::Loading(id) | LoadPhase::Loaded(id, _) => Some(id),
        }
    }

    pub fn is_loading(self) -> bool {
        matches!(self, LoadPhase::Loading(_))
    }
}

impl From<Option<&Selection>> for LoadPhase {
    fn from(selection: Option<&Selection>) -> Self {
        match selection {
            None => LoadPhase::Empty,
            Some(Selection { id, detail: None }) => LoadPhase::Loading(*id),
            Some(Selection {
                id,
                detail: Some(detail),
            }) => LoadPhase::Loaded(*id, detail.count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_ids_are_unique() {
        let a = Row::new(1);
        let b = Row::new(1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_phase_from_selection() {
        let id = RowId::from_raw(7);
        assert_eq!(LoadPhase::from(None::<&Selection>), LoadPhase::Empty);
        assert_eq!(
            LoadPhase::from(Some(&Selection::loading(id))),
            LoadPhase::Loading(id)
        );

        let loaded = Selection {
            id,
            detail: Some(Detail::new(3)),
        };
        assert_eq!(LoadPhase::from(Some(&loaded)), LoadPhase::Loaded(id, 3));
        assert_eq!(LoadPhase::Loaded(id, 3).selected(), Some(id));
        assert!(!LoadPhase::Loaded(id, 3).is_loading());
    }

    #[test]
    fn test_display() {
        assert_eq!(RowId::from_raw(12).to_string(), "row#12");
    }
}
