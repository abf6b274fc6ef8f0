//! The ordered row collection.

use crate::error::{RowError, RowResult};
use crate::logging::targets;
use crate::model::{Row, RowId};

/// An ordered list of rows with unique ids.
///
/// Order is display order only. Lookups are linear; the lists this backs are
/// screen-sized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCollection {
    rows: Vec<Row>,
}

impl RowCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection with one fresh row per count, in order.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut collection = Self::new();
        for count in counts {
            collection.push(count);
        }
        collection
    }

    /// Append a row with a fresh id and return the id.
    ///
    /// Ids already taken by [`insert`](Self::insert)ed rows are skipped.
    pub fn push(&mut self, count: i64) -> RowId {
        let mut id = RowId::next();
        while self.contains(id) {
            id = RowId::next();
        }
        self.rows.push(Row::with_id(id, count));
        id
    }

    /// Append a row with a caller-chosen id.
    pub fn insert(&mut self, row: Row) -> RowResult<()> {
        if self.contains(row.id) {
            return Err(RowError::DuplicateId(row.id));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Remove a row, returning it if it was present.
    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        let pos = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(pos))
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.get(id).is_some()
    }

    /// The count of a row, if it exists.
    pub fn count_of(&self, id: RowId) -> Option<i64> {
        self.get(id).map(|row| row.count)
    }

    /// Overwrite a row's count. Returns `false` if the row does not exist.
    pub fn set_count(&mut self, id: RowId, count: i64) -> bool {
        match self.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.count = count;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A snapshot of the rows in display order.
    pub fn to_vec(&self) -> Vec<Row> {
        self.rows.clone()
    }
}

impl FromIterator<Row> for RowCollection {
    /// Collect rows, keeping the first of any duplicated id.
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        let mut collection = RowCollection::new();
        for row in iter {
            if let Err(err) = collection.insert(row) {
                tracing::debug!(target: targets::ROWS, count = row.count, %err, "dropping row");
            }
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_keeps_order() {
        let rows = RowCollection::from_counts([1, 42, 100]);
        let counts: Vec<i64> = rows.iter().map(|row| row.count).collect();
        assert_eq!(counts, vec![1, 42, 100]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut rows = RowCollection::new();
        let row = Row::with_id(RowId::from_raw(10_001), 5);
        rows.insert(row).unwrap();

        let err = rows.insert(Row::with_id(row.id, 6)).unwrap_err();
        assert_eq!(err, RowError::DuplicateId(row.id));
        assert_eq!(rows.count_of(row.id), Some(5));
    }

    #[test]
    fn test_set_count_and_remove() {
        let mut rows = RowCollection::new();
        let a = rows.push(1);
        let b = rows.push(2);

        assert!(rows.set_count(a, 9));
        assert_eq!(rows.count_of(a), Some(9));

        assert_eq!(rows.remove(a).map(|row| row.count), Some(9));
        assert!(!rows.set_count(a, 3));
        assert_eq!(rows.count_of(a), None);
        assert!(rows.contains(b));
    }

    #[test]
    fn test_push_skips_inserted_ids() {
        let mut rows = RowCollection::new();
        let first = rows.push(0);
        let taken: Vec<RowId> = (1..=16)
            .map(|offset| RowId::from_raw(first.as_u64() + offset))
            .collect();
        for (count, id) in taken.iter().enumerate() {
            rows.insert(Row::with_id(*id, count as i64)).unwrap();
        }

        let pushed = rows.push(7);
        assert!(!taken.contains(&pushed));
        assert_eq!(rows.count_of(pushed), Some(7));
        assert_eq!(rows.count_of(taken[0]), Some(0));

        let mut ids: Vec<RowId> = rows.iter().map(|row| row.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rows.len());
    }

    #[test]
    fn test_collect_skips_duplicates() {
        let id = RowId::from_raw(10_002);
        let rows: RowCollection = [Row::with_id(id, 1), Row::with_id(id, 2), Row::new(3)]
            .into_iter()
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.count_of(id), Some(1));
    }
}
