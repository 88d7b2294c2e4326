//! Identity-carrying record storage
//!
//! Every record gets a `RowId` when it is loaded. The id travels with the
//! record through filtering and sorting and is the only thing used to find
//! the authoritative row again when a shown cell is edited.

use crate::data::datavalue::DataValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A record is a mapping from column key to value
pub type Record = BTreeMap<String, DataValue>;

/// Stable identity of a loaded record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A record together with its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub record: Record,
}

impl Row {
    pub fn new(id: RowId, record: Record) -> Self {
        Self { id, record }
    }

    /// Get the value stored under `key`, if any
    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.record.get(key)
    }

    pub fn set(&mut self, key: &str, value: DataValue) {
        self.record.insert(key.to_string(), value);
    }
}

/// Ordered list of identity-carrying rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Build a dataset assigning identities 0, 1, 2, ... in input order
    pub fn from_records(records: Vec<Record>) -> Self {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Row::new(RowId(i as u64), record))
            .collect();
        Self { rows }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Identity of the row at `position`
    pub fn id_at(&self, position: usize) -> Option<RowId> {
        self.rows.get(position).map(|row| row.id)
    }

    /// Identities in current order
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|row| row.id).collect()
    }

    /// Find a row by identity
    pub fn find_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn find(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Write one cell of the row with the given identity
    ///
    /// Returns false when no row carries that identity.
    pub fn set_cell(&mut self, id: RowId, key: &str, value: DataValue) -> bool {
        match self.find_mut(id) {
            Some(row) => {
                row.set(key, value);
                true
            }
            None => false,
        }
    }

    /// Keep rows matching the predicate, preserving order and identity
    pub fn retain_matching<F>(&self, mut predicate: F) -> Dataset
    where
        F: FnMut(&Row) -> bool,
    {
        Dataset {
            rows: self.rows.iter().filter(|row| predicate(row)).cloned().collect(),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    /// Plain records without identities, in current order
    pub fn to_records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Build a record from `(key, value)` pairs
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<DataValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record([("n", 3)]),
            record([("n", 1)]),
            record([("n", 2)]),
        ])
    }

    #[test]
    fn test_identities_follow_input_order() {
        let data = sample();
        assert_eq!(data.ids(), vec![RowId(0), RowId(1), RowId(2)]);
    }

    #[test]
    fn test_retain_keeps_identity() {
        let data = sample();
        let kept = data.retain_matching(|row| row.get("n") != Some(&DataValue::Integer(1)));
        assert_eq!(kept.ids(), vec![RowId(0), RowId(2)]);
    }

    #[test]
    fn test_set_cell_by_identity() {
        let mut data = sample();
        assert!(data.set_cell(RowId(2), "n", DataValue::Integer(99)));
        assert_eq!(data.get(2).unwrap().get("n"), Some(&DataValue::Integer(99)));
        assert!(!data.set_cell(RowId(7), "n", DataValue::Integer(0)));
    }
}
