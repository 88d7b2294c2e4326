//! Header-driven sorting
//!
//! At most one column is sorted at a time. Activating a column's sort
//! control cycles it through unsorted -> ascending -> descending -> unsorted;
//! activating another column resets the previous one first. Unsorted means
//! original row order, restored from row identities.

use crate::column::Column;
use crate::data::{compare_datavalues, DataValue, Dataset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Sorting status of a column header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortStatus {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

/// Sort order shown by a header indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortStatus {
    /// Next status in the header cycle
    pub fn next(self) -> Self {
        match self {
            SortStatus::Unsorted => SortStatus::Ascending,
            SortStatus::Ascending => SortStatus::Descending,
            SortStatus::Descending => SortStatus::Unsorted,
        }
    }

    /// Header indicator, `None` hides it
    pub fn indicator(self) -> Option<SortOrder> {
        match self {
            SortStatus::Unsorted => None,
            SortStatus::Ascending => Some(SortOrder::Ascending),
            SortStatus::Descending => Some(SortOrder::Descending),
        }
    }
}

impl fmt::Display for SortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortStatus::Unsorted => write!(f, "unsorted"),
            SortStatus::Ascending => write!(f, "ascending"),
            SortStatus::Descending => write!(f, "descending"),
        }
    }
}

type LessThanFn = dyn Fn(&DataValue, &DataValue) -> bool + Send + Sync;

/// Host-supplied less-than used instead of natural ordering
#[derive(Clone)]
pub struct Comparator(Arc<LessThanFn>);

impl Comparator {
    pub fn new<F>(less_than: F) -> Self
    where
        F: Fn(&DataValue, &DataValue) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(less_than))
    }

    pub fn less_than(&self, a: &DataValue, b: &DataValue) -> bool {
        (self.0)(a, b)
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparator(..)")
    }
}

/// Cell value whose ordering delegates to a custom less-than
pub struct SortProxy<'a> {
    pub value: &'a DataValue,
    lt: &'a Comparator,
}

impl<'a> SortProxy<'a> {
    pub fn new(value: &'a DataValue, lt: &'a Comparator) -> Self {
        Self { value, lt }
    }
}

impl PartialEq for SortProxy<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortProxy<'_> {}

impl PartialOrd for SortProxy<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortProxy<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.lt.less_than(self.value, other.value) {
            Ordering::Less
        } else if self.lt.less_than(other.value, self.value) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Which column is sorted, and how
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<String>,
    status: SortStatus,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `key` one step through the cycle, resetting any other column
    pub fn advance(&mut self, key: &str) -> SortStatus {
        if self.active.as_deref() != Some(key) {
            if let Some(previous) = &self.active {
                debug!(target: "sort", "resetting sort on '{}'", previous);
            }
            self.active = Some(key.to_string());
            self.status = SortStatus::Unsorted;
        }
        self.status = self.status.next();
        self.status
    }

    /// Put `key` directly into `status`
    pub fn set(&mut self, key: &str, status: SortStatus) {
        self.active = Some(key.to_string());
        self.status = status;
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.status = SortStatus::Unsorted;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn status(&self) -> SortStatus {
        self.status
    }

    /// Status of any column; all but the active one are unsorted
    pub fn status_of(&self, key: &str) -> SortStatus {
        if self.active.as_deref() == Some(key) {
            self.status
        } else {
            SortStatus::Unsorted
        }
    }
}

/// Ordering of two cells under a column's sort rules
pub fn compare_cells(column: &Column, a: &DataValue, b: &DataValue) -> Ordering {
    match &column.sort_lt {
        Some(lt) => SortProxy::new(a, lt).cmp(&SortProxy::new(b, lt)),
        None => compare_datavalues(a, b),
    }
}

fn is_nan(value: &DataValue) -> bool {
    matches!(value, DataValue::Float(f) if f.is_nan())
}

/// Stable sort of `data` by `column` in `status`
///
/// `Unsorted` (or no column) restores identity order. Ties keep their
/// relative order in both directions. The input is left untouched.
pub fn sort_dataset(data: &Dataset, column: Option<&Column>, status: SortStatus) -> Dataset {
    let mut sorted = data.clone();
    let rows = sorted.rows_mut();

    match (column, status) {
        (Some(column), SortStatus::Ascending) => {
            rows.sort_by(|a, b| compare_cells(column, column.cell(a), column.cell(b)));
        }
        (Some(column), SortStatus::Descending) => {
            rows.sort_by(|a, b| {
                let (a, b) = (column.cell(a), column.cell(b));
                // NaN stays last in both directions
                let nan_last = match column.sort_lt {
                    Some(_) => Ordering::Equal,
                    None => is_nan(a).cmp(&is_nan(b)),
                };
                nan_last.then_with(|| compare_cells(column, b, a))
            });
        }
        _ => rows.sort_by_key(|row| row.id),
    }

    debug!(
        target: "sort",
        "sorted {} rows by {:?} ({})",
        sorted.len(),
        column.map(|c| c.key.as_str()),
        status
    );
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnConfig;
    use crate::data::{record, RowId};

    fn int_column() -> Column {
        Column::from_config(0, ColumnConfig::new("n").with_type("int")).unwrap()
    }

    fn data() -> Dataset {
        Dataset::from_records(vec![
            record([("n", 3)]),
            record([("n", 1)]),
            record([("n", 3)]),
            record([("n", 2)]),
        ])
    }

    fn values(data: &Dataset) -> Vec<DataValue> {
        data.iter().map(|row| row.get("n").cloned().unwrap()).collect()
    }

    #[test]
    fn test_cycle() {
        let mut state = SortState::new();
        assert_eq!(state.advance("n"), SortStatus::Ascending);
        assert_eq!(state.advance("n"), SortStatus::Descending);
        assert_eq!(state.advance("n"), SortStatus::Unsorted);
        assert_eq!(state.advance("n"), SortStatus::Ascending);
    }

    #[test]
    fn test_other_column_resets() {
        let mut state = SortState::new();
        state.advance("a");
        state.advance("a");
        assert_eq!(state.advance("b"), SortStatus::Ascending);
        assert_eq!(state.status_of("a"), SortStatus::Unsorted);
        assert_eq!(state.status_of("b"), SortStatus::Ascending);
    }

    #[test]
    fn test_indicator() {
        assert_eq!(SortStatus::Unsorted.indicator(), None);
        assert_eq!(SortStatus::Descending.indicator(), Some(SortOrder::Descending));
    }

    #[test]
    fn test_stable_both_directions() {
        let column = int_column();
        let asc = sort_dataset(&data(), Some(&column), SortStatus::Ascending);
        assert_eq!(asc.ids(), vec![RowId(1), RowId(3), RowId(0), RowId(2)]);

        let desc = sort_dataset(&data(), Some(&column), SortStatus::Descending);
        assert_eq!(desc.ids(), vec![RowId(0), RowId(2), RowId(3), RowId(1)]);
    }

    #[test]
    fn test_float_column_with_nan() {
        let column = Column::from_config(0, ColumnConfig::new("x").with_type("float")).unwrap();
        let mut seed: u64 = 42;
        let records = (0..200)
            .map(|i| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let value = if i % 3 == 0 {
                    f64::NAN
                } else {
                    (seed >> 11) as f64 / 1e12 - 4000.0
                };
                record([("x", DataValue::Float(value))])
            })
            .collect();
        let data = Dataset::from_records(records);

        let floats = |data: &Dataset| -> Vec<f64> {
            data.iter()
                .map(|row| match row.get("x") {
                    Some(DataValue::Float(f)) => *f,
                    other => panic!("unexpected cell {:?}", other),
                })
                .collect()
        };

        for status in [SortStatus::Ascending, SortStatus::Descending] {
            let sorted = floats(&sort_dataset(&data, Some(&column), status));
            let split = sorted.iter().position(|f| f.is_nan()).unwrap();
            assert_eq!(split, 133, "{}", status);
            assert!(sorted[split..].iter().all(|f| f.is_nan()));
            let numbers = &sorted[..split];
            assert!(numbers.windows(2).all(|w| match status {
                SortStatus::Ascending => w[0] <= w[1],
                _ => w[0] >= w[1],
            }));
        }
    }

    #[test]
    fn test_unsorted_restores_identity_order() {
        let column = int_column();
        let asc = sort_dataset(&data(), Some(&column), SortStatus::Ascending);
        let restored = sort_dataset(&asc, Some(&column), SortStatus::Unsorted);
        assert_eq!(restored, data());
    }

    #[test]
    fn test_custom_less_than() {
        // odd numbers before even ones, then by value
        let lt = Comparator::new(|a, b| match (a, b) {
            (DataValue::Integer(x), DataValue::Integer(y)) => {
                (x % 2 == 0, x) < (y % 2 == 0, y)
            }
            _ => false,
        });
        let column = Column::from_config(
            0,
            ColumnConfig::new("n").with_type("int").with_sort_lt(lt),
        )
        .unwrap();

        let sorted = sort_dataset(&data(), Some(&column), SortStatus::Ascending);
        assert_eq!(
            values(&sorted),
            vec![
                DataValue::Integer(1),
                DataValue::Integer(3),
                DataValue::Integer(3),
                DataValue::Integer(2)
            ]
        );
    }
}
