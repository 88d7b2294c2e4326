//! Column filters
//!
//! Each column carries a `ColumnFilter` describing how a typed filter value
//! is matched against its cells. The `FilterEngine` turns the per-column
//! filter values held in a `FilterState` into one conjunctive predicate over
//! the full dataset. A predicate that fails to evaluate excludes the row; it
//! never aborts the pass.

pub mod expression;

use crate::column::{Column, ColumnGroup};
use crate::data::{DataValue, Dataset, Row};
use crate::error::GridError;
use expression::{CompiledExpression, ExprValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Filter value keeping rows whose cell is empty
pub const BLANK: &str = "#blank";
/// Filter value keeping rows whose cell is not empty
pub const NON_BLANK: &str = "#non-blank";
/// Separator between accepted values of a multi-choice filter
pub const DEFAULT_DELIMITER: &str = "|";

/// How a column's filter value is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterKind {
    Exact,
    #[default]
    Contains,
    Regex,
    Expression,
    MultipleChoice,
}

impl FilterKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(FilterKind::Exact),
            "contain" | "contains" => Some(FilterKind::Contains),
            "regex" => Some(FilterKind::Regex),
            "expression" => Some(FilterKind::Expression),
            "multiple_choice" | "multi_choice" | "multi-choice" => {
                Some(FilterKind::MultipleChoice)
            }
            _ => None,
        }
    }

    /// Canonical configuration name
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Exact => "exact",
            FilterKind::Contains => "contain",
            FilterKind::Regex => "regex",
            FilterKind::Expression => "expression",
            FilterKind::MultipleChoice => "multiple_choice",
        }
    }

    /// Placeholder text for the filter editor
    pub fn placeholder(&self) -> &'static str {
        match self {
            FilterKind::Exact => "Exact",
            FilterKind::Contains => "Contain",
            FilterKind::Regex => "Regex",
            FilterKind::Expression => "Express",
            FilterKind::MultipleChoice => "Multi",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

type PredicateFn = dyn Fn(&DataValue, &str) -> bool + Send + Sync;

/// Host-supplied predicate receiving the cell and the filter text
#[derive(Clone)]
pub struct CellPredicate(Arc<PredicateFn>);

impl CellPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&DataValue, &str) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn test(&self, cell: &DataValue, filter_text: &str) -> bool {
        (self.0)(cell, filter_text)
    }
}

impl fmt::Debug for CellPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellPredicate(..)")
    }
}

/// Filter behavior attached to one column
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    pub kind: FilterKind,
    /// Replaces the kind-specific match when present
    pub predicate: Option<CellPredicate>,
}

impl ColumnFilter {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: CellPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn placeholder(&self) -> &'static str {
        self.kind.placeholder()
    }
}

/// Current filter input of one column
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Text typed into a filter editor
    Text(String),
    /// A typed value, matched by raw equality in exact filters
    Value(DataValue),
    /// Choices picked in a multi-choice editor
    Choices(Vec<String>),
}

impl FilterValue {
    /// An empty value means "no filter on this column"
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::Value(value) => value.is_null(),
            FilterValue::Choices(choices) => choices.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        FilterValue::Text(text.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        FilterValue::Text(text)
    }
}

impl From<DataValue> for FilterValue {
    fn from(value: DataValue) -> Self {
        FilterValue::Value(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(choices: Vec<String>) -> Self {
        FilterValue::Choices(choices)
    }
}

/// Per-column filter values, keyed by column key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column's filter; an empty value clears it
    pub fn set(&mut self, key: &str, value: FilterValue) {
        if value.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), value);
        }
    }

    pub fn clear(&mut self, key: &str) -> Option<FilterValue> {
        self.values.remove(key)
    }

    pub fn clear_all(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.values.iter()
    }
}

/// A column filter bound to its current value, ready to test cells
#[derive(Debug)]
enum PreparedFilter {
    Blank,
    NonBlank,
    Custom(CellPredicate, String),
    ExactText(String),
    ExactValue(DataValue),
    Contains(String),
    Regex(Result<Regex, String>),
    Expression(Result<CompiledExpression, String>),
    Choices(Vec<String>),
    /// Value shape the kind cannot use, nothing matches
    Never,
}

fn raw_equal(a: &DataValue, b: &DataValue) -> bool {
    match (a, b) {
        (DataValue::Integer(i), DataValue::Float(f)) | (DataValue::Float(f), DataValue::Integer(i)) => {
            (*i as f64) == *f
        }
        _ => a == b,
    }
}

/// Evaluates column filters against rows
#[derive(Debug, Clone)]
pub struct FilterEngine {
    delimiter: String,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl FilterEngine {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    fn prepare(&self, column: &Column, value: &FilterValue) -> PreparedFilter {
        // Shortcuts win over every kind-specific predicate
        match value.as_text() {
            Some(BLANK) => return PreparedFilter::Blank,
            Some(NON_BLANK) => return PreparedFilter::NonBlank,
            _ => {}
        }

        if let (Some(predicate), Some(text)) = (&column.filter.predicate, value.as_text()) {
            return PreparedFilter::Custom(predicate.clone(), text.to_string());
        }

        match (column.filter.kind, value) {
            (FilterKind::Exact, FilterValue::Text(text)) => PreparedFilter::ExactText(text.clone()),
            (FilterKind::Exact, FilterValue::Value(raw)) => PreparedFilter::ExactValue(raw.clone()),
            (FilterKind::Contains, FilterValue::Text(text)) => PreparedFilter::Contains(text.clone()),
            (FilterKind::Regex, FilterValue::Text(text)) => {
                PreparedFilter::Regex(Regex::new(text).map_err(|e| e.to_string()))
            }
            (FilterKind::Expression, FilterValue::Text(text)) => PreparedFilter::Expression(
                CompiledExpression::compile(text).map_err(|e| e.to_string()),
            ),
            (FilterKind::MultipleChoice, FilterValue::Text(text)) => PreparedFilter::Choices(
                text.split(self.delimiter.as_str())
                    .map(|choice| choice.to_string())
                    .collect(),
            ),
            (FilterKind::MultipleChoice, FilterValue::Choices(choices)) => {
                PreparedFilter::Choices(choices.clone())
            }
            _ => PreparedFilter::Never,
        }
    }

    fn test(
        &self,
        column: &Column,
        prepared: &PreparedFilter,
        cell: &DataValue,
    ) -> Result<bool, GridError> {
        let evaluation_error = |message: String| GridError::FilterEvaluation {
            column: column.key.clone(),
            message,
        };
        let display = || {
            column
                .codec
                .to_display(cell)
                .map_err(|e| evaluation_error(e.to_string()))
        };

        match prepared {
            PreparedFilter::Blank => Ok(!cell.is_truthy()),
            PreparedFilter::NonBlank => Ok(cell.is_truthy()),
            PreparedFilter::Custom(predicate, text) => Ok(predicate.test(cell, text)),
            PreparedFilter::ExactText(text) => Ok(display()? == *text),
            PreparedFilter::ExactValue(raw) => Ok(raw_equal(cell, raw)),
            PreparedFilter::Contains(text) => Ok(display()?.contains(text.as_str())),
            PreparedFilter::Regex(regex) => match regex {
                Ok(regex) => Ok(regex.is_match(&display()?)),
                Err(message) => Err(evaluation_error(message.clone())),
            },
            PreparedFilter::Expression(compiled) => match compiled {
                Ok(compiled) => {
                    let literal = if cell.is_basic() {
                        ExprValue::from_cell(cell, "")
                    } else {
                        ExprValue::from_cell(cell, &display()?)
                    };
                    compiled
                        .passes(&literal)
                        .map_err(|e| evaluation_error(e.to_string()))
                }
                Err(message) => Err(evaluation_error(message.clone())),
            },
            PreparedFilter::Choices(choices) => {
                let shown = display()?;
                Ok(choices.iter().any(|choice| *choice == shown))
            }
            PreparedFilter::Never => Ok(false),
        }
    }

    /// Evaluate one column filter against one cell, surfacing failures
    pub fn evaluate(
        &self,
        column: &Column,
        cell: &DataValue,
        value: &FilterValue,
    ) -> Result<bool, GridError> {
        let prepared = self.prepare(column, value);
        self.test(column, &prepared, cell)
    }

    /// Evaluate one column filter; a failure counts as "does not pass"
    pub fn passes(&self, column: &Column, cell: &DataValue, value: &FilterValue) -> bool {
        match self.evaluate(column, cell, value) {
            Ok(pass) => pass,
            Err(e) => {
                trace!(target: "filter", "row excluded: {}", e);
                false
            }
        }
    }

    /// Apply every non-empty column filter to `full` as a conjunction
    ///
    /// The result keeps the order and identities of `full`. Filter values for
    /// keys that are not columns of the group are ignored.
    pub fn apply(&self, full: &Dataset, columns: &ColumnGroup, state: &FilterState) -> Dataset {
        let active: Vec<(&Column, PreparedFilter)> = columns
            .iter()
            .filter_map(|column| {
                let value = state.get(&column.key)?;
                if value.is_empty() {
                    return None;
                }
                Some((column, self.prepare(column, value)))
            })
            .collect();

        if active.is_empty() {
            debug!(target: "filter", "no active filters, keeping {} rows", full.len());
            return full.clone();
        }

        let filtered = full.retain_matching(|row: &Row| {
            active.iter().all(|(column, prepared)| {
                match self.test(column, prepared, column.cell(row)) {
                    Ok(pass) => pass,
                    Err(e) => {
                        trace!(target: "filter", "row {} excluded: {}", row.id, e);
                        false
                    }
                }
            })
        });

        debug!(
            target: "filter",
            "{} active filter(s) kept {} of {} rows",
            active.len(),
            filtered.len(),
            full.len()
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnConfig;
    use chrono::NaiveDate;

    fn column(config: ColumnConfig) -> Column {
        Column::from_config(0, config).unwrap()
    }

    fn text_column(kind: &str) -> Column {
        column(ColumnConfig::new("s").with_type("str").with_filter_type(kind))
    }

    fn int_column(kind: &str) -> Column {
        column(ColumnConfig::new("n").with_type("int").with_filter_type(kind))
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FilterKind::parse("contain"), Some(FilterKind::Contains));
        assert_eq!(FilterKind::parse("multiple_choice"), Some(FilterKind::MultipleChoice));
        assert_eq!(FilterKind::parse("fuzzy"), None);
        assert_eq!(FilterKind::default(), FilterKind::Contains);
        assert_eq!(FilterKind::Expression.placeholder(), "Express");
    }

    #[test]
    fn test_blank_shortcuts() {
        let engine = FilterEngine::default();
        let col = text_column("exact");
        assert!(engine.passes(&col, &DataValue::from(""), &BLANK.into()));
        assert!(engine.passes(&col, &DataValue::Null, &BLANK.into()));
        assert!(!engine.passes(&col, &DataValue::from("x"), &BLANK.into()));
        assert!(engine.passes(&col, &DataValue::from("x"), &NON_BLANK.into()));
    }

    #[test]
    fn test_exact_uses_display_string() {
        let engine = FilterEngine::default();
        let col = column(ColumnConfig::new("f").with_type("float").with_filter_type("exact"));
        assert!(engine.passes(&col, &DataValue::Float(3.0), &"3.0".into()));
        assert!(!engine.passes(&col, &DataValue::Float(3.0), &"3".into()));
        assert!(engine.passes(&col, &DataValue::Float(3.0), &DataValue::Integer(3).into()));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let engine = FilterEngine::default();
        let col = text_column("contain");
        assert!(engine.passes(&col, &DataValue::from("Alice"), &"lic".into()));
        assert!(!engine.passes(&col, &DataValue::from("Alice"), &"alice".into()));
    }

    #[test]
    fn test_regex() {
        let engine = FilterEngine::default();
        let col = text_column("regex");
        assert!(engine.passes(&col, &DataValue::from("order-42"), &r"\d+$".into()));
        assert!(!engine.passes(&col, &DataValue::from("order"), &r"\d+$".into()));
        // invalid pattern excludes instead of failing
        assert!(!engine.passes(&col, &DataValue::from("order"), &"(".into()));
        assert!(engine.evaluate(&col, &DataValue::from("order"), &"(".into()).is_err());
    }

    #[test]
    fn test_expression_on_raw_and_display_values() {
        let engine = FilterEngine::default();
        let col = int_column("expression");
        assert!(engine.passes(&col, &DataValue::Integer(5), &"> 3".into()));
        assert!(!engine.passes(&col, &DataValue::Integer(1), &"> 3".into()));
        assert!(!engine.passes(&col, &DataValue::Integer(5), &"> 'x'".into()));
        assert!(!engine.passes(&col, &DataValue::Integer(5), &"import os".into()));

        let dates = column(ColumnConfig::new("d").with_type("date").with_filter_type("expression"));
        let cell = DataValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(engine.passes(&dates, &cell, &">= '2024-01-01'".into()));
    }

    #[test]
    fn test_deeply_nested_expression_excludes_row() {
        let engine = FilterEngine::default();
        let col = int_column("expression");
        let depth = 10_000;
        let fragment = format!("== {}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(!engine.passes(&col, &DataValue::Integer(1), &fragment.as_str().into()));

        let negations = format!("== {}1", "-".repeat(depth));
        assert!(!engine.passes(&col, &DataValue::Integer(1), &negations.as_str().into()));
    }

    #[test]
    fn test_multiple_choice() {
        let engine = FilterEngine::default();
        let col = int_column("multiple_choice");
        assert!(engine.passes(&col, &DataValue::Integer(2), &"1|2".into()));
        assert!(!engine.passes(&col, &DataValue::Integer(3), &"1|2".into()));
        let picked = FilterValue::Choices(vec!["3".to_string()]);
        assert!(engine.passes(&col, &DataValue::Integer(3), &picked));

        let semicolon = FilterEngine::new(";");
        assert!(semicolon.passes(&col, &DataValue::Integer(2), &"1;2".into()));
    }

    #[test]
    fn test_custom_predicate_replaces_kind() {
        let engine = FilterEngine::default();
        let col = column(
            ColumnConfig::new("s")
                .with_predicate(CellPredicate::new(|cell, text| {
                    cell.to_string().eq_ignore_ascii_case(text)
                })),
        );
        assert!(engine.passes(&col, &DataValue::from("Alice"), &"alice".into()));
        // shortcuts still come first
        assert!(!engine.passes(&col, &DataValue::from("Alice"), &BLANK.into()));
    }

    #[test]
    fn test_undisplayable_cell_is_excluded() {
        let engine = FilterEngine::default();
        let col = int_column("contain");
        assert!(!engine.passes(&col, &DataValue::from("not a number"), &"n".into()));
    }

    #[test]
    fn test_empty_filter_value_clears_state() {
        let mut state = FilterState::new();
        state.set("s", "a".into());
        assert_eq!(state.len(), 1);
        state.set("s", "".into());
        assert!(state.is_empty());
    }
}
