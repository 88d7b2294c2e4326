//! Table controller
//!
//! Owns the full dataset and its derived projections. The filtered base is
//! `filter(full)`; the shown dataset is `sort(filtered base)`. Edits address
//! shown rows by position and are written back by row identity.

use crate::column::{decode_json, ColumnGroup};
use crate::config::GridConfig;
use crate::data::{DataValue, Dataset, Record};
use crate::error::{ConfigError, ConversionError, GridError, GridResult};
use crate::filter::{FilterEngine, FilterState, FilterValue};
use crate::sort::{sort_dataset, SortState, SortStatus};
use crate::table::dispatcher::{EventDispatcher, GridSubscriber};
use crate::table::events::{ChangeReason, EventSummary, GridEvent, GridRequest};
use crate::table::render::render_text;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Whether the controller is in the middle of a redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Rendering,
}

pub struct TableController {
    columns: ColumnGroup,
    config: GridConfig,
    engine: FilterEngine,
    dispatcher: EventDispatcher,
    state: ControllerState,

    full: Dataset,
    filtered: Dataset,
    shown: Dataset,

    filters: FilterState,
    sort: SortState,
}

impl TableController {
    pub fn new(columns: ColumnGroup) -> Self {
        Self::with_config(columns, GridConfig::default())
    }

    pub fn with_config(columns: ColumnGroup, config: GridConfig) -> Self {
        let engine = FilterEngine::new(config.behavior.multi_choice_delimiter.clone());
        let dispatcher = EventDispatcher::with_history(config.behavior.max_event_history);
        info!(
            "TableController: created with {} column(s): {:?}",
            columns.len(),
            columns.keys()
        );
        Self {
            columns,
            config,
            engine,
            dispatcher,
            state: ControllerState::Idle,
            full: Dataset::new(),
            filtered: Dataset::new(),
            shown: Dataset::new(),
            filters: FilterState::new(),
            sort: SortState::new(),
        }
    }

    /// Build the column group from JSON mappings, failing on any issue
    pub fn from_json(column_config: &[JsonValue], config: GridConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_config(ColumnGroup::from_json(column_config)?, config))
    }

    pub fn columns(&self) -> &ColumnGroup {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn GridSubscriber>) {
        self.dispatcher.subscribe(subscriber);
    }

    /// Recently emitted events, oldest first
    pub fn event_history(&self) -> &[EventSummary] {
        self.dispatcher.get_event_history()
    }

    // ---- data access ----

    /// Replace the full dataset; identities restart at 0
    ///
    /// Filter and sort state are re-applied to the new data unless the
    /// `reset_state_on_set_data` behavior is enabled.
    pub fn set_data(&mut self, records: Vec<Record>) -> GridResult<()> {
        info!("TableController: set_data with {} record(s)", records.len());
        if self.config.behavior.reset_state_on_set_data {
            debug!("TableController: resetting filter and sort state");
            self.filters.clear_all();
            self.sort.reset();
        }
        self.full = Dataset::from_records(records);
        self.refresh(ChangeReason::DataSet)
    }

    /// Replace the full dataset from JSON objects
    ///
    /// JSON strings in non-text columns are decoded with the column codec.
    /// Nothing changes if any record fails to convert.
    pub fn set_json_data(&mut self, records: &[JsonValue]) -> GridResult<()> {
        let mut converted = Vec::with_capacity(records.len());
        for value in records {
            let object = value
                .as_object()
                .ok_or_else(|| ConversionError::to_value("record", value.to_string()))?;

            let mut record = Record::new();
            for (key, raw) in object {
                let cell = match self.columns.get(key) {
                    Some(column) => decode_json(column.codec.as_ref(), raw)?,
                    None => DataValue::from_json(raw),
                };
                record.insert(key.clone(), cell);
            }
            converted.push(record);
        }
        self.set_data(converted)
    }

    /// Copy of the full or the shown dataset as plain records
    pub fn get_data(&self, full: bool) -> Vec<Record> {
        self.get_dataset(full).to_records()
    }

    /// Copy of the full or the shown dataset, identities included
    pub fn get_dataset(&self, full: bool) -> Dataset {
        if full {
            self.full.clone()
        } else {
            self.shown.clone()
        }
    }

    pub fn row_count(&self, full: bool) -> usize {
        if full {
            self.full.len()
        } else {
            self.shown.len()
        }
    }

    // ---- filter / sort ----

    /// Recompute the shown dataset as sort(filter(full))
    pub fn apply_filter(&mut self) -> GridResult<()> {
        self.refresh(ChangeReason::Filter)
    }

    /// Re-sort the last filtered base without filtering again
    pub fn apply_sort(&mut self) -> GridResult<()> {
        self.shown = self.sorted(&self.filtered);
        self.redisplay(ChangeReason::Sort)
    }

    fn refresh(&mut self, reason: ChangeReason) -> GridResult<()> {
        self.filtered = self.engine.apply(&self.full, &self.columns, &self.filters);
        self.shown = self.sorted(&self.filtered);
        self.redisplay(reason)
    }

    fn sorted(&self, data: &Dataset) -> Dataset {
        let column = self.sort.active().and_then(|key| self.columns.get(key));
        sort_dataset(data, column, self.sort.status())
    }

    /// Set a column's filter value and re-filter
    pub fn set_filter(&mut self, key: &str, value: impl Into<FilterValue>) -> GridResult<()> {
        self.require_column(key)?;
        let value = value.into();
        debug!(target: "filter", "set filter on '{}': {:?}", key, value);
        self.filters.set(key, value);
        self.apply_filter()
    }

    pub fn clear_filter(&mut self, key: &str) -> GridResult<()> {
        self.require_column(key)?;
        if self.filters.clear(key).is_some() {
            self.apply_filter()?;
        }
        Ok(())
    }

    pub fn clear_filters(&mut self) -> GridResult<()> {
        if !self.filters.is_empty() {
            self.filters.clear_all();
            self.apply_filter()?;
        }
        Ok(())
    }

    pub fn filter_values(&self) -> &FilterState {
        &self.filters
    }

    /// Options for a multi-choice filter editor on `key`
    ///
    /// The column selection when declared, otherwise the sorted distinct
    /// display strings of the full dataset.
    pub fn filter_choices(&self, key: &str) -> GridResult<Vec<String>> {
        let column = self.require_column(key)?;
        if let Some(choices) = column.selection_display() {
            return Ok(choices);
        }

        let distinct: BTreeSet<String> = self
            .full
            .iter()
            .filter_map(|row| column.display(column.cell(row)).ok())
            .collect();
        Ok(distinct.into_iter().collect())
    }

    pub fn sort_status(&self, key: &str) -> SortStatus {
        self.sort.status_of(key)
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Put `key` directly into `status` and re-sort
    pub fn sort_by(&mut self, key: &str, status: SortStatus) -> GridResult<()> {
        self.require_column(key)?;
        self.sort.set(key, status);
        self.sort_changed()
    }

    /// Advance the sort cycle of `key`, as a header click does
    pub fn toggle_sort(&mut self, key: &str) -> GridResult<SortStatus> {
        self.require_column(key)?;
        let status = self.sort.advance(key);
        self.sort_changed()?;
        Ok(status)
    }

    pub fn reset_sort(&mut self) -> GridResult<()> {
        self.sort.reset();
        self.sort_changed()
    }

    fn sort_changed(&mut self) -> GridResult<()> {
        debug!(
            target: "sort",
            "sort state now {:?} {}",
            self.sort.active(),
            self.sort.status()
        );
        self.dispatcher.dispatch(GridEvent::SortChanged {
            column_key: self.sort.active().map(str::to_string),
            status: self.sort.status(),
        });
        self.apply_sort()
    }

    // ---- editing ----

    /// Write a user edit of shown row `row` back by identity
    ///
    /// Fails the single edit, with exactly one error event, when a redraw is
    /// in progress, the column is unknown or not editable, the row is out of
    /// range, or the text does not decode to an allowed value. Both datasets
    /// stay untouched then.
    pub fn edit_cell(&mut self, row: usize, key: &str, raw_text: &str) -> GridResult<DataValue> {
        match self.try_edit(row, key, raw_text) {
            Ok(value) => {
                self.redisplay(ChangeReason::Edit)?;
                Ok(value)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    fn try_edit(&mut self, row: usize, key: &str, raw_text: &str) -> GridResult<DataValue> {
        if self.state == ControllerState::Rendering {
            return Err(GridError::LockContention("render".to_string()));
        }

        let column = self
            .columns
            .get(key)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))?;

        if !column.editable {
            return Err(GridError::NotEditable(key.to_string()));
        }

        let id = self.shown.id_at(row).ok_or(GridError::RowOutOfRange {
            row,
            len: self.shown.len(),
        })?;

        let value = column.decode(raw_text)?;
        if !column.accepts(&value) {
            return Err(GridError::InvalidSelection {
                column: key.to_string(),
                value: raw_text.to_string(),
            });
        }

        debug!(target: "edit", "row {} ({}) '{}' <- {:?}", row, id, key, value);
        self.full.set_cell(id, key, value.clone());
        self.filtered.set_cell(id, key, value.clone());
        self.shown.set_cell(id, key, value.clone());
        Ok(value)
    }

    // ---- inbound events ----

    /// React to a request from a presentation adapter
    pub fn handle(&mut self, request: GridRequest) -> GridResult<()> {
        match request {
            GridRequest::FilterRequested {
                column_key,
                raw_text,
            } => {
                if !self.config.behavior.show_filter {
                    debug!(target: "filter", "filter disabled, ignoring request on '{}'", column_key);
                    return Ok(());
                }
                self.check_column(&column_key)?;
                self.set_filter(&column_key, raw_text)
            }
            GridRequest::SortRequested { column_key } => {
                if !self.config.behavior.sortable {
                    debug!(target: "sort", "sorting disabled, ignoring request on '{}'", column_key);
                    return Ok(());
                }
                self.check_column(&column_key)?;
                self.toggle_sort(&column_key).map(|_| ())
            }
            GridRequest::CellEditRequested {
                row,
                column_key,
                raw_text,
            } => {
                if self.state == ControllerState::Rendering {
                    debug!(target: "edit", "ignoring edit of '{}' during redraw", column_key);
                    return Ok(());
                }
                self.edit_cell(row, &column_key, &raw_text).map(|_| ())
            }
        }
    }

    // ---- rendering ----

    /// Mark the start of a redraw; edits arriving until `end_render` are ignored
    pub fn begin_render(&mut self) -> GridResult<()> {
        if self.state == ControllerState::Rendering {
            return Err(GridError::LockContention("render".to_string()));
        }
        self.state = ControllerState::Rendering;
        Ok(())
    }

    pub fn end_render(&mut self) {
        self.state = ControllerState::Idle;
    }

    fn redisplay(&mut self, reason: ChangeReason) -> GridResult<()> {
        self.begin_render().map_err(|e| self.report(e))?;
        debug!("TableController: redisplay ({}), {} row(s) shown", reason, self.shown.len());
        self.dispatcher.dispatch(GridEvent::DataChanged {
            reason,
            rows: self.shown.to_records(),
        });
        self.end_render();
        Ok(())
    }

    /// Text table of the shown dataset
    pub fn render_text(&self) -> String {
        render_text(&self.columns, &self.shown, &self.sort)
    }

    // ---- helpers ----

    fn require_column(&self, key: &str) -> GridResult<&crate::column::Column> {
        self.columns
            .get(key)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))
    }

    /// Like `require_column`, reporting the failure as an event
    fn check_column(&mut self, key: &str) -> GridResult<()> {
        let found = self.require_column(key).map(|_| ());
        found.map_err(|e| self.report(e))
    }

    /// Emit an error event and hand the error back
    fn report(&mut self, error: GridError) -> GridError {
        warn!("TableController: {}", error);
        self.dispatcher.dispatch(GridEvent::error(&error));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{record, RowId};
    use crate::table::dispatcher::EventRecorder;
    use crate::table::events::ErrorKind;
    use serde_json::json;

    fn controller() -> (TableController, EventRecorder) {
        let mut controller = TableController::from_json(
            &[
                json!({"key": "n", "type": "int"}),
                json!({"key": "s", "type": "str"}),
            ],
            GridConfig::default(),
        )
        .unwrap();
        let recorder = EventRecorder::new("test");
        controller.subscribe(Box::new(recorder.clone()));
        controller
            .set_data(vec![
                record([("n", DataValue::from(3)), ("s", DataValue::from("b"))]),
                record([("n", DataValue::from(1)), ("s", DataValue::from("a"))]),
                record([("n", DataValue::from(2)), ("s", DataValue::from("a"))]),
            ])
            .unwrap();
        recorder.clear();
        (controller, recorder)
    }

    fn shown_n(controller: &TableController) -> Vec<DataValue> {
        controller
            .get_data(false)
            .into_iter()
            .map(|r| r["n"].clone())
            .collect()
    }

    #[test]
    fn test_set_data_emits_snapshot() {
        let (controller, _) = controller();
        assert_eq!(controller.row_count(true), 3);
        assert!(matches!(
            controller.event_history().last(),
            Some(EventSummary::DataChanged {
                reason: ChangeReason::DataSet,
                row_count: 3,
            })
        ));
    }

    #[test]
    fn test_filter_then_sort_keeps_sort_state() {
        let (mut controller, _) = controller();
        controller.sort_by("n", SortStatus::Descending).unwrap();
        controller.set_filter("s", "a").unwrap();
        assert_eq!(shown_n(&controller), vec![DataValue::Integer(2), DataValue::Integer(1)]);
    }

    #[test]
    fn test_edit_writes_by_identity() {
        let (mut controller, recorder) = controller();
        controller.sort_by("n", SortStatus::Ascending).unwrap();

        // shown row 0 is the original row 1 (n = 1)
        let value = controller.edit_cell(0, "n", "99").unwrap();
        assert_eq!(value, DataValue::Integer(99));

        let full = controller.get_dataset(true);
        assert_eq!(full.find(RowId(1)).unwrap().get("n"), Some(&DataValue::Integer(99)));
        assert_eq!(controller.get_data(false)[0]["n"], DataValue::Integer(99));
        assert_eq!(recorder.error_count(), 0);
    }

    #[test]
    fn test_bad_edit_changes_nothing() {
        let (mut controller, recorder) = controller();
        let before_full = controller.get_dataset(true);
        let before_shown = controller.get_dataset(false);

        let err = controller.edit_cell(1, "n", "abc").unwrap_err();
        assert!(matches!(err, GridError::Conversion(_)));
        assert_eq!(controller.get_dataset(true), before_full);
        assert_eq!(controller.get_dataset(false), before_shown);
        assert_eq!(recorder.error_count(), 1);
    }

    #[test]
    fn test_edit_guards() {
        let mut controller = TableController::from_json(
            &[
                json!({"key": "id", "type": "int", "editable": false}),
                json!({"key": "level", "type": "int", "selection": [1, 2]}),
            ],
            GridConfig::default(),
        )
        .unwrap();
        let recorder = EventRecorder::new("guards");
        controller.subscribe(Box::new(recorder.clone()));
        controller
            .set_data(vec![record([("id", 1), ("level", 1)])])
            .unwrap();

        assert!(matches!(
            controller.edit_cell(0, "id", "5"),
            Err(GridError::NotEditable(_))
        ));
        assert!(matches!(
            controller.edit_cell(0, "level", "3"),
            Err(GridError::InvalidSelection { .. })
        ));
        assert!(matches!(
            controller.edit_cell(4, "level", "2"),
            Err(GridError::RowOutOfRange { row: 4, len: 1 })
        ));
        assert!(matches!(
            controller.edit_cell(0, "nope", "2"),
            Err(GridError::UnknownColumn(_))
        ));
        assert_eq!(recorder.error_count(), 4);
        assert!(controller.edit_cell(0, "level", "2").is_ok());
    }

    #[test]
    fn test_edit_ignored_while_rendering() {
        let (mut controller, _) = controller();
        controller.begin_render().unwrap();
        controller
            .handle(GridRequest::CellEditRequested {
                row: 0,
                column_key: "n".to_string(),
                raw_text: "42".to_string(),
            })
            .unwrap();
        controller.end_render();
        assert_eq!(controller.get_data(true)[0]["n"], DataValue::Integer(3));
    }

    #[test]
    fn test_direct_edit_rejected_while_rendering() {
        let (mut controller, recorder) = controller();
        let full = controller.get_dataset(true);
        let shown = controller.get_dataset(false);

        controller.begin_render().unwrap();
        let err = controller.edit_cell(0, "n", "42").unwrap_err();
        assert!(matches!(err, GridError::LockContention(_)));
        assert_eq!(controller.state(), ControllerState::Rendering);
        controller.end_render();

        assert_eq!(controller.get_dataset(true), full);
        assert_eq!(controller.get_dataset(false), shown);
        assert_eq!(recorder.error_count(), 1);

        assert!(controller.edit_cell(0, "n", "42").is_ok());
        assert_eq!(controller.get_data(true)[0]["n"], DataValue::Integer(42));
    }

    #[test]
    fn test_nested_render_is_lock_contention() {
        let (mut controller, recorder) = controller();
        controller.begin_render().unwrap();
        let err = controller.apply_sort().unwrap_err();
        assert!(matches!(err, GridError::LockContention(_)));
        assert_eq!(recorder.error_count(), 1);
        controller.end_render();
    }

    #[test]
    fn test_disabled_sorting_ignores_requests() {
        let mut config = GridConfig::default();
        config.behavior.sortable = false;
        let mut controller =
            TableController::from_json(&[json!({"key": "n", "type": "int"})], config).unwrap();
        controller
            .set_data(vec![record([("n", 2)]), record([("n", 1)])])
            .unwrap();
        controller
            .handle(GridRequest::SortRequested {
                column_key: "n".to_string(),
            })
            .unwrap();
        assert_eq!(controller.sort_status("n"), SortStatus::Unsorted);
        assert_eq!(shown_n(&controller), vec![DataValue::Integer(2), DataValue::Integer(1)]);
    }

    #[test]
    fn test_unknown_filter_column_reports_error() {
        let (mut controller, recorder) = controller();
        let result = controller.handle(GridRequest::FilterRequested {
            column_key: "missing".to_string(),
            raw_text: "x".to_string(),
        });
        assert!(matches!(result, Err(GridError::UnknownColumn(_))));
        assert!(matches!(
            recorder.events().last(),
            Some(GridEvent::ErrorOccurred {
                kind: ErrorKind::UnknownColumn,
                ..
            })
        ));
    }

    #[test]
    fn test_filter_choices() {
        let (controller, _) = controller();
        assert_eq!(controller.filter_choices("s").unwrap(), vec!["a", "b"]);
        assert_eq!(controller.filter_choices("n").unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_reset_policy() {
        let mut config = GridConfig::default();
        config.behavior.reset_state_on_set_data = true;
        let mut controller =
            TableController::from_json(&[json!({"key": "s"})], config).unwrap();
        controller.set_filter("s", "a").unwrap();
        controller
            .set_data(vec![record([("s", "a")]), record([("s", "b")])])
            .unwrap();
        assert!(controller.filter_values().is_empty());
        assert_eq!(controller.row_count(false), 2);
    }

    #[test]
    fn test_set_json_data_decodes_strings() {
        let mut controller = TableController::from_json(
            &[json!({"key": "d", "type": "date"}), json!({"key": "note"})],
            GridConfig::default(),
        )
        .unwrap();
        controller
            .set_json_data(&[json!({"d": "2024-02-29", "note": "leap", "extra": 1})])
            .unwrap();
        let row = &controller.get_data(true)[0];
        assert!(matches!(row["d"], DataValue::Date(_)));
        assert_eq!(row["extra"], DataValue::Integer(1));

        assert!(controller.set_json_data(&[json!({"d": "not a date"})]).is_err());
        assert_eq!(controller.row_count(true), 1);
    }
}
