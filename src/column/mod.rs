//! Column model
//!
//! A `Column` is the resolved, immutable form of a `ColumnConfig`: the codec
//! is looked up, defaults and selections are decoded, alignment and colors
//! are parsed. A `ColumnGroup` is built from a whole list of configurations
//! at once and either succeeds completely or reports every problem found.

pub mod align;
pub mod codec;
pub mod config;
pub mod style;

pub use align::{Alignment, HAlign, VAlign};
pub use codec::{BuiltinCodec, Codec, CodecRegistry, EditorKind, PickerFormat, ValueType};
pub use config::ColumnConfig;
pub use style::{ColorSpec, Rgba, Style};

use crate::data::{DataValue, Row};
use crate::error::{ColumnConfigIssue, ConfigError, ConversionError};
use crate::filter::{ColumnFilter, FilterKind};
use crate::sort::Comparator;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Decode a JSON scalar for a column
///
/// Strings go through the codec unless the codec is textual, everything
/// else is taken as the matching cell value.
pub fn decode_json(codec: &dyn Codec, value: &JsonValue) -> Result<DataValue, ConversionError> {
    match value {
        JsonValue::String(text) if !codec.is_text() => codec.to_value(text),
        other => Ok(DataValue::from_json(other)),
    }
}

/// One resolved column
#[derive(Debug, Clone)]
pub struct Column {
    pub key: String,
    pub name: String,
    pub codec: Arc<dyn Codec>,
    pub editable: bool,
    /// Read in place of a missing cell
    pub default: DataValue,
    pub alignment: Alignment,
    /// Closed set of valid values, implies a single-choice editor
    pub selection: Option<Vec<DataValue>>,
    pub sort_lt: Option<Comparator>,
    pub filter: ColumnFilter,
    pub style: Style,
}

impl Column {
    /// Resolve a configuration against the built-in codecs
    pub fn from_config(index: usize, config: ColumnConfig) -> Result<Self, ConfigError> {
        Self::from_config_with(index, config, &CodecRegistry::with_builtins())
    }

    /// Resolve a configuration, collecting every problem in it
    pub fn from_config_with(
        index: usize,
        config: ColumnConfig,
        registry: &CodecRegistry,
    ) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();
        let key = config.key.clone();
        let mut issue = |message: String| {
            issues.push(ColumnConfigIssue {
                index,
                key: key.clone(),
                message,
            })
        };

        let type_name = config.value_type.as_deref().unwrap_or("str");
        let codec = registry.get(type_name);
        if codec.is_none() {
            issue(format!("invalid type '{}'", type_name));
        }

        if config.key.is_none() {
            issue("Missing key 'key'".to_string());
        }

        let alignment = Alignment::from_tokens(config.h_align.as_deref(), config.v_align.as_deref())
            .unwrap_or_else(|message| {
                issue(message);
                Alignment::default()
            });

        let style = Style::from_specs(config.color.as_ref(), config.bg_color.as_ref())
            .unwrap_or_else(|message| {
                issue(message);
                Style::default()
            });

        let filter_kind = match config.filter_type.as_deref() {
            Some(name) => FilterKind::parse(name).unwrap_or_else(|| {
                issue(format!("invalid filter_type '{}'", name));
                FilterKind::default()
            }),
            None => FilterKind::default(),
        };

        let mut default = DataValue::Null;
        let mut selection = None;
        if let Some(codec) = &codec {
            let mut decode = |what: &str, raw: &JsonValue| {
                match decode_json(codec.as_ref(), raw)
                    .and_then(|value| codec.to_display(&value).map(|_| value))
                {
                    Ok(value) => Some(value),
                    Err(e) => {
                        issue(format!("invalid {}: {}", what, e));
                        None
                    }
                }
            };

            if let Some(raw) = &config.default {
                default = decode("default", raw).unwrap_or(DataValue::Null);
            }
            if let Some(raw) = &config.selection {
                let values: Vec<DataValue> = raw
                    .iter()
                    .filter_map(|item| decode("selection", item))
                    .collect();
                selection = Some(values);
            }
        }

        match (issues.is_empty(), config.key, codec) {
            (true, Some(key), Some(codec)) => {
                let mut filter = ColumnFilter::new(filter_kind);
                if let Some(predicate) = config.predicate {
                    filter = filter.with_predicate(predicate);
                }
                Ok(Self {
                    name: config.name.unwrap_or_else(|| key.clone()),
                    key,
                    codec,
                    editable: config.editable.unwrap_or(true),
                    default,
                    alignment,
                    selection,
                    sort_lt: config.sort_lt,
                    filter,
                    style,
                })
            }
            _ => Err(ConfigError { issues }),
        }
    }

    /// Cell of `row` for this column, the column default when absent
    pub fn cell<'a>(&'a self, row: &'a Row) -> &'a DataValue {
        row.get(&self.key).unwrap_or(&self.default)
    }

    pub fn display(&self, value: &DataValue) -> Result<String, ConversionError> {
        self.codec.to_display(value)
    }

    pub fn decode(&self, text: &str) -> Result<DataValue, ConversionError> {
        self.codec.to_value(text)
    }

    /// Whether `value` is allowed by the column's selection, if any
    pub fn accepts(&self, value: &DataValue) -> bool {
        match &self.selection {
            Some(selection) => selection.contains(value),
            None => true,
        }
    }

    /// Display strings of the selection; values that fail to display are skipped
    pub fn selection_display(&self) -> Option<Vec<String>> {
        self.selection.as_ref().map(|selection| {
            selection
                .iter()
                .filter_map(|value| self.display(value).ok())
                .collect()
        })
    }

    /// Editor strategy for cells of this column
    pub fn editor(&self) -> EditorKind {
        match self.selection_display() {
            Some(choices) => EditorKind::SingleChoice(choices),
            None => self.codec.editor(),
        }
    }

    /// Rebuild the declarative configuration of this column
    pub fn to_config(&self) -> ColumnConfig {
        ColumnConfig {
            key: Some(self.key.clone()),
            name: Some(self.name.clone()),
            value_type: Some(self.codec.name().to_string()),
            editable: Some(self.editable),
            default: (!self.default.is_null()).then(|| self.default.to_json()),
            h_align: Some(self.alignment.horizontal.token().to_string()),
            v_align: Some(self.alignment.vertical.token().to_string()),
            selection: self
                .selection
                .as_ref()
                .map(|selection| selection.iter().map(DataValue::to_json).collect()),
            filter_type: Some(self.filter.kind.name().to_string()),
            color: self.style.color.map(|c| ColorSpec::Name(c.to_string())),
            bg_color: self.style.bg_color.map(|c| ColorSpec::Name(c.to_string())),
            sort_lt: self.sort_lt.clone(),
            predicate: self.filter.predicate.clone(),
        }
    }
}

/// Ordered, fixed set of columns
#[derive(Debug, Clone, Default)]
pub struct ColumnGroup {
    columns: Vec<Column>,
}

impl ColumnGroup {
    /// Build from configurations using the built-in codecs
    pub fn new(configs: Vec<ColumnConfig>) -> Result<Self, ConfigError> {
        Self::with_registry(configs, &CodecRegistry::with_builtins())
    }

    /// Build from configurations; fails with every issue of every column
    pub fn with_registry(
        configs: Vec<ColumnConfig>,
        registry: &CodecRegistry,
    ) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();
        let mut columns = Vec::with_capacity(configs.len());
        let mut seen = HashSet::new();

        for (index, config) in configs.into_iter().enumerate() {
            if let Some(key) = &config.key {
                if !seen.insert(key.clone()) {
                    issues.push(ColumnConfigIssue {
                        index,
                        key: Some(key.clone()),
                        message: format!("duplicate key '{}'", key),
                    });
                }
            }
            match Column::from_config_with(index, config, registry) {
                Ok(column) => columns.push(column),
                Err(e) => issues.extend(e.issues),
            }
        }

        if !issues.is_empty() {
            issues.sort_by_key(|issue| issue.index);
            return Err(ConfigError { issues });
        }

        debug!("ColumnGroup: built {} column(s)", columns.len());
        Ok(Self { columns })
    }

    /// Parse JSON mappings into configurations without resolving them
    ///
    /// Lets a host attach comparators and predicates before building.
    pub fn parse_configs(values: &[JsonValue]) -> Result<Vec<ColumnConfig>, ConfigError> {
        let mut issues = Vec::new();
        let mut configs = Vec::with_capacity(values.len());

        for (index, value) in values.iter().enumerate() {
            match ColumnConfig::from_json(value) {
                Ok(config) => configs.push(config),
                Err(e) => issues.push(ColumnConfigIssue {
                    index,
                    key: value
                        .get("key")
                        .and_then(JsonValue::as_str)
                        .map(str::to_string),
                    message: e.to_string(),
                }),
            }
        }

        if issues.is_empty() {
            Ok(configs)
        } else {
            Err(ConfigError { issues })
        }
    }

    pub fn from_json(values: &[JsonValue]) -> Result<Self, ConfigError> {
        Self::from_json_with_registry(values, &CodecRegistry::with_builtins())
    }

    pub fn from_json_with_registry(
        values: &[JsonValue],
        registry: &CodecRegistry,
    ) -> Result<Self, ConfigError> {
        Self::with_registry(Self::parse_configs(values)?, registry)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.key.as_str()).collect()
    }

    /// Declarative configuration of every column, in order
    pub fn config(&self) -> Vec<ColumnConfig> {
        self.columns.iter().map(Column::to_config).collect()
    }
}

impl<'a> IntoIterator for &'a ColumnGroup {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
