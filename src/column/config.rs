use super::style::ColorSpec;
use crate::data::DataValue;
use crate::filter::CellPredicate;
use crate::sort::Comparator;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Declarative configuration of one column
///
/// Every field except `key` is optional and falls back to the column
/// defaults. `sort_lt` and `predicate` are host capabilities, they are
/// never read from or written to a serialized mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_align: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_align: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Vec<JsonValue>>,

    #[serde(alias = "filter_kind", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<ColorSpec>,

    #[serde(skip)]
    pub sort_lt: Option<Comparator>,

    #[serde(skip)]
    pub predicate: Option<CellPredicate>,
}

impl ColumnConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Parse one JSON mapping, rejecting unknown keys
    pub fn from_json(value: &JsonValue) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn with_default(mut self, default: impl Into<DataValue>) -> Self {
        self.default = Some(default.into().to_json());
        self
    }

    pub fn with_alignment(mut self, h_align: &str, v_align: &str) -> Self {
        self.h_align = Some(h_align.to_string());
        self.v_align = Some(v_align.to_string());
        self
    }

    pub fn with_selection<V, I>(mut self, selection: I) -> Self
    where
        V: Into<DataValue>,
        I: IntoIterator<Item = V>,
    {
        self.selection = Some(
            selection
                .into_iter()
                .map(|value| value.into().to_json())
                .collect(),
        );
        self
    }

    pub fn with_filter_type(mut self, filter_type: impl Into<String>) -> Self {
        self.filter_type = Some(filter_type.into());
        self
    }

    pub fn with_color(mut self, color: ColorSpec) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_bg_color(mut self, bg_color: ColorSpec) -> Self {
        self.bg_color = Some(bg_color);
        self
    }

    pub fn with_sort_lt(mut self, sort_lt: Comparator) -> Self {
        self.sort_lt = Some(sort_lt);
        self
    }

    pub fn with_predicate(mut self, predicate: CellPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}
