//! Value codecs: conversion between cell values and their display strings
//!
//! Codecs are looked up by type name in a `CodecRegistry`. The built-in
//! codecs are one struct dispatching on a `ValueType` tag; hosts extend the
//! registry by registering their own `Codec` implementations under new names.

use crate::data::DataValue;
use crate::error::ConversionError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Editor strategy a presentation adapter should use for a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKind {
    /// Free-text line edit
    LineEdit,
    /// Drop-down over a closed list of display strings
    SingleChoice(Vec<String>),
    /// Checkable drop-down, used by multi-choice filters
    MultiChoice(Vec<String>),
    DatePicker(PickerFormat),
    TimePicker(PickerFormat),
    DateTimePicker(PickerFormat),
}

/// Formats shared between a temporal codec and its picker editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerFormat {
    /// strftime format of the value string handed to the editor
    pub value_format: String,
    /// Display format of the picker widget itself
    pub display_format: String,
}

/// Bidirectional value <-> display string conversion for one value type
pub trait Codec: Send + Sync + fmt::Debug {
    /// Registered type name, used in error messages
    fn name(&self) -> &str;

    fn to_display(&self, value: &DataValue) -> Result<String, ConversionError>;

    fn to_value(&self, text: &str) -> Result<DataValue, ConversionError>;

    /// Default editor for cells of this type
    fn editor(&self) -> EditorKind {
        EditorKind::LineEdit
    }

    /// Whether raw configuration strings are already values of this type
    fn is_text(&self) -> bool {
        false
    }
}

/// Built-in value type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl ValueType {
    pub const ALL: [ValueType; 7] = [
        ValueType::Integer,
        ValueType::Float,
        ValueType::Text,
        ValueType::Boolean,
        ValueType::Date,
        ValueType::Time,
        ValueType::DateTime,
    ];

    /// Canonical registry name
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Integer => "int",
            ValueType::Float => "float",
            ValueType::Text => "str",
            ValueType::Boolean => "bool",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::DateTime => "datetime",
        }
    }

    /// Alternative names accepted in configuration
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ValueType::Integer => &["integer"],
            ValueType::Float => &["double"],
            ValueType::Text => &["string", "text"],
            ValueType::Boolean => &["boolean"],
            ValueType::Date | ValueType::Time | ValueType::DateTime => &[],
        }
    }

    /// strftime format used for display and parsing of temporal types
    pub fn value_format(&self) -> Option<&'static str> {
        match self {
            ValueType::Date => Some("%Y-%m-%d"),
            ValueType::Time => Some("%H:%M:%S"),
            ValueType::DateTime => Some("%Y-%m-%d %H:%M:%S"),
            _ => None,
        }
    }

    /// Picker display format for temporal types
    pub fn editor_format(&self) -> Option<&'static str> {
        match self {
            ValueType::Date => Some("yyyy-MM-dd"),
            ValueType::Time => Some("hh:mm:ss"),
            ValueType::DateTime => Some("yyyy-MM-dd hh:mm:ss"),
            _ => None,
        }
    }
}

/// Codec for the built-in value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinCodec {
    value_type: ValueType,
}

impl BuiltinCodec {
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn display_error(&self, value: &DataValue) -> ConversionError {
        ConversionError::to_display(self.value_type.name(), value.to_string())
    }

    fn value_error(&self, text: &str) -> ConversionError {
        ConversionError::to_value(self.value_type.name(), text)
    }

    fn picker_format(&self) -> Option<PickerFormat> {
        Some(PickerFormat {
            value_format: self.value_type.value_format()?.to_string(),
            display_format: self.value_type.editor_format()?.to_string(),
        })
    }
}

/// Float display text: integral values keep a trailing `.0`
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        value.to_string()
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => trimmed.parse::<f64>().ok(),
    }
}

impl Codec for BuiltinCodec {
    fn name(&self) -> &str {
        self.value_type.name()
    }

    fn to_display(&self, value: &DataValue) -> Result<String, ConversionError> {
        if value.is_null() {
            return Ok(String::new());
        }

        match (self.value_type, value) {
            (ValueType::Integer, DataValue::Integer(i)) => Ok(i.to_string()),
            (ValueType::Float, DataValue::Float(f)) => Ok(format_float(*f)),
            (ValueType::Float, DataValue::Integer(i)) => Ok(format_float(*i as f64)),
            (ValueType::Text, DataValue::Text(s)) => Ok(s.clone()),
            (ValueType::Boolean, DataValue::Boolean(b)) => {
                Ok(if *b { "True" } else { "False" }.to_string())
            }
            (ValueType::Date, DataValue::Date(d)) => Ok(d.format("%Y-%m-%d").to_string()),
            (ValueType::Time, DataValue::Time(t)) => Ok(t.format("%H:%M:%S").to_string()),
            (ValueType::DateTime, DataValue::DateTime(dt)) => {
                Ok(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            _ => Err(self.display_error(value)),
        }
    }

    fn to_value(&self, text: &str) -> Result<DataValue, ConversionError> {
        match self.value_type {
            ValueType::Integer => text
                .trim()
                .parse::<i64>()
                .map(DataValue::Integer)
                .map_err(|_| self.value_error(text)),
            ValueType::Float => parse_float(text)
                .map(DataValue::Float)
                .ok_or_else(|| self.value_error(text)),
            ValueType::Text => Ok(DataValue::Text(text.to_string())),
            ValueType::Boolean => Ok(DataValue::Boolean(text == "True")),
            ValueType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(DataValue::Date)
                .map_err(|_| self.value_error(text)),
            ValueType::Time => NaiveTime::parse_from_str(text, "%H:%M:%S")
                .map(DataValue::Time)
                .map_err(|_| self.value_error(text)),
            ValueType::DateTime => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .map(DataValue::DateTime)
                .map_err(|_| self.value_error(text)),
        }
    }

    fn editor(&self) -> EditorKind {
        match self.value_type {
            ValueType::Boolean => {
                EditorKind::SingleChoice(vec!["True".to_string(), "False".to_string()])
            }
            ValueType::Date => self
                .picker_format()
                .map(EditorKind::DatePicker)
                .unwrap_or(EditorKind::LineEdit),
            ValueType::Time => self
                .picker_format()
                .map(EditorKind::TimePicker)
                .unwrap_or(EditorKind::LineEdit),
            ValueType::DateTime => self
                .picker_format()
                .map(EditorKind::DateTimePicker)
                .unwrap_or(EditorKind::LineEdit),
            _ => EditorKind::LineEdit,
        }
    }

    fn is_text(&self) -> bool {
        self.value_type == ValueType::Text
    }
}

/// Type name -> codec lookup table
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CodecRegistry {
    /// Registry without any codecs
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registry holding the built-in codecs under their names and aliases
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for value_type in ValueType::ALL {
            let codec: Arc<dyn Codec> = Arc::new(BuiltinCodec::new(value_type));
            registry
                .codecs
                .insert(value_type.name().to_string(), codec.clone());
            for alias in value_type.aliases() {
                registry.codecs.insert(alias.to_string(), codec.clone());
            }
        }
        registry
    }

    /// Register (or replace) a codec under `name`
    pub fn register(&mut self, name: impl Into<String>, codec: Arc<dyn Codec>) -> &mut Self {
        let name = name.into();
        debug!("CodecRegistry: registering codec '{}'", name);
        self.codecs.insert(name, codec);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.codecs.keys().cloned().collect();
        names.sort();
        names
    }
}
