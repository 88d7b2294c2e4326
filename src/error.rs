//! Error taxonomy for the grid core
//!
//! Configuration problems abort construction, conversion problems are scoped
//! to a single cell, and filter evaluation problems never leave the engine.

use std::fmt;

/// Direction of a failed value <-> display conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    ToDisplay,
    ToValue,
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionKind::ToDisplay => write!(f, "string"),
            ConversionKind::ToValue => write!(f, "value"),
        }
    }
}

/// A codec could not convert a value or a display string
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{codec}] cannot convert '{input}' to {kind}")]
pub struct ConversionError {
    pub kind: ConversionKind,
    pub codec: String,
    pub input: String,
}

impl ConversionError {
    pub fn to_display(codec: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            kind: ConversionKind::ToDisplay,
            codec: codec.into(),
            input: input.into(),
        }
    }

    pub fn to_value(codec: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            kind: ConversionKind::ToValue,
            codec: codec.into(),
            input: input.into(),
        }
    }
}

/// One problem found in one column configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConfigIssue {
    /// Position of the offending mapping in the configuration list
    pub index: usize,
    /// Column key when it could be read
    pub key: Option<String>,
    pub message: String,
}

impl fmt::Display for ColumnConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "column #{} '{}': {}", self.index, key, self.message),
            None => write!(f, "column #{}: {}", self.index, self.message),
        }
    }
}

/// Every problem found while building a column group
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid column_config.\nFollowing error found:\n{}", format_issues(.issues))]
pub struct ConfigError {
    pub issues: Vec<ColumnConfigIssue>,
}

fn format_issues(issues: &[ColumnConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigError {
    pub fn single(index: usize, key: Option<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ColumnConfigIssue {
                index,
                key,
                message: message.into(),
            }],
        }
    }
}

/// Top-level error for grid operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A filter predicate failed; the row is treated as excluded
    #[error("filter on '{column}' failed: {message}")]
    FilterEvaluation { column: String, message: String },

    /// A redraw was started while another one was still running
    #[error("failed to get lock '{0}'")]
    LockContention(String),

    #[error("column '{0}' is not editable")]
    NotEditable(String),

    #[error("value '{value}' is not a valid selection for column '{column}'")]
    InvalidSelection { column: String, value: String },

    #[error("row {row} out of range ({len} rows shown)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("column '{0}' not found")]
    UnknownColumn(String),
}

pub type GridResult<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_message() {
        let err = ConversionError::to_value("int", "abc");
        assert_eq!(err.to_string(), "[int] cannot convert 'abc' to value");
    }

    #[test]
    fn test_config_error_lists_every_issue() {
        let err = ConfigError {
            issues: vec![
                ColumnConfigIssue {
                    index: 0,
                    key: None,
                    message: "Missing key 'key'".to_string(),
                },
                ColumnConfigIssue {
                    index: 2,
                    key: Some("when".to_string()),
                    message: "invalid type 'datetime64'".to_string(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("column #0: Missing key 'key'"));
        assert!(text.contains("column #2 'when': invalid type 'datetime64'"));
    }
}
