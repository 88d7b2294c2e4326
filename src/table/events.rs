//! Events crossing the boundary between the grid core and presentation adapters

use crate::data::Record;
use crate::error::GridError;
use crate::sort::SortStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requests sent by presentation adapters to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridRequest {
    /// Filter text of a column changed
    FilterRequested { column_key: String, raw_text: String },

    /// Sort control of a column header activated
    SortRequested { column_key: String },

    /// A shown cell was edited by the user
    CellEditRequested {
        row: usize,
        column_key: String,
        raw_text: String,
    },
}

/// Why the shown dataset changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeReason {
    DataSet,
    Filter,
    Sort,
    Edit,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeReason::DataSet => write!(f, "data set"),
            ChangeReason::Filter => write!(f, "filter changed"),
            ChangeReason::Sort => write!(f, "sort changed"),
            ChangeReason::Edit => write!(f, "data edited"),
        }
    }
}

/// UI-facing classification of a reported error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    Conversion,
    FilterEvaluation,
    LockContention,
    NotEditable,
    InvalidSelection,
    RowOutOfRange,
    UnknownColumn,
}

impl From<&GridError> for ErrorKind {
    fn from(error: &GridError) -> Self {
        match error {
            GridError::Configuration(_) => ErrorKind::Configuration,
            GridError::Conversion(_) => ErrorKind::Conversion,
            GridError::FilterEvaluation { .. } => ErrorKind::FilterEvaluation,
            GridError::LockContention(_) => ErrorKind::LockContention,
            GridError::NotEditable(_) => ErrorKind::NotEditable,
            GridError::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            GridError::RowOutOfRange { .. } => ErrorKind::RowOutOfRange,
            GridError::UnknownColumn(_) => ErrorKind::UnknownColumn,
        }
    }
}

/// Events emitted by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Shown dataset changed, adapters should redraw from the snapshot
    DataChanged {
        reason: ChangeReason,
        rows: Vec<Record>,
    },

    /// Sort state of a column changed, for header indicators
    SortChanged {
        column_key: Option<String>,
        status: SortStatus,
    },

    /// Something failed that the user should be told about
    ErrorOccurred { kind: ErrorKind, message: String },
}

impl GridEvent {
    pub fn error(error: &GridError) -> Self {
        GridEvent::ErrorOccurred {
            kind: ErrorKind::from(error),
            message: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, GridEvent::ErrorOccurred { .. })
    }
}

/// Compact form of a dispatched event, kept in the dispatcher history
///
/// Row snapshots are reduced to their length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSummary {
    DataChanged {
        reason: ChangeReason,
        row_count: usize,
    },
    SortChanged {
        column_key: Option<String>,
        status: SortStatus,
    },
    ErrorOccurred {
        kind: ErrorKind,
        message: String,
    },
}

impl From<&GridEvent> for EventSummary {
    fn from(event: &GridEvent) -> Self {
        match event {
            GridEvent::DataChanged { reason, rows } => EventSummary::DataChanged {
                reason: *reason,
                row_count: rows.len(),
            },
            GridEvent::SortChanged { column_key, status } => EventSummary::SortChanged {
                column_key: column_key.clone(),
                status: *status,
            },
            GridEvent::ErrorOccurred { kind, message } => EventSummary::ErrorOccurred {
                kind: *kind,
                message: message.clone(),
            },
        }
    }
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSummary::DataChanged { reason, row_count } => {
                write!(f, "DataChanged({}, {} rows)", reason, row_count)
            }
            EventSummary::SortChanged { column_key, status } => {
                write!(f, "SortChanged({:?}, {})", column_key, status)
            }
            EventSummary::ErrorOccurred { kind, message } => {
                write!(f, "ErrorOccurred({:?}: {})", kind, message)
            }
        }
    }
}
