//! Core of a configurable tabular grid: typed columns, value codecs,
//! per-column filters, a three-state header sort and a controller keeping
//! the shown projection in sync with the full dataset.

pub mod column;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod sort;
pub mod table;
pub mod utils;

pub use column::{Column, ColumnConfig, ColumnGroup};
pub use config::GridConfig;
pub use data::{record, DataValue, Dataset, Record, RowId};
pub use error::{ConfigError, ConversionError, GridError, GridResult};
pub use filter::{FilterKind, FilterValue};
pub use sort::{SortStatus, SortOrder};
pub use table::{GridEvent, GridRequest, TableController};
