//! Data layer: cell values, their natural ordering, and identity-carrying
//! datasets shared by the filter, sort and table modules.

pub mod dataset;
pub mod datavalue;
pub mod datavalue_compare;

pub use dataset::{record, Dataset, Record, Row, RowId};
pub use datavalue::DataValue;
pub use datavalue_compare::{compare_datavalues, compare_optional_datavalues};
