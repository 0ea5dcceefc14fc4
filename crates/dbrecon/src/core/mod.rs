//! Core data model for table reconciliation.
//!
//! - [`table`]: string-rendered rows and insertion-ordered keyed tables
//! - [`mapping`]: source-to-target column correspondence
//! - [`result`]: classification outcomes and per-column diffs

pub mod mapping;
pub mod result;
pub mod table;

pub use mapping::{ColumnMapping, ColumnPair, ResolvedMapping};
pub use result::{CompareReport, ComparisonOutcome, ComparisonResult, ValueDifference};
pub use table::{KeyedTable, Row, RowKey};
