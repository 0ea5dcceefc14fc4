//! # dbrecon
//!
//! Cross-database table reconciliation library.
//!
//! Compares a table (or mapped projection) in one database against a table
//! in another and classifies every record as matched, mismatched, missing
//! on the target side, or missing on the source side, with value-level
//! diffs for the columns that disagree:
//!
//! - **In-memory reconciliation** across engines (PostgreSQL, MySQL)
//! - **Column mapping** with renames and skip lists
//! - **Joined comparison** when both tables share one connection
//! - **Metadata discovery** for tables, columns, and keys
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbrecon::{CompareEngine, Config, ConnectionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> dbrecon::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let registry = ConnectionRegistry::new();
//!
//!     let spec = &config.compare;
//!     let source = registry
//!         .get_or_connect(&spec.source.connection, &config.connections[&spec.source.connection])
//!         .await?;
//!     let target = registry
//!         .get_or_connect(&spec.target.connection, &config.connections[&spec.target.connection])
//!         .await?;
//!
//!     let report = CompareEngine::new(source, target).compare(spec).await?;
//!     println!("{} difference(s)", report.results.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod recon;
pub mod registry;

// Re-exports for convenient access
pub use config::{CompareSpec, Config, ConnectionConfig, TableRef};
pub use core::{
    ColumnMapping, ColumnPair, CompareReport, ComparisonOutcome, ComparisonResult, KeyedTable,
    ResolvedMapping, Row, RowKey, ValueDifference,
};
pub use drivers::{Dialect, PoolImpl};
pub use error::{ReconError, Result};
pub use recon::{compare_joined, reconcile, CompareEngine, JoinedDiff};
pub use registry::ConnectionRegistry;
