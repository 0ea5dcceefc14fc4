//! Reconciliation engine: load both sides, classify, report.

mod join_query;
mod loader;
mod reconcile;

pub use join_query::{build_joined_query, compare_joined, JoinedDiff};
pub use loader::load_keyed_table;
pub use reconcile::reconcile;

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::config::CompareSpec;
use crate::core::CompareReport;
use crate::drivers::PoolImpl;
use crate::error::Result;

/// Runs one comparison between a source pool and a target pool.
pub struct CompareEngine {
    source: Arc<PoolImpl>,
    target: Arc<PoolImpl>,
}

impl CompareEngine {
    /// Create an engine over the two pools.
    pub fn new(source: Arc<PoolImpl>, target: Arc<PoolImpl>) -> Self {
        Self { source, target }
    }

    /// Run the comparison described by `spec` and return the full report.
    ///
    /// Both sides load concurrently; either load failing aborts the run
    /// with no partial results.
    pub async fn compare(&self, spec: &CompareSpec) -> Result<CompareReport> {
        let started = Instant::now();
        let mapping = spec.mapping().resolve(&spec.skip_columns)?;

        info!(
            "Comparing {} ({}) against {} ({})",
            spec.source.table,
            self.source.db_type(),
            spec.target.table,
            self.target.db_type()
        );

        let (source_table, target_table) = tokio::join!(
            load_keyed_table(&self.source, &spec.source.table, mapping.source_columns()),
            load_keyed_table(&self.target, &spec.target.table, mapping.target_columns()),
        );
        let source_table = source_table?;
        let target_table = target_table?;

        let results = reconcile(&source_table, &target_table, &mapping);

        let report = CompareReport {
            source_rows: source_table.len(),
            target_rows: target_table.len(),
            duplicate_source_keys: source_table.duplicate_keys(),
            duplicate_target_keys: target_table.duplicate_keys(),
            duration_ms: started.elapsed().as_millis() as u64,
            results,
        };

        info!(
            "Comparison finished in {} ms: {} result(s) over {} source / {} target row(s)",
            report.duration_ms,
            report.results.len(),
            report.source_rows,
            report.target_rows
        );

        Ok(report)
    }
}
