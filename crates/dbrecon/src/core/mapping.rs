//! Column mapping between source and target schemas.

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

/// One source-column to target-column correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    /// Column name in the source table.
    pub source: String,
    /// Column name in the target table.
    pub target: String,
}

impl ColumnPair {
    /// Create a pair from source and target column names.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Ordered set of column correspondences used for a comparison.
///
/// A mapping is a function: each source column appears at most once.
/// Columns not mentioned here (or listed in the skip list at resolution
/// time) are excluded from comparison entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    pairs: Vec<ColumnPair>,
}

impl ColumnMapping {
    /// Build a mapping from an ordered list of pairs.
    pub fn new(pairs: Vec<ColumnPair>) -> Self {
        Self { pairs }
    }

    /// Build an identity mapping over the given column names.
    pub fn identity<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pairs: coerce_identity(columns),
        }
    }

    /// The mapped pairs in declaration order.
    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }

    /// Resolve the mapping into the projections and alignment used by the
    /// loader and reconciler, dropping pairs whose source column is in
    /// `skip`.
    ///
    /// # Errors
    ///
    /// `Config` if the mapping is empty, is empty after applying the skip
    /// list, or maps the same source column twice.
    pub fn resolve(&self, skip: &[String]) -> Result<ResolvedMapping> {
        if self.pairs.is_empty() {
            return Err(ReconError::Config(
                "column mapping is empty - at least the key column must be mapped".to_string(),
            ));
        }

        let mut pairs: Vec<ColumnPair> = Vec::with_capacity(self.pairs.len());
        let mut seen_sources: Vec<&str> = Vec::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            if skip.iter().any(|s| s == &pair.source) {
                continue;
            }
            if seen_sources.contains(&pair.source.as_str()) {
                return Err(ReconError::Config(format!(
                    "source column '{}' is mapped more than once",
                    pair.source
                )));
            }
            seen_sources.push(&pair.source);
            pairs.push(pair.clone());
        }

        if pairs.is_empty() {
            return Err(ReconError::Config(
                "column mapping is empty after applying the skip list".to_string(),
            ));
        }

        let source_columns = pairs.iter().map(|p| p.source.clone()).collect();
        let mut target_columns: Vec<String> = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            if !target_columns.contains(&pair.target) {
                target_columns.push(pair.target.clone());
            }
        }

        Ok(ResolvedMapping {
            pairs,
            source_columns,
            target_columns,
        })
    }
}

/// A validated mapping ready for use: distinct projections for each side
/// plus the ordered pair list used to align values during reconciliation.
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
    pairs: Vec<ColumnPair>,
    source_columns: Vec<String>,
    target_columns: Vec<String>,
}

impl ResolvedMapping {
    /// Columns to project from the source table, in mapping order.
    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    /// Distinct columns to project from the target table.
    pub fn target_columns(&self) -> &[String] {
        &self.target_columns
    }

    /// The aligned pairs in mapping order.
    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }
}

fn coerce_identity<I, S>(columns: I) -> Vec<ColumnPair>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns
        .into_iter()
        .map(|c| {
            let c = c.into();
            ColumnPair::new(c.clone(), c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_projections_and_order() {
        let mapping = ColumnMapping::new(vec![
            ColumnPair::new("id", "id"),
            ColumnPair::new("name", "full_name"),
            ColumnPair::new("age", "age"),
        ]);

        let resolved = mapping.resolve(&[]).unwrap();
        assert_eq!(resolved.source_columns(), &["id", "name", "age"]);
        assert_eq!(resolved.target_columns(), &["id", "full_name", "age"]);
        assert_eq!(resolved.pairs().len(), 3);
        assert_eq!(resolved.pairs()[1].target, "full_name");
    }

    #[test]
    fn test_empty_mapping_is_config_error() {
        let mapping = ColumnMapping::default();
        assert!(matches!(
            mapping.resolve(&[]),
            Err(crate::error::ReconError::Config(_))
        ));
    }

    #[test]
    fn test_skip_list_excludes_pairs() {
        let mapping = ColumnMapping::new(vec![
            ColumnPair::new("id", "id"),
            ColumnPair::new("updated_at", "updated_at"),
        ]);

        let resolved = mapping.resolve(&["updated_at".to_string()]).unwrap();
        assert_eq!(resolved.source_columns(), &["id"]);
    }

    #[test]
    fn test_all_skipped_is_config_error() {
        let mapping = ColumnMapping::new(vec![ColumnPair::new("id", "id")]);
        assert!(mapping.resolve(&["id".to_string()]).is_err());
    }

    #[test]
    fn test_duplicate_source_column_is_config_error() {
        let mapping = ColumnMapping::new(vec![
            ColumnPair::new("id", "id"),
            ColumnPair::new("id", "other_id"),
        ]);
        assert!(mapping.resolve(&[]).is_err());
    }

    #[test]
    fn test_shared_target_column_projected_once() {
        // Two source columns may map to the same target column; the target
        // projection must stay distinct.
        let mapping = ColumnMapping::new(vec![
            ColumnPair::new("id", "id"),
            ColumnPair::new("legacy_id", "id"),
        ]);

        let resolved = mapping.resolve(&[]).unwrap();
        assert_eq!(resolved.target_columns(), &["id"]);
        assert_eq!(resolved.source_columns(), &["id", "legacy_id"]);
    }

    #[test]
    fn test_identity_mapping() {
        let mapping = ColumnMapping::identity(["id", "name"]);
        let resolved = mapping.resolve(&[]).unwrap();
        assert_eq!(resolved.source_columns(), resolved.target_columns());
    }
}
