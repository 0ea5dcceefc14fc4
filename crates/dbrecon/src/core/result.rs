//! Result model carried out of the reconciliation engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::table::RowKey;

/// Classification of one logical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// Present on both sides with every mapped column equal. Matched
    /// records are never emitted; the variant exists for completeness of
    /// the classification.
    Matched,
    /// Present on both sides with at least one mapped column differing.
    Mismatched,
    /// Present in the source, absent from the target.
    MissingTarget,
    /// Present in the target, absent from the source.
    MissingSource,
}

impl std::fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComparisonOutcome::Matched => "matched",
            ComparisonOutcome::Mismatched => "mismatched",
            ComparisonOutcome::MissingTarget => "missing_target",
            ComparisonOutcome::MissingSource => "missing_source",
        };
        write!(f, "{}", s)
    }
}

/// The two sides' values for one column where they disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDifference {
    /// Value on the source side (`None` = absent/NULL).
    pub source_value: Option<String>,
    /// Value on the target side (`None` = absent/NULL).
    pub target_value: Option<String>,
}

/// One emitted reconciliation record. Immutable once returned.
///
/// The `differences` map is sparse: it holds only the columns that
/// disagree, keyed by source column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Dense sequence starting at 1, assigned in emission order. Not
    /// stable across runs if the underlying data changes.
    pub id: u64,
    /// The record's key (string rendering of the identifying column).
    pub key: RowKey,
    /// Classification outcome.
    pub outcome: ComparisonOutcome,
    /// Per-column differences, keyed by source column name.
    pub differences: BTreeMap<String, ValueDifference>,
}

/// Full output of one comparison run: the result sequence plus the
/// bookkeeping a caller needs to judge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareReport {
    /// Emitted results: missing_target/mismatched in source insertion
    /// order, then missing_source in target insertion order.
    pub results: Vec<ComparisonResult>,
    /// Distinct keys loaded from the source table.
    pub source_rows: usize,
    /// Distinct keys loaded from the target table.
    pub target_rows: usize,
    /// Duplicate-key collisions seen while loading the source. Non-zero
    /// means last-write-wins was applied; reconciliation still ran.
    pub duplicate_source_keys: u64,
    /// Duplicate-key collisions seen while loading the target.
    pub duplicate_target_keys: u64,
    /// Wall-clock duration of the comparison in milliseconds.
    pub duration_ms: u64,
}

impl CompareReport {
    /// Check whether both sides reconciled cleanly.
    pub fn is_in_sync(&self) -> bool {
        self.results.is_empty()
    }

    /// Count of results with the given outcome.
    pub fn count(&self, outcome: ComparisonOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Serialize the report to pretty JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serde_snake_case() {
        let json = serde_json::to_string(&ComparisonOutcome::MissingTarget).unwrap();
        assert_eq!(json, "\"missing_target\"");

        let parsed: ComparisonOutcome = serde_json::from_str("\"mismatched\"").unwrap();
        assert_eq!(parsed, ComparisonOutcome::Mismatched);
    }

    #[test]
    fn test_report_counts() {
        let report = CompareReport {
            results: vec![
                ComparisonResult {
                    id: 1,
                    key: "1".into(),
                    outcome: ComparisonOutcome::Mismatched,
                    differences: BTreeMap::new(),
                },
                ComparisonResult {
                    id: 2,
                    key: "2".into(),
                    outcome: ComparisonOutcome::MissingSource,
                    differences: BTreeMap::new(),
                },
            ],
            source_rows: 1,
            target_rows: 2,
            duplicate_source_keys: 0,
            duplicate_target_keys: 0,
            duration_ms: 3,
        };

        assert!(!report.is_in_sync());
        assert_eq!(report.count(ComparisonOutcome::Mismatched), 1);
        assert_eq!(report.count(ComparisonOutcome::MissingTarget), 0);
    }
}
