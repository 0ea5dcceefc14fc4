//! Two-pass reconciliation of keyed tables.

use std::collections::BTreeMap;

use crate::core::{
    ComparisonOutcome, ComparisonResult, KeyedTable, ResolvedMapping, Row, ValueDifference,
};

/// Classify every key present in either table and compute sparse diffs.
///
/// Pass 1 walks the source table in insertion order: keys absent from the
/// target emit `missing_target` with every mapped column as a difference;
/// keys present on both sides emit `mismatched` with only the disagreeing
/// columns, or nothing at all when every mapped column agrees. Pass 2 walks
/// the target table and emits `missing_source` for keys the source never
/// had. Two NULLs are equal; a NULL never equals a present value.
///
/// Ids are dense from 1 in emission order. Matched records are not emitted.
///
/// Difference maps are keyed by the source column name on both passes,
/// including `missing_source` records whose values come from the target
/// row; the mapping translates the lookup.
pub fn reconcile(
    source: &KeyedTable,
    target: &KeyedTable,
    mapping: &ResolvedMapping,
) -> Vec<ComparisonResult> {
    let mut results = Vec::new();
    let mut next_id = 1u64;

    // Pass 1: every source key.
    for (key, source_row) in source.iter() {
        match target.get(key) {
            None => {
                let differences = one_sided_diff(source_row, mapping, Side::Source);
                results.push(ComparisonResult {
                    id: take_id(&mut next_id),
                    key: key.clone(),
                    outcome: ComparisonOutcome::MissingTarget,
                    differences,
                });
            }
            Some(target_row) => {
                let mut differences = BTreeMap::new();
                for pair in mapping.pairs() {
                    let source_value = source_row.get(&pair.source);
                    let target_value = target_row.get(&pair.target);
                    if source_value != target_value {
                        differences.insert(
                            pair.source.clone(),
                            ValueDifference {
                                source_value: source_value.map(str::to_string),
                                target_value: target_value.map(str::to_string),
                            },
                        );
                    }
                }
                if !differences.is_empty() {
                    results.push(ComparisonResult {
                        id: take_id(&mut next_id),
                        key: key.clone(),
                        outcome: ComparisonOutcome::Mismatched,
                        differences,
                    });
                }
            }
        }
    }

    // Pass 2: target keys the source never had.
    for (key, target_row) in target.iter() {
        if source.contains_key(key) {
            continue;
        }
        let differences = one_sided_diff(target_row, mapping, Side::Target);
        results.push(ComparisonResult {
            id: take_id(&mut next_id),
            key: key.clone(),
            outcome: ComparisonOutcome::MissingSource,
            differences,
        });
    }

    results
}

enum Side {
    Source,
    Target,
}

/// Diff for a row that exists on one side only: every mapped column becomes
/// a difference with the other side absent.
fn one_sided_diff(row: &Row, mapping: &ResolvedMapping, side: Side) -> BTreeMap<String, ValueDifference> {
    let mut differences = BTreeMap::new();
    for pair in mapping.pairs() {
        let diff = match side {
            Side::Source => ValueDifference {
                source_value: row.get(&pair.source).map(str::to_string),
                target_value: None,
            },
            Side::Target => ValueDifference {
                source_value: None,
                target_value: row.get(&pair.target).map(str::to_string),
            },
        };
        differences.insert(pair.source.clone(), diff);
    }
    differences
}

fn take_id(next: &mut u64) -> u64 {
    let id = *next;
    *next += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnMapping, ColumnPair};

    fn table(rows: &[(&str, &[(&str, Option<&str>)])]) -> KeyedTable {
        let mut t = KeyedTable::new();
        for (key, cols) in rows {
            let mut row = Row::with_capacity(cols.len());
            for (c, v) in *cols {
                row.push(*c, v.map(str::to_string));
            }
            t.insert(key.to_string(), row);
        }
        t
    }

    fn identity(columns: &[&str]) -> ResolvedMapping {
        ColumnMapping::identity(columns.iter().copied())
            .resolve(&[])
            .unwrap()
    }

    #[test]
    fn test_identical_tables_emit_nothing() {
        let rows: &[(&str, &[(&str, Option<&str>)])] = &[
            ("1", &[("id", Some("1")), ("name", Some("A"))]),
            ("2", &[("id", Some("2")), ("name", Some("B"))]),
        ];
        let source = table(rows);
        let target = table(rows);

        let results = reconcile(&source, &target, &identity(&["id", "name"]));
        assert!(results.is_empty());
    }

    #[test]
    fn test_disjoint_key_sets() {
        let source = table(&[
            ("1", &[("id", Some("1"))]),
            ("2", &[("id", Some("2"))]),
        ]);
        let target = table(&[
            ("3", &[("id", Some("3"))]),
            ("4", &[("id", Some("4"))]),
            ("5", &[("id", Some("5"))]),
        ]);

        let results = reconcile(&source, &target, &identity(&["id"]));
        assert_eq!(results.len(), source.len() + target.len());
        assert!(results[..2]
            .iter()
            .all(|r| r.outcome == ComparisonOutcome::MissingTarget));
        assert!(results[2..]
            .iter()
            .all(|r| r.outcome == ComparisonOutcome::MissingSource));
    }

    #[test]
    fn test_single_differing_column_yields_single_entry() {
        let source = table(&[(
            "1",
            &[("id", Some("1")), ("name", Some("A")), ("age", Some("30"))],
        )]);
        let target = table(&[(
            "1",
            &[("id", Some("1")), ("name", Some("A")), ("age", Some("31"))],
        )]);

        let results = reconcile(&source, &target, &identity(&["id", "name", "age"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, ComparisonOutcome::Mismatched);
        assert_eq!(results[0].differences.len(), 1);

        let diff = &results[0].differences["age"];
        assert_eq!(diff.source_value.as_deref(), Some("30"));
        assert_eq!(diff.target_value.as_deref(), Some("31"));
    }

    #[test]
    fn test_null_equals_null_and_differs_from_value() {
        let source = table(&[(
            "1",
            &[("id", Some("1")), ("a", None), ("b", None)],
        )]);
        let target = table(&[(
            "1",
            &[("id", Some("1")), ("a", None), ("b", Some("x"))],
        )]);

        let results = reconcile(&source, &target, &identity(&["id", "a", "b"]));
        assert_eq!(results.len(), 1);
        // Only "b" differs; "a" is NULL on both sides.
        assert_eq!(results[0].differences.len(), 1);
        assert!(results[0].differences.contains_key("b"));
        assert_eq!(results[0].differences["b"].source_value, None);
        assert_eq!(
            results[0].differences["b"].target_value.as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_missing_target_carries_every_mapped_column() {
        let source = table(&[(
            "7",
            &[("id", Some("7")), ("name", Some("G"))],
        )]);
        let target = KeyedTable::new();

        let results = reconcile(&source, &target, &identity(&["id", "name"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, ComparisonOutcome::MissingTarget);
        assert_eq!(results[0].differences.len(), 2);
        assert_eq!(
            results[0].differences["name"].source_value.as_deref(),
            Some("G")
        );
        assert_eq!(results[0].differences["name"].target_value, None);
    }

    #[test]
    fn test_renamed_columns_align_through_mapping() {
        let source = table(&[(
            "1",
            &[("id", Some("1")), ("name", Some("A"))],
        )]);
        let target = table(&[
            ("1", &[("id", Some("1")), ("full_name", Some("B"))]),
            ("2", &[("id", Some("2")), ("full_name", Some("C"))]),
        ]);

        let mapping = ColumnMapping::new(vec![
            ColumnPair::new("id", "id"),
            ColumnPair::new("name", "full_name"),
        ])
        .resolve(&[])
        .unwrap();

        let results = reconcile(&source, &target, &mapping);
        assert_eq!(results.len(), 2);
        // Differences are keyed by source column name.
        assert!(results[0].differences.contains_key("name"));
        assert_eq!(
            results[0].differences["name"].target_value.as_deref(),
            Some("B")
        );

        // Also for missing_source records, whose values come from the
        // target row.
        assert_eq!(results[1].outcome, ComparisonOutcome::MissingSource);
        assert!(results[1].differences.contains_key("name"));
        assert!(!results[1].differences.contains_key("full_name"));
        assert_eq!(
            results[1].differences["name"].target_value.as_deref(),
            Some("C")
        );
    }

    #[test]
    fn test_ids_dense_from_one_in_emission_order() {
        let source = table(&[
            ("1", &[("id", Some("1")), ("v", Some("a"))]),
            ("2", &[("id", Some("2")), ("v", Some("b"))]),
        ]);
        let target = table(&[
            ("1", &[("id", Some("1")), ("v", Some("x"))]),
            ("3", &[("id", Some("3")), ("v", Some("c"))]),
        ]);

        let results = reconcile(&source, &target, &identity(&["id", "v"]));
        let ids: Vec<u64> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_idempotent_up_to_id() {
        let source = table(&[
            ("1", &[("id", Some("1")), ("v", Some("a"))]),
            ("2", &[("id", Some("2")), ("v", None)]),
        ]);
        let target = table(&[
            ("2", &[("id", Some("2")), ("v", Some("b"))]),
            ("9", &[("id", Some("9")), ("v", Some("z"))]),
        ]);
        let mapping = identity(&["id", "v"]);

        let first = reconcile(&source, &target, &mapping);
        let second = reconcile(&source, &target, &mapping);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mixed_outcomes_in_one_run() {
        // source {1: A/30, 2: B/40}, target {1: A/31, 3: C/50}, keyed by id.
        let source = table(&[
            ("1", &[("id", Some("1")), ("name", Some("A")), ("age", Some("30"))]),
            ("2", &[("id", Some("2")), ("name", Some("B")), ("age", Some("40"))]),
        ]);
        let target = table(&[
            ("1", &[("id", Some("1")), ("name", Some("A")), ("age", Some("31"))]),
            ("3", &[("id", Some("3")), ("name", Some("C")), ("age", Some("50"))]),
        ]);

        let results = reconcile(&source, &target, &identity(&["id", "name", "age"]));
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].key, "1");
        assert_eq!(results[0].outcome, ComparisonOutcome::Mismatched);
        assert_eq!(results[0].differences.len(), 1);
        assert_eq!(results[0].differences["age"].source_value.as_deref(), Some("30"));
        assert_eq!(results[0].differences["age"].target_value.as_deref(), Some("31"));

        assert_eq!(results[1].key, "2");
        assert_eq!(results[1].outcome, ComparisonOutcome::MissingTarget);

        assert_eq!(results[2].key, "3");
        assert_eq!(results[2].outcome, ComparisonOutcome::MissingSource);
    }
}
