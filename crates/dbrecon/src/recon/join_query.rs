//! Single-engine joined comparison.
//!
//! When both tables are reachable from one connection, a single SELECT with
//! a FULL OUTER JOIN can surface differing rows without loading either table
//! into memory. This strategy is lower fidelity than [`reconcile`]: a NULL
//! on one side of the join is indistinguishable from a missing row, so
//! results carry a `matched` flag and both value maps instead of the
//! three-way outcome classification.
//!
//! MySQL has no FULL OUTER JOIN; the query is built the same way and the
//! server rejects it at execution time.
//!
//! [`reconcile`]: super::reconcile

use std::collections::BTreeMap;

use crate::core::ColumnPair;
use crate::drivers::{Dialect, PoolImpl};
use crate::error::{ReconError, Result};

/// One row from the joined comparison: both sides' values plus whether
/// every compared column agreed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct JoinedDiff {
    pub id: u64,
    pub source_values: BTreeMap<String, Option<String>>,
    pub target_values: BTreeMap<String, Option<String>>,
    pub matched: bool,
}

/// Build the joined comparison query.
///
/// Projects every compared column from both sides under `a_` / `b_`
/// aliases, equi-joins on all key pairs, and keeps rows where any compared
/// column differs or is NULL on either side.
///
/// # Errors
///
/// `Config` if `key_pairs` or `compare_pairs` is empty; both are needed to
/// form a well-formed join.
pub fn build_joined_query(
    dialect: Dialect,
    source_table: &str,
    target_table: &str,
    key_pairs: &[ColumnPair],
    compare_pairs: &[ColumnPair],
) -> Result<String> {
    if key_pairs.is_empty() {
        return Err(ReconError::Config(
            "joined comparison needs at least one key column pair".to_string(),
        ));
    }
    if compare_pairs.is_empty() {
        return Err(ReconError::Config(
            "joined comparison needs at least one compared column pair".to_string(),
        ));
    }

    let mut select_items = Vec::with_capacity(compare_pairs.len() * 2);
    for pair in compare_pairs {
        select_items.push(format!(
            "a.{} AS {}",
            dialect.quote_ident(&pair.source),
            dialect.quote_ident(&format!("a_{}", pair.source))
        ));
        select_items.push(format!(
            "b.{} AS {}",
            dialect.quote_ident(&pair.target),
            dialect.quote_ident(&format!("b_{}", pair.source))
        ));
    }

    let join_conditions = key_pairs
        .iter()
        .map(|pair| {
            format!(
                "a.{} = b.{}",
                dialect.quote_ident(&pair.source),
                dialect.quote_ident(&pair.target)
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ");

    let where_clauses = compare_pairs
        .iter()
        .map(|pair| {
            let a = format!("a.{}", dialect.quote_ident(&pair.source));
            let b = format!("b.{}", dialect.quote_ident(&pair.target));
            format!("({a} <> {b} OR {a} IS NULL OR {b} IS NULL)")
        })
        .collect::<Vec<_>>()
        .join(" OR ");

    Ok(format!(
        "SELECT {} FROM {} a FULL OUTER JOIN {} b ON {} WHERE {}",
        select_items.join(", "),
        dialect.quote_table(source_table),
        dialect.quote_table(target_table),
        join_conditions,
        where_clauses
    ))
}

/// Execute the joined comparison on a single pool and classify each row.
///
/// Rows come back in projection order: columns alternate `a_<col>`,
/// `b_<col>` per compared pair. A row is `matched` when every pair agrees
/// (NULL equals NULL); such rows still appear when some compared column is
/// NULL on both sides, since the WHERE clause cannot tell them apart from
/// genuine differences.
pub async fn compare_joined(
    pool: &PoolImpl,
    source_table: &str,
    target_table: &str,
    key_pairs: &[ColumnPair],
    compare_pairs: &[ColumnPair],
) -> Result<Vec<JoinedDiff>> {
    let sql = build_joined_query(
        pool.dialect(),
        source_table,
        target_table,
        key_pairs,
        compare_pairs,
    )?;
    tracing::debug!("Joined comparison: {}", sql);

    let rows = pool.query_strings(&sql).await?;

    let mut diffs = Vec::with_capacity(rows.len());
    for (idx, values) in rows.into_iter().enumerate() {
        let mut source_values = BTreeMap::new();
        let mut target_values = BTreeMap::new();
        let mut matched = true;

        for (pair_idx, pair) in compare_pairs.iter().enumerate() {
            let a = values.get(pair_idx * 2).cloned().flatten();
            let b = values.get(pair_idx * 2 + 1).cloned().flatten();
            if a != b {
                matched = false;
            }
            source_values.insert(pair.source.clone(), a);
            target_values.insert(pair.source.clone(), b);
        }

        diffs.push(JoinedDiff {
            id: idx as u64 + 1,
            source_values,
            target_values,
            matched,
        });
    }

    Ok(diffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(cols: &[&str]) -> Vec<ColumnPair> {
        cols.iter().map(|c| ColumnPair::new(*c, *c)).collect()
    }

    #[test]
    fn test_joined_query_shape() {
        let sql = build_joined_query(
            Dialect::Postgres,
            "users",
            "users_copy",
            &pairs(&["id"]),
            &pairs(&["id", "name"]),
        )
        .unwrap();

        assert!(sql.starts_with("SELECT "));
        assert!(sql.contains(r#"a."id" AS "a_id", b."id" AS "b_id""#));
        assert!(sql.contains(r#"a."name" AS "a_name", b."name" AS "b_name""#));
        assert!(sql.contains(r#"FROM "users" a FULL OUTER JOIN "users_copy" b ON a."id" = b."id""#));
        assert!(sql.contains(r#"(a."name" <> b."name" OR a."name" IS NULL OR b."name" IS NULL)"#));
    }

    #[test]
    fn test_joined_query_composite_key() {
        let sql = build_joined_query(
            Dialect::Postgres,
            "t1",
            "t2",
            &pairs(&["tenant", "id"]),
            &pairs(&["tenant", "id", "v"]),
        )
        .unwrap();
        assert!(sql.contains(r#"ON a."tenant" = b."tenant" AND a."id" = b."id""#));
    }

    #[test]
    fn test_joined_query_renamed_target_column() {
        let sql = build_joined_query(
            Dialect::Postgres,
            "t1",
            "t2",
            &[ColumnPair::new("id", "id")],
            &[ColumnPair::new("name", "full_name")],
        )
        .unwrap();
        // Aliases follow the source column name on both sides.
        assert!(sql.contains(r#"b."full_name" AS "b_name""#));
        assert!(sql.contains(r#"a."name" <> b."full_name""#));
    }

    #[test]
    fn test_joined_query_mysql_quoting() {
        let sql = build_joined_query(
            Dialect::Mysql,
            "users",
            "users_copy",
            &pairs(&["id"]),
            &pairs(&["id"]),
        )
        .unwrap();
        assert!(sql.contains("FROM `users` a FULL OUTER JOIN `users_copy` b"));
    }

    #[test]
    fn test_empty_key_pairs_is_config_error() {
        let result =
            build_joined_query(Dialect::Postgres, "t1", "t2", &[], &pairs(&["id"]));
        assert!(matches!(result, Err(ReconError::Config(_))));
    }

    #[test]
    fn test_empty_compare_pairs_is_config_error() {
        let result =
            build_joined_query(Dialect::Postgres, "t1", "t2", &pairs(&["id"]), &[]);
        assert!(matches!(result, Err(ReconError::Config(_))));
    }
}
