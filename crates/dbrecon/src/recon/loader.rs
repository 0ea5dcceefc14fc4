//! Row loading: project a table into an in-memory [`KeyedTable`].

use tracing::{debug, warn};

use crate::core::{KeyedTable, Row, RowKey};
use crate::drivers::{Dialect, PoolImpl};
use crate::error::{ReconError, Result};

/// Load a table projection keyed by its first column.
///
/// Builds `SELECT <columns> FROM <table>` with identifiers quoted for the
/// pool's dialect, streams the result into a [`KeyedTable`], and renders
/// the first projected column as the row key. A NULL key renders as the
/// empty string, so all NULL-keyed rows collapse into one entry.
///
/// Duplicate keys are last-write-wins; the count is carried on the
/// returned table and logged here.
pub async fn load_keyed_table(
    pool: &PoolImpl,
    table: &str,
    columns: &[String],
) -> Result<KeyedTable> {
    let sql = build_select(pool.dialect(), table, columns);
    debug!("Loading {}: {}", table, sql);

    let rows = pool
        .query_strings(&sql)
        .await
        .map_err(|e| ReconError::load(table, e))?;

    let mut keyed = KeyedTable::with_capacity(rows.len());
    for values in rows {
        let key: RowKey = values
            .first()
            .and_then(|v| v.clone())
            .unwrap_or_default();

        let mut row = Row::with_capacity(columns.len());
        for (column, value) in columns.iter().zip(values) {
            row.push(column.clone(), value);
        }
        keyed.insert(key, row);
    }

    if keyed.duplicate_keys() > 0 {
        warn!(
            "Table {} has {} duplicate key(s); kept the last row seen for each",
            table,
            keyed.duplicate_keys()
        );
    }
    debug!("Loaded {} rows from {}", keyed.len(), table);

    Ok(keyed)
}

fn build_select(dialect: Dialect, table: &str, columns: &[String]) -> String {
    let cols = columns
        .iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {} FROM {}", cols, dialect.quote_table(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_select_quotes_per_dialect() {
        let columns = vec!["id".to_string(), "name".to_string()];
        assert_eq!(
            build_select(Dialect::Postgres, "public.users", &columns),
            r#"SELECT "id", "name" FROM "public"."users""#
        );
        assert_eq!(
            build_select(Dialect::Mysql, "users", &columns),
            "SELECT `id`, `name` FROM `users`"
        );
    }
}
