//! In-memory row and keyed-table types for reconciliation.
//!
//! Every value is carried as its string rendering (`Option<String>`, where
//! `None` is SQL NULL). Comparison operates on these renderings only; no
//! type-aware numeric or date equality is attempted, so `30` and `30.0`
//! are different values.

use std::collections::HashMap;

/// The identifying value of a record, rendered as a single comparable string.
pub type RowKey = String;

/// One loaded row: an ordered list of `(column, value)` pairs.
///
/// Columns appear in projection order. Lookup is by column name via
/// [`Row::get`], a linear scan over the narrow projections a comparison
/// uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<(String, Option<String>)>,
}

impl Row {
    /// Create an empty row with capacity for `n` columns.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
        }
    }

    /// Append a column value. Caller guarantees column names are distinct
    /// within one row (they come from a distinct projection).
    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.values.push((column.into(), value));
    }

    /// Look up a value by column name.
    ///
    /// Returns `None` both for SQL NULL and for a column that was never
    /// projected, matching the original map-lookup semantics.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Iterate over `(column, value)` pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(c, v)| (c.as_str(), v.as_deref()))
    }

    /// Number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An in-memory table keyed by [`RowKey`], preserving insertion order.
///
/// Built once per comparison run by the row loader and consumed by the
/// reconciler. Duplicate keys are last-write-wins: the later row's values
/// replace the earlier row's at its original position, and the collision is
/// counted rather than raised as an error.
#[derive(Debug, Default)]
pub struct KeyedTable {
    entries: Vec<(RowKey, Row)>,
    index: HashMap<RowKey, usize>,
    duplicate_keys: u64,
}

impl KeyedTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with capacity for `n` rows.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
            index: HashMap::with_capacity(n),
            duplicate_keys: 0,
        }
    }

    /// Insert a row. Last write wins on duplicate keys.
    pub fn insert(&mut self, key: RowKey, row: Row) {
        match self.index.get(&key) {
            Some(&pos) => {
                self.entries[pos].1 = row;
                self.duplicate_keys += 1;
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, row));
            }
        }
    }

    /// Look up a row by key.
    pub fn get(&self, key: &str) -> Option<&Row> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate over `(key, row)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &Row)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    /// Number of distinct keys in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of duplicate-key collisions observed while loading.
    pub fn duplicate_keys(&self) -> u64 {
        self.duplicate_keys
    }
}
