//! Configuration type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{ColumnMapping, ColumnPair};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Named database connections, keyed by logical name.
    pub connections: BTreeMap<String, ConnectionConfig>,

    /// The comparison to run.
    pub compare: CompareSpec,
}

/// A single database connection definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database type: "postgres" or "mysql" (aliases accepted).
    #[serde(rename = "type", default = "default_postgres")]
    pub db_type: String,

    /// Database host.
    pub host: String,

    /// Database port. Defaults to the engine's standard port if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Schema for metadata discovery and unqualified table names
    /// (PostgreSQL only; default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,

    /// SSL mode for PostgreSQL (default: "require").
    #[serde(default = "default_require")]
    pub ssl_mode: String,

    /// Maximum pooled connections (default: 5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
}

impl ConnectionConfig {
    /// Effective port: explicit value or the engine default.
    pub fn get_port(&self) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        if self.is_mysql() {
            3306
        } else {
            5432
        }
    }

    /// Effective pool size.
    pub fn get_max_connections(&self) -> usize {
        self.max_connections.unwrap_or(5)
    }

    /// Whether this connection targets MySQL/MariaDB.
    pub fn is_mysql(&self) -> bool {
        matches!(self.db_type.to_lowercase().as_str(), "mysql" | "mariadb")
    }
}

/// A table on a named connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRef {
    /// Logical connection name (a key in `connections`).
    pub connection: String,

    /// Table name, optionally schema-qualified ("schema.table").
    pub table: String,
}

/// Specification of one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareSpec {
    /// Source side.
    pub source: TableRef,

    /// Target side.
    pub target: TableRef,

    /// Column correspondences. The first pair's source column doubles as
    /// the row key (first projected column).
    pub columns: Vec<ColumnPair>,

    /// Source columns to exclude from comparison.
    #[serde(default)]
    pub skip_columns: Vec<String>,
}

impl CompareSpec {
    /// The column mapping declared by this spec.
    pub fn mapping(&self) -> ColumnMapping {
        ColumnMapping::new(self.columns.clone())
    }
}

// Default value functions for serde
fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_require() -> String {
    "require".to_string()
}
