//! Database driver implementations.
//!
//! Each driver wraps a connection pool and exposes the narrow surface the
//! engine consumes: run a read-only query with string-rendered values, and
//! discover tables, columns, primary keys, and unique index columns.
//!
//! [`PoolImpl`] and [`Dialect`] use enum variants for static dispatch
//! instead of trait objects.

pub mod mysql;
pub mod postgres;

pub use mysql::MysqlPool;
pub use postgres::PgPool;

use crate::config::ConnectionConfig;
use crate::error::{ReconError, Result};

/// A row of string-rendered values in projection order.
///
/// `None` is SQL NULL. All downstream comparison operates on these string
/// renderings.
pub type StringRow = Vec<Option<String>>;

/// SQL identifier-quoting strategy per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Mysql,
}

impl Dialect {
    /// Get the dialect identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
        }
    }

    /// Quote an identifier (table name, column name, etc.).
    ///
    /// - PostgreSQL: `"identifier"`
    /// - MySQL: `` `identifier` ``
    pub fn quote_ident(&self, name: &str) -> String {
        match self {
            Dialect::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
            Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
        }
    }

    /// Quote a possibly schema-qualified table name, quoting each
    /// dot-separated part.
    pub fn quote_table(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_ident(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Enum wrapper for pool implementations.
pub enum PoolImpl {
    Postgres(PgPool),
    Mysql(MysqlPool),
}

impl PoolImpl {
    /// Create a pool from a connection configuration.
    ///
    /// # Errors
    ///
    /// `Config` if the database type is not recognized; `Pool` if the
    /// pool cannot be created or the probe query fails.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        match config.db_type.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => {
                Ok(Self::Postgres(PgPool::new(config).await?))
            }
            "mysql" | "mariadb" => Ok(Self::Mysql(MysqlPool::new(config).await?)),
            other => Err(ReconError::Config(format!(
                "Unknown database type: '{}'. Supported types: postgres, mysql",
                other
            ))),
        }
    }

    /// Get the database type.
    pub fn db_type(&self) -> &str {
        self.dialect().name()
    }

    /// Get the SQL dialect for this pool.
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Postgres(_) => Dialect::Postgres,
            Self::Mysql(_) => Dialect::Mysql,
        }
    }

    /// Run a read-only query and render every value to a string.
    pub async fn query_strings(&self, sql: &str) -> Result<Vec<StringRow>> {
        match self {
            Self::Postgres(p) => p.query_strings(sql).await,
            Self::Mysql(p) => p.query_strings(sql).await,
        }
    }

    /// List base tables visible on this connection.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        match self {
            Self::Postgres(p) => p.list_tables().await,
            Self::Mysql(p) => p.list_tables().await,
        }
    }

    /// List a table's columns in ordinal order.
    pub async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        match self {
            Self::Postgres(p) => p.list_columns(table).await,
            Self::Mysql(p) => p.list_columns(table).await,
        }
    }

    /// List a table's primary-key columns in key order.
    pub async fn list_primary_key_columns(&self, table: &str) -> Result<Vec<String>> {
        match self {
            Self::Postgres(p) => p.list_primary_key_columns(table).await,
            Self::Mysql(p) => p.list_primary_key_columns(table).await,
        }
    }

    /// List the distinct columns covered by unique indexes on a table.
    pub async fn list_unique_index_columns(&self, table: &str) -> Result<Vec<String>> {
        match self {
            Self::Postgres(p) => p.list_unique_index_columns(table).await,
            Self::Mysql(p) => p.list_unique_index_columns(table).await,
        }
    }

    /// Test the connection with a probe query.
    pub async fn test_connection(&self) -> Result<()> {
        match self {
            Self::Postgres(p) => p.test_connection().await,
            Self::Mysql(p) => p.test_connection().await,
        }
    }

    /// Close all connections.
    pub async fn close(&self) {
        match self {
            Self::Postgres(p) => p.close().await,
            Self::Mysql(p) => p.close().await,
        }
    }
}

/// Split a possibly schema-qualified table name into (schema, table),
/// falling back to the given default schema.
pub(crate) fn split_table<'a>(table: &'a str, default_schema: &'a str) -> (&'a str, &'a str) {
    match table.split_once('.') {
        Some((schema, name)) => (schema, name),
        None => (default_schema, table),
    }
}
