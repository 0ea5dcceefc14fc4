//! MySQL/MariaDB driver.
//!
//! Uses SQLx for connection pooling and async query execution. Values are
//! rendered to strings by the column's reported type name.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::{ReconError, Result};

use super::StringRow;

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL/MariaDB connection pool.
pub struct MysqlPool {
    pool: sqlx::MySqlPool,
    database: String,
}

impl MysqlPool {
    /// Create a new pool from a connection configuration.
    pub async fn new(config: &ConnectionConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.get_port())
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(MySqlSslMode::Preferred);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.get_max_connections() as u32)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| ReconError::pool(e, "creating MySQL pool"))?;

        // Test connection
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| ReconError::pool(e, "testing MySQL connection"))?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host,
            config.get_port(),
            config.database
        );

        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }

    /// Run a query and render every column of every row to a string.
    pub async fn query_strings(&self, sql: &str) -> Result<Vec<StringRow>> {
        let rows: Vec<MySqlRow> = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReconError::pool(e, "running MySQL query"))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(row.columns().len());
            for idx in 0..row.columns().len() {
                values.push(render_mysql_value(&row, idx));
            }
            out.push(values);
        }
        Ok(out)
    }

    /// List base tables in the connection's database.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReconError::pool(e, "listing MySQL tables"))?;

        Ok(rows
            .iter()
            .map(|r| r.get::<String, _>("TABLE_NAME"))
            .collect())
    }

    /// List a table's columns in ordinal order.
    pub async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        let (schema, name) = super::split_table(table, &self.database);
        // CAST to CHAR to handle collation differences
        let query = r#"
            SELECT CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReconError::pool(e, "listing MySQL columns"))?;

        Ok(rows
            .iter()
            .map(|r| r.get::<String, _>("COLUMN_NAME"))
            .collect())
    }

    /// List primary-key columns in key order.
    pub async fn list_primary_key_columns(&self, table: &str) -> Result<Vec<String>> {
        let (schema, name) = super::split_table(table, &self.database);
        let query = r#"
            SELECT CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME
            FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReconError::pool(e, "loading MySQL primary key"))?;

        Ok(rows
            .iter()
            .map(|r| r.get::<String, _>("COLUMN_NAME"))
            .collect())
    }

    /// List the distinct columns covered by non-primary unique indexes.
    pub async fn list_unique_index_columns(&self, table: &str) -> Result<Vec<String>> {
        let (schema, name) = super::split_table(table, &self.database);
        let query = r#"
            SELECT DISTINCT CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME
            FROM INFORMATION_SCHEMA.STATISTICS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
              AND NON_UNIQUE = 0 AND INDEX_NAME <> 'PRIMARY'
            ORDER BY COLUMN_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReconError::pool(e, "loading MySQL unique indexes"))?;

        Ok(rows
            .iter()
            .map(|r| r.get::<String, _>("COLUMN_NAME"))
            .collect())
    }

    /// Probe the connection.
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReconError::pool(e, "testing MySQL connection"))?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Render one column of a row to `Option<String>` by its reported type name.
fn render_mysql_value(row: &MySqlRow, idx: usize) -> Option<String> {
    let is_null: bool = row.try_get_raw(idx).map(|r| r.is_null()).unwrap_or(true);
    if is_null {
        return None;
    }

    let type_name = row.columns()[idx].type_info().name().to_uppercase();

    match type_name.as_str() {
        "TINYINT" => row.try_get::<i8, _>(idx).ok().map(|v| v.to_string()),
        "SMALLINT" => row.try_get::<i16, _>(idx).ok().map(|v| v.to_string()),
        "MEDIUMINT" | "INT" | "INTEGER" => {
            row.try_get::<i32, _>(idx).ok().map(|v| v.to_string())
        }
        "BIGINT" => row.try_get::<i64, _>(idx).ok().map(|v| v.to_string()),
        "TINYINT UNSIGNED" => row.try_get::<u8, _>(idx).ok().map(|v| v.to_string()),
        "SMALLINT UNSIGNED" => row.try_get::<u16, _>(idx).ok().map(|v| v.to_string()),
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => {
            row.try_get::<u32, _>(idx).ok().map(|v| v.to_string())
        }
        "BIGINT UNSIGNED" => row.try_get::<u64, _>(idx).ok().map(|v| v.to_string()),
        "FLOAT" => row.try_get::<f32, _>(idx).ok().map(|v| v.to_string()),
        "DOUBLE" | "REAL" => row.try_get::<f64, _>(idx).ok().map(|v| v.to_string()),
        "DECIMAL" | "NUMERIC" => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .ok()
            .map(|v| v.normalize().to_string()),
        "BIT" | "BOOLEAN" | "BOOL" => {
            row.try_get::<bool, _>(idx).ok().map(|v| v.to_string())
        }
        "DATE" => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .ok()
            .map(|v| v.to_string()),
        "TIME" => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .ok()
            .map(|v| v.to_string()),
        "DATETIME" => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .ok()
            .map(|v| v.to_string()),
        "TIMESTAMP" => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(idx)
            .ok()
            .map(|v| v.to_rfc3339()),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .ok()
            .map(|b| b.iter().map(|x| format!("{:02x}", x)).collect()),
        // CHAR, VARCHAR, TEXT, ENUM, SET, JSON, and anything unrecognized
        _ => row.try_get::<String, _>(idx).ok(),
    }
}
