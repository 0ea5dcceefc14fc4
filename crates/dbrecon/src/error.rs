//! Error types for the reconciliation library.

use thiserror::Error;

/// Main error type for reconciliation operations.
#[derive(Error, Debug)]
pub enum ReconError {
    /// Configuration error (invalid YAML, empty column mapping, unknown
    /// connection name, etc.). Surfaced before any comparison starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure loading rows from a table. Aborts the whole comparison;
    /// partial results are never returned.
    #[error("Load failed for table {table}: {message}")]
    Load { table: String, message: String },

    /// Connection pool error with context.
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// MySQL driver error.
    #[error("MySQL error: {0}")]
    Mysql(#[from] sqlx::Error),

    /// IO error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconError {
    /// Create a Pool error with context about where it occurred.
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        ReconError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Load error for a specific table.
    pub fn load(table: impl Into<String>, message: impl ToString) -> Self {
        ReconError::Load {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error. Configuration problems exit 2,
    /// everything else exits 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReconError::Config(_) => 2,
            _ => 1,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconError>;
