//! Configuration validation.

use crate::error::{ReconError, Result};

use super::types::{Config, ConnectionConfig, TableRef};

const KNOWN_DB_TYPES: &[&str] = &["postgres", "postgresql", "pg", "mysql", "mariadb"];
const VALID_SSL_MODES: &[&str] = &["disable", "require", "verify-ca", "verify-full"];

/// Validate the full configuration before anything connects.
pub fn validate(config: &Config) -> Result<()> {
    if config.connections.is_empty() {
        return Err(ReconError::Config(
            "no connections defined".to_string(),
        ));
    }

    for (name, conn) in &config.connections {
        validate_connection(name, conn)?;
    }

    validate_table_ref("compare.source", &config.compare.source, config)?;
    validate_table_ref("compare.target", &config.compare.target, config)?;

    if config.compare.columns.is_empty() {
        return Err(ReconError::Config(
            "compare.columns is empty - at least the key column must be mapped".to_string(),
        ));
    }

    Ok(())
}

fn validate_connection(name: &str, conn: &ConnectionConfig) -> Result<()> {
    let db_type = conn.db_type.to_lowercase();
    if !KNOWN_DB_TYPES.contains(&db_type.as_str()) {
        return Err(ReconError::Config(format!(
            "connection '{}': unknown database type '{}'. Supported types: postgres, mysql",
            name, conn.db_type
        )));
    }

    if conn.host.is_empty() {
        return Err(ReconError::Config(format!(
            "connection '{}': host must not be empty",
            name
        )));
    }
    if conn.database.is_empty() {
        return Err(ReconError::Config(format!(
            "connection '{}': database must not be empty",
            name
        )));
    }
    if conn.user.is_empty() {
        return Err(ReconError::Config(format!(
            "connection '{}': user must not be empty",
            name
        )));
    }

    if !conn.is_mysql() && !VALID_SSL_MODES.contains(&conn.ssl_mode.to_lowercase().as_str()) {
        return Err(ReconError::Config(format!(
            "connection '{}': invalid ssl_mode '{}'. Valid options: disable, require, verify-ca, verify-full",
            name, conn.ssl_mode
        )));
    }

    Ok(())
}

fn validate_table_ref(field: &str, table_ref: &TableRef, config: &Config) -> Result<()> {
    if table_ref.table.is_empty() {
        return Err(ReconError::Config(format!(
            "{}: table must not be empty",
            field
        )));
    }
    if !config.connections.contains_key(&table_ref.connection) {
        return Err(ReconError::Config(format!(
            "{}: unknown connection '{}'",
            field, table_ref.connection
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::types::Config;

    const VALID_YAML: &str = r#"
connections:
  src:
    type: postgres
    host: localhost
    database: appdb
    user: app
    password: secret
  tgt:
    type: mysql
    host: db.example.com
    port: 3307
    database: appdb
    user: app
    password: secret
compare:
  source:
    connection: src
    table: public.users
  target:
    connection: tgt
    table: users
  columns:
    - source: id
      target: id
    - source: name
      target: full_name
  skip_columns:
    - updated_at
"#;

    #[test]
    fn test_valid_config_parses() {
        let config = Config::from_yaml(VALID_YAML).unwrap();
        assert_eq!(config.connections.len(), 2);
        assert_eq!(config.compare.columns.len(), 2);
        assert_eq!(config.connections["src"].get_port(), 5432);
        assert_eq!(config.connections["tgt"].get_port(), 3307);
        assert_eq!(config.connections["src"].get_max_connections(), 5);
    }

    #[test]
    fn test_unknown_connection_rejected() {
        let yaml = VALID_YAML.replace("connection: tgt", "connection: nosuch");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_unknown_db_type_rejected() {
        let yaml = VALID_YAML.replace("type: mysql", "type: oracle");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_empty_columns_rejected() {
        let yaml = r#"
connections:
  src:
    host: localhost
    database: appdb
    user: app
    password: secret
compare:
  source:
    connection: src
    table: a
  target:
    connection: src
    table: b
  columns: []
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }
}
