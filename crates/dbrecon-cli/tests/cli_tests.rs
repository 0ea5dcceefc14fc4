//! CLI integration tests for dbrecon.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the dbrecon binary.
fn cmd() -> Command {
    Command::cargo_bin("dbrecon").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("joined"))
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("columns"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_compare_subcommand_help() {
    cmd()
        .args(["compare", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--export"))
        .stdout(predicate::str::contains("--out"));
}

#[test]
fn test_joined_subcommand_help() {
    cmd()
        .args(["joined", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--connection"))
        .stdout(predicate::str::contains("--source-table"))
        .stdout(predicate::str::contains("--target-table"))
        .stdout(predicate::str::contains("--key"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbrecon"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_io_error() {
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_invalid_yaml_exits_with_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    // Empty file is invalid YAML config

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_connection_in_compare_exits_with_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
connections:
  src:
    type: postgres
    host: localhost
    database: appdb
    user: app
    password: secret
compare:
  source:
    connection: src
    table: users
  target:
    connection: nosuch
    table: users
  columns:
    - source: id
      target: id
"#
    )
    .unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "compare"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown connection"));
}

#[test]
fn test_empty_column_mapping_exits_with_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
connections:
  src:
    type: postgres
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
"#
    )
    .unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "compare"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_db_type_exits_with_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
connections:
  src:
    type: oracle
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
  columns:
    - source: id
      target: id
"#
    )
    .unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "compare"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown database type"));
}

// =============================================================================
// Subcommand Existence Tests
// =============================================================================

#[test]
fn test_health_check_command_exists() {
    cmd()
        .args(["health-check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test every configured connection"));
}

#[test]
fn test_tables_requires_connection() {
    cmd()
        .args(["tables"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--connection"));
}

#[test]
fn test_columns_requires_table() {
    cmd()
        .args(["columns", "--connection", "src"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--table"));
}

// =============================================================================
// Config Path Tests
// =============================================================================

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
