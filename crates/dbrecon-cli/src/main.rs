//! dbrecon CLI - cross-database table reconciliation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use dbrecon::{
    compare_joined, ColumnPair, CompareEngine, CompareReport, ComparisonOutcome, Config,
    ConnectionRegistry, PoolImpl, ReconError,
};

#[derive(Parser)]
#[command(name = "dbrecon")]
#[command(about = "Cross-database table reconciliation")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the configured source and target tables
    Compare {
        /// Export results to a file in the given format
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,

        /// Output path for the export [default: results.<format>]
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compare two tables visible from one connection with a joined query
    Joined {
        /// Logical connection name to run the query on
        #[arg(long)]
        connection: String,

        /// Override the configured source table
        #[arg(long)]
        source_table: Option<String>,

        /// Override the configured target table
        #[arg(long)]
        target_table: Option<String>,

        /// Join key column(s); discovered from table metadata when omitted
        #[arg(long)]
        key: Vec<String>,
    },

    /// List base tables on a connection
    Tables {
        /// Logical connection name
        #[arg(long)]
        connection: String,
    },

    /// List a table's columns in ordinal order
    Columns {
        /// Logical connection name
        #[arg(long)]
        connection: String,

        /// Table name, optionally schema-qualified
        #[arg(long)]
        table: String,
    },

    /// Test every configured connection
    HealthCheck,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ReconError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let registry = ConnectionRegistry::new();

    let outcome = dispatch(&cli, &config, &registry).await;
    registry.close_all().await;
    outcome
}

async fn dispatch(
    cli: &Cli,
    config: &Config,
    registry: &ConnectionRegistry,
) -> Result<(), ReconError> {
    match &cli.command {
        Commands::Compare { export, out } => {
            let spec = &config.compare;
            let source = connect(registry, config, &spec.source.connection).await?;
            let target = connect(registry, config, &spec.target.connection).await?;

            let report = CompareEngine::new(source, target).compare(spec).await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }

            if let Some(format) = export {
                let path = out.clone().unwrap_or_else(|| match format {
                    ExportFormat::Csv => PathBuf::from("results.csv"),
                    ExportFormat::Json => PathBuf::from("results.json"),
                });
                match format {
                    ExportFormat::Csv => export_csv(&report, &path)?,
                    ExportFormat::Json => std::fs::write(&path, report.to_json()?)?,
                }
                println!("Exported {} result(s) to {:?}", report.results.len(), path);
            }
        }

        Commands::Joined {
            connection,
            source_table,
            target_table,
            key,
        } => {
            let pool = connect(registry, config, connection).await?;
            let spec = &config.compare;
            let source_table = source_table.as_deref().unwrap_or(&spec.source.table);
            let target_table = target_table.as_deref().unwrap_or(&spec.target.table);

            let key_pairs = if key.is_empty() {
                discover_key_pairs(&pool, source_table).await?
            } else {
                key.iter().map(|k| ColumnPair::new(k, k)).collect()
            };

            let mapping = spec.mapping().resolve(&spec.skip_columns)?;
            let diffs = compare_joined(
                &pool,
                source_table,
                target_table,
                &key_pairs,
                mapping.pairs(),
            )
            .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&diffs)?);
            } else {
                let mismatched = diffs.iter().filter(|d| !d.matched).count();
                println!(
                    "Joined comparison of {} vs {}: {} row(s) flagged, {} with real differences",
                    source_table,
                    target_table,
                    diffs.len(),
                    mismatched
                );
                for diff in diffs.iter().filter(|d| !d.matched) {
                    println!("  #{}:", diff.id);
                    for (column, a) in &diff.source_values {
                        let b = diff.target_values.get(column).cloned().flatten();
                        if a != &b {
                            println!(
                                "    {}: {} -> {}",
                                column,
                                render(a.as_deref()),
                                render(b.as_deref())
                            );
                        }
                    }
                }
            }
        }

        Commands::Tables { connection } => {
            let pool = connect(registry, config, connection).await?;
            let tables = pool.list_tables().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in &tables {
                    println!("{}", table);
                }
            }
        }

        Commands::Columns { connection, table } => {
            let pool = connect(registry, config, connection).await?;
            let columns = pool.list_columns(table).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                for column in &columns {
                    println!("{}", column);
                }
            }
        }

        Commands::HealthCheck => {
            let mut failures = 0usize;
            for (name, conn) in &config.connections {
                let started = std::time::Instant::now();
                let status = match registry.get_or_connect(name, conn).await {
                    Ok(pool) => pool.test_connection().await,
                    Err(e) => Err(e),
                };
                let latency_ms = started.elapsed().as_millis();

                match status {
                    Ok(()) => println!("  {} ({}): OK ({}ms)", name, conn.db_type, latency_ms),
                    Err(e) => {
                        failures += 1;
                        println!("  {} ({}): FAILED", name, conn.db_type);
                        println!("    Error: {}", e);
                    }
                }
            }

            if failures > 0 {
                return Err(ReconError::Config(format!(
                    "Health check failed for {} connection(s)",
                    failures
                )));
            }
            println!("\n  Overall: HEALTHY");
        }
    }

    Ok(())
}

async fn connect(
    registry: &ConnectionRegistry,
    config: &Config,
    name: &str,
) -> Result<Arc<PoolImpl>, ReconError> {
    let conn = config
        .connections
        .get(name)
        .ok_or_else(|| ReconError::Config(format!("unknown connection '{}'", name)))?;
    registry.get_or_connect(name, conn).await
}

/// Join keys for the joined strategy: primary key first, unique index
/// columns as the fallback.
async fn discover_key_pairs(pool: &PoolImpl, table: &str) -> Result<Vec<ColumnPair>, ReconError> {
    let mut keys = pool.list_primary_key_columns(table).await?;
    if keys.is_empty() {
        keys = pool.list_unique_index_columns(table).await?;
    }
    if keys.is_empty() {
        return Err(ReconError::Config(
            "No primary key or unique columns found for comparison".to_string(),
        ));
    }
    Ok(keys.into_iter().map(|k| ColumnPair::new(&k, &k)).collect())
}

fn print_report(report: &CompareReport) {
    if report.is_in_sync() {
        println!("Tables are in sync.");
    } else {
        println!("Found {} difference(s):", report.results.len());
        println!(
            "  Mismatched: {}",
            report.count(ComparisonOutcome::Mismatched)
        );
        println!(
            "  Missing in target: {}",
            report.count(ComparisonOutcome::MissingTarget)
        );
        println!(
            "  Missing in source: {}",
            report.count(ComparisonOutcome::MissingSource)
        );
    }
    println!(
        "  Rows: {} source / {} target",
        report.source_rows, report.target_rows
    );
    if report.duplicate_source_keys > 0 || report.duplicate_target_keys > 0 {
        println!(
            "  Duplicate keys: {} source / {} target (last row kept)",
            report.duplicate_source_keys, report.duplicate_target_keys
        );
    }
    println!("  Duration: {}ms", report.duration_ms);

    for result in &report.results {
        println!("\n  #{} key={} [{}]", result.id, result.key, result.outcome);
        for (column, diff) in &result.differences {
            println!(
                "    {}: {} -> {}",
                column,
                render(diff.source_value.as_deref()),
                render(diff.target_value.as_deref())
            );
        }
    }
}

fn render(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "NULL".to_string(),
    }
}

/// Write one CSV line per difference entry.
fn export_csv(report: &CompareReport, path: &PathBuf) -> Result<(), ReconError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["id", "key", "outcome", "column", "source_value", "target_value"])
        .map_err(csv_err)?;

    for result in &report.results {
        for (column, diff) in &result.differences {
            writer
                .write_record([
                    result.id.to_string().as_str(),
                    &result.key,
                    &result.outcome.to_string(),
                    column,
                    diff.source_value.as_deref().unwrap_or(""),
                    diff.target_value.as_deref().unwrap_or(""),
                ])
                .map_err(csv_err)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn csv_err(e: csv::Error) -> ReconError {
    ReconError::Io(std::io::Error::other(e))
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
