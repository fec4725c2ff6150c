//! jsondb CLI
//!
//! Command-line interface for jsondb - single-file JSON document store.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jsondb_core::{Config, Database, DatabaseError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "jsondb")]
#[command(about = "jsondb - single-file JSON document store")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Database file (defaults to the configured database)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (defaults to ~/.config/jsondb/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database file
    Init,
    /// List all tables
    Tables,
    /// Manage tables
    Table {
        #[command(subcommand)]
        command: TableCommands,
    },
    /// Manage records
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },
    /// Print the whole document
    Dump,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum TableCommands {
    /// Create a new table
    #[command(alias = "add")]
    Create {
        /// Table name
        name: String,
        /// Initial content as a JSON object
        #[arg(short, long)]
        fields: Option<String>,
    },
    /// Drop a table and all of its records
    #[command(alias = "rm")]
    Drop {
        /// Table name
        name: String,
    },
    /// Show every record in a table
    Show {
        /// Table name
        name: String,
    },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Append a record, printing its new id
    Add {
        /// Table name
        table: String,
        /// Record as a JSON object
        json: String,
    },
    /// Show a record (or any key) of a table
    Get {
        /// Table name
        table: String,
        /// Record id or key
        key: String,
    },
    /// Add a new field to a record (never overwrites)
    Set {
        /// Table name
        table: String,
        /// Record id
        id: u64,
        /// Field name
        field: String,
        /// Field value (JSON, or a plain string)
        value: String,
    },
    /// Delete a record (or any key) from a table
    #[command(alias = "rm")]
    Delete {
        /// Table name
        table: String,
        /// Record id or key
        key: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, database, pretty, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e
                .downcast_ref::<DatabaseError>()
                .and_then(DatabaseError::storage)
                .and_then(|s| s.recovery_suggestion())
            {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the database
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    if let Commands::Init = cli.command {
        let path = cli.db.unwrap_or_else(|| config.database_path());
        return commands::database::init(&path, config.pretty, &output);
    }

    let mut db = open_database(cli.db, &config)?;

    match cli.command {
        Commands::Init | Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Tables => commands::table::list(&db, &output),
        Commands::Table { command } => handle_table_command(command, &mut db, &output),
        Commands::Record { command } => handle_record_command(command, &mut db, &output),
        Commands::Dump => commands::database::dump(&db, &output),
    }
}

/// Open an explicit `--db` path, or the configured database (created on first use)
fn open_database(path: Option<PathBuf>, config: &Config) -> Result<Database> {
    let db = match path {
        Some(path) => Database::open(&path)
            .with_context(|| format!("Failed to open database {:?}", path))?
            .with_pretty(config.pretty),
        None => Database::open_with_config(config).context("Failed to open database")?,
    };

    info!("Using database {:?}", db.path());
    Ok(db)
}

fn handle_table_command(command: TableCommands, db: &mut Database, output: &Output) -> Result<()> {
    match command {
        TableCommands::Create { name, fields } => {
            commands::table::create(db, name, fields, output)
        }
        TableCommands::Drop { name } => commands::table::drop(db, name, output),
        TableCommands::Show { name } => commands::table::show(db, name, output),
    }
}

fn handle_record_command(
    command: RecordCommands,
    db: &mut Database,
    output: &Output,
) -> Result<()> {
    match command {
        RecordCommands::Add { table, json } => commands::record::add(db, table, json, output),
        RecordCommands::Get { table, key } => commands::record::get(db, table, key, output),
        RecordCommands::Set {
            table,
            id,
            field,
            value,
        } => commands::record::set(db, table, id, field, value, output),
        RecordCommands::Delete { table, key } => {
            commands::record::delete(db, table, key, output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging when JSONDB_LOG is set
///
/// Logs go to `config.log_file` if configured, otherwise stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("JSONDB_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "jsondb_core={},jsondb_cli={}",
        log_level, log_level
    ));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore errors if a subscriber is already installed
    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = builder.with_ansi(false).with_writer(log_file).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_record_set() {
        let cli = Cli::try_parse_from([
            "jsondb", "--db", "budget.json", "record", "set", "default", "1", "test", "new value",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("budget.json")));
        match cli.command {
            Commands::Record {
                command:
                    RecordCommands::Set {
                        table,
                        id,
                        field,
                        value,
                    },
            } => {
                assert_eq!(table, "default");
                assert_eq!(id, 1);
                assert_eq!(field, "test");
                assert_eq!(value, "new value");
            }
            _ => panic!("expected record set"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["jsondb", "tables", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Tables));
    }

    #[test]
    fn test_open_explicit_missing_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");

        let err = open_database(Some(missing), &Config::default()).unwrap_err();

        let db_err = err.downcast_ref::<DatabaseError>().unwrap();
        assert!(db_err.is_not_found());
    }
}
