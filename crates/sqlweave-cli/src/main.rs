mod config;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sqlweave_core::{
    Catalog, Column, ConstraintRegistry, Error as CoreError, Operation, Table, Translator,
    validate_catalog,
};
use sqlweave_mysql::{MySqlTranslator, is_valid_dtype};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError};

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("cannot read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("{0}")]
    Check(String),
}

#[derive(Parser, Debug)]
#[command(name = "sqlweave", version, about = "sqlweave schema tools")]
struct Cli {
    /// Path to sqlweave.toml.
    #[arg(long, global = true, default_value = "sqlweave.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render CREATE TABLE statements for a schema snapshot.
    Render(RenderArgs),
    /// Check a schema snapshot against the model invariants.
    Check(CheckArgs),
    /// Parse a column definition and print its canonical form.
    ParseColumn(ParseColumnArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Schema snapshot: a JSON array of tables.
    snapshot: PathBuf,
    /// Render temporary tables.
    #[arg(long)]
    temporary: bool,
    /// Omit the `if not exists` guard.
    #[arg(long)]
    clobber: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Schema snapshot: a JSON array of tables.
    snapshot: PathBuf,
}

#[derive(Args, Debug)]
struct ParseColumnArgs {
    /// A definition such as `id int not null primary key`.
    definition: String,
    /// Print the parsed column as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    init_logging(&config);

    match cli.command {
        Command::Render(args) => render(args, &config),
        Command::Check(args) => check(args),
        Command::ParseColumn(args) => parse_column(args),
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_snapshot(path: &Path) -> Result<Vec<Table>, CliError> {
    let raw = std::fs::read_to_string(path)?;
    let mut tables: Vec<Table> = serde_json::from_str(&raw)?;
    for table in &mut tables {
        for column in &mut table.columns {
            column.normalize();
        }
    }
    Ok(tables)
}

fn render(args: RenderArgs, config: &Config) -> Result<(), CliError> {
    let tables = load_snapshot(&args.snapshot)?;
    tracing::info!(event = "snapshot_loaded", tables = tables.len());

    let translator = MySqlTranslator::new();
    let empty: Vec<Table> = Vec::new();
    let catalog = Catalog::new(&empty);
    let mut registry = ConstraintRegistry::new();

    for table in &tables {
        let op = Operation::CreateTable {
            table: table.name.clone(),
            columns: table.columns.clone(),
            temporary: args.temporary || config.render.temporary,
            clobber: args.clobber || config.render.clobber,
        };
        translator.validate(&op, &catalog, &mut registry)?;
        let sql = translator.translate(&op, &catalog)?;
        println!("{}", sql.text);
    }
    Ok(())
}

fn check(args: CheckArgs) -> Result<(), CliError> {
    let tables = load_snapshot(&args.snapshot)?;
    let registry = ConstraintRegistry::new();
    validate_catalog(&tables, &registry)?;

    let mut problems = Vec::new();
    for table in &tables {
        for column in &table.columns {
            if !is_valid_dtype(&column.dtype) {
                problems.push(format!(
                    "{}.{}: {} is not a MySQL column type",
                    table.name, column.name, column.dtype
                ));
            }
        }
    }
    if !problems.is_empty() {
        return Err(CliError::Check(problems.join("\n")));
    }

    println!("ok: {} tables", tables.len());
    Ok(())
}

fn parse_column(args: ParseColumnArgs) -> Result<(), CliError> {
    let column = Column::from_definition(&args.definition)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&column)?);
    } else {
        println!("{column}");
    }
    Ok(())
}
