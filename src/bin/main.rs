//! Schemalens CLI - inspect a database schema
//!
//! Usage:
//!   schemalens inspect [--connection <name>] [--schema <name>...] [--format outline|json]
//!   schemalens dump <out.json> [--connection <name>] [--schema <name>...]
//!   schemalens replay <snapshot.json> [--format outline|json]
//!
//! Without `--connection`, the connection is read from `SCHEMALENS_DB_*`
//! environment variables.

use clap::{Parser, Subcommand, ValueEnum};
use schemalens::assembler::ModelAssembler;
use schemalens::config::{ConnectionConfig, Settings};
use schemalens::dialect::{adapter_for, type_mapper_for};
use schemalens::inference::NamingStrategy;
use schemalens::metadata::RawMetadata;
use schemalens::model::DatabaseModel;
use schemalens::Diagnostics;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "schemalens")]
#[command(about = "Schemalens - relational schema introspection across SQL dialects")]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by SCHEMALENS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect a live database and print the model
    Inspect {
        #[command(flatten)]
        target: Target,

        /// Output format
        #[arg(short, long, default_value = "outline")]
        format: OutputFormat,

        /// Plural rule for synthetic column names (defaults to settings)
        #[arg(short, long)]
        naming: Option<NamingArg>,
    },

    /// Fetch raw metadata from a live database and save it as JSON
    Dump {
        /// Output file
        out: PathBuf,

        #[command(flatten)]
        target: Target,
    },

    /// Build the model from a saved snapshot
    Replay {
        /// Snapshot file written by `dump`
        snapshot: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "outline")]
        format: OutputFormat,

        /// Plural rule for synthetic column names (defaults to settings)
        #[arg(short, long)]
        naming: Option<NamingArg>,
    },
}

#[derive(clap::Args)]
struct Target {
    /// Named connection from schemalens.toml
    #[arg(short, long)]
    connection: Option<String>,

    /// Schema to inspect (repeatable; defaults to the driver's default schema)
    #[arg(short, long = "schema")]
    schemas: Vec<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Plain-text outline
    Outline,
    /// Model as JSON
    Json,
}

#[derive(Clone, ValueEnum)]
enum NamingArg {
    Plain,
    Inflected,
}

impl From<NamingArg> for NamingStrategy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Plain => NamingStrategy::Plain,
            NamingArg::Inflected => NamingStrategy::Inflected,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Inspect {
            target,
            format,
            naming,
        } => cmd_inspect(&settings, target, format, naming).await,
        Commands::Dump { out, target } => cmd_dump(&settings, out, target).await,
        Commands::Replay {
            snapshot,
            format,
            naming,
        } => cmd_replay(&settings, snapshot, format, naming),
    }
}

fn init_tracing(verbose: bool) -> Result<(), String> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("SCHEMALENS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {}", e))
}

fn resolve_target(settings: &Settings, target: Target) -> Result<ConnectionConfig, String> {
    let config = match &target.connection {
        Some(name) => settings
            .get_connection(name)
            .and_then(|c| c.resolve())
            .map_err(|e| e.to_string())?,
        None => ConnectionConfig::from_env().map_err(|e| e.to_string())?,
    };
    if target.schemas.is_empty() {
        Ok(config)
    } else {
        Ok(config.with_schemas(target.schemas))
    }
}

fn naming_for(settings: &Settings, arg: Option<NamingArg>) -> NamingStrategy {
    arg.map(NamingStrategy::from)
        .unwrap_or(settings.naming.strategy)
}

async fn cmd_inspect(
    settings: &Settings,
    target: Target,
    format: OutputFormat,
    naming: Option<NamingArg>,
) -> ExitCode {
    let config = match resolve_target(settings, target) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut adapter = adapter_for(&config, settings);
    let mut diagnostics = Diagnostics::new();
    let assembler = ModelAssembler::new(naming_for(settings, naming));

    match assembler
        .introspect(adapter.as_mut(), &config, &mut diagnostics)
        .await
    {
        Ok(model) => print_model(&model, &diagnostics, format),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_dump(settings: &Settings, out: PathBuf, target: Target) -> ExitCode {
    let config = match resolve_target(settings, target) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut adapter = adapter_for(&config, settings);
    let raw = match ModelAssembler::default()
        .fetch(adapter.as_mut(), &config)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = raw.save(&out) {
        eprintln!("Error writing {}: {}", out.display(), e);
        return ExitCode::FAILURE;
    }

    eprintln!(
        "Wrote {} tables, {} columns, {} index columns, {} foreign key columns to {}",
        raw.tables.len(),
        raw.columns.len(),
        raw.indexes.len(),
        raw.foreign_keys.len(),
        out.display()
    );
    ExitCode::SUCCESS
}

fn cmd_replay(
    settings: &Settings,
    snapshot: PathBuf,
    format: OutputFormat,
    naming: Option<NamingArg>,
) -> ExitCode {
    let raw = match RawMetadata::load(&snapshot) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading {}: {}", snapshot.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut diagnostics = Diagnostics::new();
    let model = ModelAssembler::new(naming_for(settings, naming)).assemble(
        &raw,
        type_mapper_for(raw.driver),
        &mut diagnostics,
    );
    print_model(&model, &diagnostics, format)
}

fn print_model(model: &DatabaseModel, diagnostics: &Diagnostics, format: OutputFormat) -> ExitCode {
    match format {
        OutputFormat::Outline => print!("{}", model.outline()),
        OutputFormat::Json => match serde_json::to_string_pretty(model) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing model: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    eprintln!(
        "{} entities, {} relations; {}",
        model.entities.len(),
        model.owner_relation_count(),
        diagnostics.summary()
    );
    ExitCode::SUCCESS
}
