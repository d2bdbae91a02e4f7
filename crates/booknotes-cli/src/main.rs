//! booknotes CLI — export e-book highlights into a Markdown vault
//!
//! Commands: sync (default), locate, config

mod sync;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use booknotes_core::config::{Config, TimeZoneMode};
use booknotes_source::Locator;

#[derive(Parser)]
#[command(name = "booknotes")]
#[command(version)]
#[command(about = "Export e-book highlights into a Markdown vault")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ~/.booknotes/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Default)]
struct SourceArgs {
    /// Annotation database, skipping the search
    #[arg(long)]
    annotation_db: Option<PathBuf>,
    /// Library database, skipping the search
    #[arg(long)]
    library_db: Option<PathBuf>,
}

#[derive(clap::Args, Default)]
struct SyncArgs {
    /// Vault directory that receives the notes
    #[arg(long)]
    vault: Option<PathBuf>,
    /// Render timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,
    #[command(flatten)]
    sources: SourceArgs,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Export highlights into the vault and write the CSV snapshot
    Sync(SyncArgs),
    /// Print the located source databases as JSON
    Locate(SourceArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Output of the `locate` command.
#[derive(Serialize)]
struct LocateReport {
    annotation_db: PathBuf,
    library_db: PathBuf,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            path
        }
        None => Config::default_path()?,
    };
    Config::load(&path).with_context(|| format!("loading config {}", path.display()))
}

fn apply_sources(config: &mut Config, sources: SourceArgs) {
    if sources.annotation_db.is_some() {
        config.sources.annotation_db = sources.annotation_db;
    }
    if sources.library_db.is_some() {
        config.sources.library_db = sources.library_db;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config)?;

    match cli.command.unwrap_or(Commands::Sync(SyncArgs::default())) {
        Commands::Sync(args) => {
            if let Some(vault) = args.vault {
                config.vault_root = std::path::absolute(&vault)
                    .with_context(|| format!("resolving vault path {}", vault.display()))?;
            }
            if args.utc {
                config.timezone = TimeZoneMode::Utc;
            }
            apply_sources(&mut config, args.sources);

            let locator = Locator::for_current_user()?;
            let report = sync::run(&config, &locator)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Locate(sources) => {
            apply_sources(&mut config, sources);
            let paths = Locator::for_current_user()?
                .resolve(&config.sources)
                .context("locating source databases")?;
            let report = LocateReport {
                annotation_db: paths.annotation_db,
                library_db: paths.library_db,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
