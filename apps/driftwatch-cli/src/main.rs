//! driftwatch - compare device inventory between Syncro and Huntress
//!
//! Fetches the full asset list from both services concurrently, matches
//! devices by normalized name, and reports which devices exist in one
//! service but not the other.

use clap::{CommandFactory, Parser, ValueEnum};
use driftwatch_core::prelude::{FetchOrchestrator, ReconcileOptions, SortOrder};
use driftwatch_huntress::{HuntressClient, HuntressConfig};
use driftwatch_syncro::{SyncroClient, SyncroConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod error;
mod output;
mod settings;

use error::CliResult;
use settings::Settings;

/// Compare Syncro and Huntress agents
#[derive(Parser)]
#[command(name = "driftwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Compare Syncro and Huntress agents
    #[arg(short, long)]
    compare: bool,

    /// Output results to file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Sort matched devices to the top instead of mismatches
    #[arg(long)]
    matches_first: bool,

    /// Path to the settings file
    #[arg(long, value_name = "PATH", default_value = settings::DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Ascii,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    if !cli.compare {
        Cli::command().print_help()?;
        return Ok(());
    }

    let settings = settings::load_settings(&cli.settings)?;
    init_logging(cli.debug || settings.debug);

    let (syncro, huntress) = build_clients(&settings)?;

    let options = ReconcileOptions {
        sort_order: if cli.matches_first {
            SortOrder::MatchesFirst
        } else {
            SortOrder::MismatchesFirst
        },
        ..Default::default()
    };

    let orchestrator = FetchOrchestrator::new(syncro, huntress).with_options(options);
    let result = orchestrator.run().await?;

    output::print_table(&result, !cli.no_color);

    if let Some(path) = &cli.output {
        match cli.format {
            OutputFormat::Csv => output::write_csv(path, &result)?,
            OutputFormat::Ascii => output::write_ascii_table(path, &result)?,
        }
        println!("Results written to {}", path.display());
    }

    Ok(())
}

fn build_clients(settings: &Settings) -> CliResult<(SyncroClient, HuntressClient)> {
    let syncro = SyncroClient::new(SyncroConfig::new(
        &settings.syncro_api_key,
        &settings.syncro_subdomain,
    ))?;
    let huntress = HuntressClient::new(HuntressConfig::new(
        &settings.huntress_api_key,
        &settings.huntress_secret_key,
    ))?;
    Ok((syncro, huntress))
}

/// Initialize tracing. `RUST_LOG` wins; otherwise `info`, or `debug` when
/// asked for via `--debug` or the settings file.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
