//! tilegeo CLI - Command-line interface
//!
//! Queries the tile-partitioned address dataset from the terminal.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::admin::{CountryArgs, HierarchyArgs};
use commands::catalog::{PartitionsArgs, PostcodesArgs};
use commands::config::ConfigCommands;
use commands::lookup::{NumberArgs, PostcodeArgs};
use commands::query::{GeocodeArgs, ReverseArgs};
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "tilegeo")]
#[command(version = tilegeo::VERSION)]
#[command(about = "Geocode addresses from tile-partitioned remote data", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.tilegeo/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search addresses by free text
    Geocode(GeocodeArgs),

    /// Find the addresses nearest to a point
    Reverse(ReverseArgs),

    /// Look up addresses by postcode
    Postcode(PostcodeArgs),

    /// Look up addresses by house number
    Number(NumberArgs),

    /// Show the country containing a point
    Country(CountryArgs),

    /// Show country, region and district of a point
    Hierarchy(HierarchyArgs),

    /// List known postcodes
    Postcodes(PostcodesArgs),

    /// List partitions of a region
    Partitions(PartitionsArgs),

    /// Show catalog statistics
    Stats,

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands must work without network access
    let command = match cli.command {
        Commands::Config(command) => return commands::config::run(command, cli.config.as_deref()),
        other => other,
    };

    let runner = CliRunner::new(cli.config.as_deref())?;
    runner.log_startup();
    let geocoder = runner.create_geocoder().await?;
    let json = cli.json;

    let result = match command {
        Commands::Geocode(args) => commands::query::run_geocode(&geocoder, args, json).await,
        Commands::Reverse(args) => commands::query::run_reverse(&geocoder, args, json).await,
        Commands::Postcode(args) => commands::lookup::run_postcode(&geocoder, args, json).await,
        Commands::Number(args) => commands::lookup::run_number(&geocoder, args, json).await,
        Commands::Country(args) => commands::admin::run_country(&geocoder, args, json).await,
        Commands::Hierarchy(args) => commands::admin::run_hierarchy(&geocoder, args, json).await,
        Commands::Postcodes(args) => commands::catalog::run_postcodes(&geocoder, args, json),
        Commands::Partitions(args) => commands::catalog::run_partitions(&geocoder, args, json),
        Commands::Stats => commands::catalog::run_stats(&geocoder, json),
        Commands::Config(_) => Ok(()),
    };

    geocoder.close().await;
    result
}
