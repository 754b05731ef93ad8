//! NFT Picker - Session Simulation
//!
//! Plays a picker session against in-memory services and prints the
//! resulting catalog, selection and form values.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nft_picker_logging::{LogConfig, PickerSubscriberBuilder};

use nft_picker_simulation::{Fixture, Report, demo_fixture, run_fixture};

#[derive(Parser)]
#[command(
    name = "nft-picker-simulation",
    about = "Run NFT picker sessions against fixture data",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the report as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario from a JSON fixture
    Run {
        /// Path to the fixture file
        fixture: PathBuf,
    },

    /// Run the built-in wallet scenario
    Demo,
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.render());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let _log_guard = PickerSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .with_level(level)
        .init()?;

    let fixture = match cli.command {
        Commands::Run { fixture } => Fixture::load(&fixture)?,
        Commands::Demo => demo_fixture()?,
    };

    let report = run_fixture(&fixture).await?;
    print_report(&report, cli.json)
}
