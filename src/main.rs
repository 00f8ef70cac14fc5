//! Scenario CLI - manage and run manual test scenarios
//!
//! Scenarios live on a remote backend when one is reachable and in local
//! data files when it is not; runs are delegated to the backend or
//! simulated locally.

use clap::Parser;
use scenario::{cli, commands, common};

use commands::Commands;

#[derive(Parser)]
#[command(name = "scenario", about = "Manage and run manual test scenarios")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
