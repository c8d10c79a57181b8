//! rpc-sentinel CLI - RPC endpoint health probing and selection for Base

use clap::Parser;
use rpc_sentinel::cli::{self, Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Gate => cli::gate::handle(&cli).await,
        Commands::Probe { url } => cli::endpoints::handle_probe(&cli, url).await,
        Commands::Monitor(args) => cli::monitor::handle(&cli, args).await,
        Commands::Diagnose(args) => cli::diagnose::handle(&cli, args).await,
        Commands::Endpoints { action } => cli::endpoints::handle(&cli, action).await,
        Commands::Config { action } => cli::config::handle(action).await,
    }
}
