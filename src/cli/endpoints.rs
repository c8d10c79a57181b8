//! `endpoints` and `probe` commands

use super::{build_candidates, transport, Cli};
use crate::config::Candidate;
use crate::rpc::{Prober, RpcTransport};
use clap::Subcommand;
use std::io::Write;

#[derive(Subcommand)]
pub enum EndpointCommands {
    /// List the candidate list for the current environment
    List,

    /// Probe an endpoint and check its batch behavior
    Test {
        /// RPC URL to test
        url: String,
    },
}

pub async fn handle(cli: &Cli, action: &EndpointCommands) -> anyhow::Result<()> {
    match action {
        EndpointCommands::List => {
            let candidates = build_candidates(&cli.rpc)?;

            println!("CANDIDATE ENDPOINTS ({}, probe order)\n", candidates.len());
            for (i, candidate) in candidates.iter().enumerate() {
                println!(
                    "{:>3}. {:<16} {}{}",
                    i + 1,
                    candidate.name,
                    candidate.url,
                    if candidate.enabled { "" } else { "  (disabled)" }
                );
            }
        }

        EndpointCommands::Test { url } => {
            handle_probe(cli, url).await?;
        }
    }

    Ok(())
}

pub async fn handle_probe(cli: &Cli, url: &str) -> anyhow::Result<()> {
    println!("Testing endpoint: {}\n", url);

    let candidate = Candidate::from_url(url);
    let prober = Prober::new(transport(&cli.rpc)?);

    print!("[1/2] Block number.............. ");
    std::io::stdout().flush()?;

    let sample = prober.probe(&candidate.name, &candidate.url).await;
    match sample.latency_ms() {
        Some(ms) => println!("✓ {}ms ({})", ms, sample.status),
        None => {
            println!(
                "✗ FAILED: {}",
                sample.error.as_deref().unwrap_or("unknown error")
            );
            return Ok(());
        }
    }

    print!("[2/2] Batch of 10............... ");
    std::io::stdout().flush()?;

    match prober.transport().call_batch(url, 10).await {
        Ok(()) => println!("✓ OK"),
        Err(e) => println!("✗ FAILED: {}", e),
    }

    println!("\nEndpoint test complete.");
    Ok(())
}
