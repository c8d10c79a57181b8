//! `gate` command - blocking startup endpoint selection

use super::{build_candidates, format_sample, transport, Cli};
use crate::gate::{StartupGate, GATE_ACCEPT_MS};
use tokio_util::sync::CancellationToken;

pub async fn handle(cli: &Cli) -> anyhow::Result<()> {
    let candidates = build_candidates(&cli.rpc)?;
    let transport = transport(&cli.rpc)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    if !cli.quiet {
        eprintln!("Probing up to {} candidates...", candidates.len());
    }

    let gate = StartupGate::new(transport, cancel);
    let outcome = gate.run(&candidates).await;

    for sample in &outcome.samples {
        println!("  {}", format_sample(sample));
    }

    match &outcome.selected {
        Some(candidate) => {
            println!("\nSelected: {} ({})", candidate.name, candidate.url);
        }
        None if outcome.cancelled => {
            println!("\nCancelled before any candidate qualified");
        }
        None => {
            println!(
                "\nNo candidate answered under {}ms - releasing fail-open",
                GATE_ACCEPT_MS
            );
        }
    }

    Ok(())
}
