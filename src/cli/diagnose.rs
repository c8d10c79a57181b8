//! `diagnose` command - batch-size / rate-limit survey with recommendations

use super::{build_candidates, transport, Cli};
use crate::diagnose::{DiagnoseOptions, DiagnosticReport, Diagnostics};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Args)]
pub struct DiagnoseArgs {
    /// Sustained-rate window per endpoint, in seconds
    #[arg(long, default_value = "5")]
    pub window: u64,

    /// Pause between endpoints, in seconds
    #[arg(long, default_value = "2")]
    pub pause: u64,
}

pub async fn handle(cli: &Cli, args: &DiagnoseArgs) -> anyhow::Result<()> {
    let candidates = build_candidates(&cli.rpc)?;
    let transport = transport(&cli.rpc)?;

    let options = DiagnoseOptions {
        window: Duration::from_secs(args.window),
        pause: Duration::from_secs(args.pause),
        ..Default::default()
    };
    let diagnostics = Diagnostics::new(transport).with_options(options);

    let enabled = candidates.iter().filter(|c| c.enabled).count();
    let pb = if !cli.quiet {
        let pb = ProgressBar::new(enabled as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let report = diagnostics
        .run_with(&candidates, |r| {
            if let Some(pb) = &pb {
                pb.inc(1);
                pb.set_message(r.name.clone());
            }
        })
        .await;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &DiagnosticReport) {
    println!("ENDPOINT SURVEY ({} tested)\n", report.reports.len());
    println!(
        "{:<16} {:>9} {:>10} {:>14}  NOTES",
        "ENDPOINT", "LATENCY", "MAX BATCH", "CALLS/WINDOW"
    );

    for r in &report.reports {
        let latency = r
            .latency_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "-".to_string());
        let calls = r
            .calls_before_limit
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let notes = if let Some(error) = &r.error {
            error.clone()
        } else if r.rate_limited {
            "rate limited".to_string()
        } else {
            "ok".to_string()
        };

        println!(
            "{:<16} {:>9} {:>10} {:>14}  {}",
            r.name, latency, r.max_batch, calls, notes
        );
    }

    match &report.recommendation {
        Some(rec) => {
            println!("\nRECOMMENDED CONFIGURATION (copy into your deployment env):");
            println!("  RPC_PRIMARY_URL={}", rec.primary.url);
            if let Some(fallback) = &rec.fallback {
                println!("  RPC_FALLBACK_URL={}", fallback.url);
            }
            println!("  RPC_MAX_BATCH={}", rec.suggested_batch);
        }
        None => {
            println!("\nNo endpoint answered - nothing to recommend.");
        }
    }
}
