//! `monitor` command - periodic health probing of one endpoint

use super::{build_candidates, format_sample, transport, Cli};
use crate::config::{Candidate, ConfigFile};
use crate::monitor::{indicator_visible, BuildMode, HealthMonitor, DEFAULT_INTERVAL};
use crate::rpc::HealthStatus;
use clap::Args;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct MonitorArgs {
    /// Endpoint to watch (default: first candidate in the list)
    #[arg(long)]
    pub url: Option<String>,

    /// Seconds between probes (default: config file setting, then 30)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after N probes (default: run until Ctrl-C)
    #[arg(long)]
    pub count: Option<u32>,
}

pub async fn handle(cli: &Cli, args: &MonitorArgs) -> anyhow::Result<()> {
    let target = match &args.url {
        Some(url) => Candidate::from_url(url),
        None => build_candidates(&cli.rpc)?.remove(0),
    };
    let transport = transport(&cli.rpc)?;

    let interval = args.interval.unwrap_or_else(|| {
        ConfigFile::load_default()
            .ok()
            .flatten()
            .map(|cf| cf.settings.monitor_interval_seconds)
            .unwrap_or_else(|| DEFAULT_INTERVAL.as_secs())
    });

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let monitor = HealthMonitor::new(transport, target.name, target.url.clone(), cancel.clone())
        .with_interval(Duration::from_secs(interval));

    if !cli.quiet {
        eprintln!(
            "Watching {} every {}s (Ctrl-C to stop)",
            target.url, interval
        );
    }

    let mode = BuildMode::current();
    let mut probes = 0;
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let sample = monitor.probe_once().await;
        if indicator_visible(sample.status, mode) {
            let marker = match sample.status {
                HealthStatus::Healthy => "*",
                HealthStatus::Degraded => "!",
                HealthStatus::Down => "x",
            };
            println!("{} {}", marker, format_sample(&sample));
        }

        probes += 1;
        if args.count.is_some_and(|n| probes >= n) {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
        }
    }

    Ok(())
}
