//! CLI command modules
//!
//! Each subcommand has its own module with argument definitions and handlers.

pub mod config;
pub mod diagnose;
pub mod endpoints;
pub mod gate;
pub mod monitor;

use crate::config::{candidate_list, Candidate, ConfigFile, ProviderKeys, Settings};
use crate::rpc::{HealthSample, HttpTransport};
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rpc-sentinel")]
#[command(
    version,
    about = "RPC endpoint health probing, startup selection, and rate-limit diagnostics for Base"
)]
#[command(after_help = r#"EXAMPLES:
    # Pick the first endpoint fast enough to boot against
    rpc-sentinel gate

    # Watch the active endpoint, one probe every 30s
    rpc-sentinel monitor --url https://mainnet.base.org

    # Survey all candidates for batch-size and rate limits
    rpc-sentinel diagnose

    # Probe a single endpoint once
    rpc-sentinel probe https://mainnet.base.org

    # Show the candidate list for the current environment
    rpc-sentinel endpoints list

ENVIRONMENT VARIABLES:
    ALCHEMY_API_KEY       Enables the Alchemy candidate
    INFURA_API_KEY        Enables the Infura candidate
    ANKR_API_KEY          Enables the Ankr candidate
    QUICKNODE_BASE_URL    Full QuickNode endpoint URL

CONFIG FILE:
    Default: ~/.config/rpc-sentinel/config.toml
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub rpc: RpcArgs,
}

#[derive(Args)]
pub struct RpcArgs {
    /// Use only this RPC endpoint (can be repeated)
    #[arg(long = "rpc", action = clap::ArgAction::Append, global = true)]
    pub rpc_urls: Vec<String>,

    /// Add an endpoint to the candidate list (can be repeated)
    #[arg(long = "add-rpc", action = clap::ArgAction::Append, global = true)]
    pub add_rpc: Vec<String>,

    /// Exclude an endpoint from the candidate list (can be repeated)
    #[arg(long = "exclude-rpc", action = clap::ArgAction::Append, global = true)]
    pub exclude_rpc: Vec<String>,

    /// Load candidate URLs from file, one per line
    #[arg(long, global = true)]
    pub rpc_file: Option<PathBuf>,

    /// Probe timeout in seconds (default: config file setting, then 5)
    #[arg(long, env = "RPC_PROBE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe candidates in order, pick the first fast enough to boot with
    Gate,

    /// Probe a single endpoint once
    Probe {
        /// RPC URL to probe
        url: String,
    },

    /// Periodically probe the active endpoint and report its health
    Monitor(monitor::MonitorArgs),

    /// Survey candidates for batch-size and rate limits, recommend settings
    Diagnose(diagnose::DiagnoseArgs),

    /// Manage candidate endpoints
    Endpoints {
        #[command(subcommand)]
        action: endpoints::EndpointCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigCommands,
    },
}

/// Build the candidate list from environment, config file, and CLI overrides
///
/// `--rpc` replaces the whole list; everything else layers on top of the
/// env-gated defaults the way the config file describes.
pub fn build_candidates(args: &RpcArgs) -> anyhow::Result<Vec<Candidate>> {
    if !args.rpc_urls.is_empty() {
        return Ok(args.rpc_urls.iter().map(|u| Candidate::from_url(u)).collect());
    }

    let config_file = ConfigFile::load_default().ok().flatten();

    let mut keys = ProviderKeys::from_env();
    if let Some(cf) = &config_file {
        keys = keys.overlay(&cf.keys);
    }
    let mut candidates = candidate_list(&keys);

    if let Some(cf) = &config_file {
        for endpoint in &cf.endpoints {
            if !candidates.iter().any(|c| c.url == endpoint.url) {
                candidates.push(endpoint.to_candidate());
            }
        }
    }

    for url in &args.add_rpc {
        if !candidates.iter().any(|c| &c.url == url) {
            candidates.push(Candidate::from_url(url));
        }
    }

    if let Some(path) = &args.rpc_file {
        let content = std::fs::read_to_string(path)?;
        for line in content.lines() {
            let url = line.trim();
            if !url.is_empty()
                && !url.starts_with('#')
                && !candidates.iter().any(|c| c.url == url)
            {
                candidates.push(Candidate::from_url(url));
            }
        }
    }

    let mut excluded: HashSet<&str> = args.exclude_rpc.iter().map(String::as_str).collect();
    if let Some(cf) = &config_file {
        excluded.extend(cf.disabled_endpoints.urls.iter().map(String::as_str));
    }
    candidates.retain(|c| !excluded.contains(c.url.as_str()));

    if candidates.is_empty() {
        anyhow::bail!("No candidate endpoints left after applying filters");
    }
    Ok(candidates)
}

/// Transport with the CLI-configured timeout
pub fn transport(args: &RpcArgs) -> anyhow::Result<HttpTransport> {
    let timeout = args.timeout.unwrap_or_else(|| {
        ConfigFile::load_default()
            .ok()
            .flatten()
            .map(|cf| cf.settings.timeout_seconds)
            .unwrap_or_else(|| Settings::default().timeout_seconds)
    });
    Ok(HttpTransport::new(Duration::from_secs(timeout))?)
}

/// One aligned status line for a sample
pub(crate) fn format_sample(sample: &HealthSample) -> String {
    match sample.latency_ms() {
        Some(ms) => format!("{:<24} {:>6}ms  {}", sample.provider, ms, sample.status),
        None => format!(
            "{:<24} {:>8}  {} ({})",
            sample.provider,
            "-",
            sample.status,
            sample.error.as_deref().unwrap_or("unknown error")
        ),
    }
}
