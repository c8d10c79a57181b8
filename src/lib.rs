//! rpc-sentinel - RPC endpoint health probing and selection for Base
//!
//! A Rust library and CLI for ranking Base mainnet RPC endpoints: a
//! fail-open startup gate that picks the first candidate fast enough to
//! boot against, a periodic health monitor for the active endpoint, and
//! an offline batch-size / rate-limit survey that prints configuration
//! recommendations for a human operator.
//!
//! # Example
//!
//! ```rust,no_run
//! use rpc_sentinel::{candidate_list, HttpTransport, ProviderKeys, StartupGate};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let candidates = candidate_list(&ProviderKeys::from_env());
//!     let transport = HttpTransport::new(Duration::from_secs(5))?;
//!
//!     let gate = StartupGate::new(transport, CancellationToken::new());
//!     let outcome = gate.run(&candidates).await;
//!
//!     match outcome.selected {
//!         Some(candidate) => println!("Booting against {}", candidate.url),
//!         None => println!("Nothing fast enough, failing open"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod gate;
pub mod monitor;
pub mod rpc;

// Re-exports for convenience
pub use config::{candidate_list, ApiKeys, Candidate, ConfigFile, ProviderKeys, Settings};
pub use diagnose::{
    DiagnoseOptions, DiagnosticReport, Diagnostics, EndpointReport, Recommendation, BATCH_CAP,
    BATCH_STEP,
};
pub use error::{ConfigError, Error, ProbeError, Result};
pub use gate::{GateOutcome, StartupGate, GATE_ACCEPT_MS};
pub use monitor::{indicator_visible, BuildMode, HealthMonitor, DEFAULT_INTERVAL};
pub use rpc::{
    classify, HealthSample, HealthStatus, HttpTransport, Prober, RpcTransport, DEGRADED_MAX_MS,
    HEALTHY_MAX_MS,
};
