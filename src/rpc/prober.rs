//! Timed single-call probing and health classification

use crate::rpc::RpcTransport;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, SystemTime};

/// Latency below this is healthy
pub const HEALTHY_MAX_MS: u64 = 500;

/// Latency below this (and at or above [`HEALTHY_MAX_MS`]) is degraded;
/// anything slower counts as down even when the call succeeds
pub const DEGRADED_MAX_MS: u64 = 2000;

/// Health classification of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Down => "down",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a measured probe latency
pub fn classify(latency_ms: u64) -> HealthStatus {
    if latency_ms < HEALTHY_MAX_MS {
        HealthStatus::Healthy
    } else if latency_ms < DEGRADED_MAX_MS {
        HealthStatus::Degraded
    } else {
        HealthStatus::Down
    }
}

/// Outcome of one probe; the latest sample replaces the previous one
#[derive(Debug, Clone)]
pub struct HealthSample {
    /// Name of the probed provider
    pub provider: String,
    /// Wall-clock latency of the call, absent when it failed
    pub latency: Option<Duration>,
    /// Classified health
    pub status: HealthStatus,
    /// When the sample was taken
    pub observed_at: SystemTime,
    /// Error string for failed probes
    pub error: Option<String>,
}

impl HealthSample {
    /// Latency in whole milliseconds, if the call succeeded
    pub fn latency_ms(&self) -> Option<u64> {
        self.latency.map(|l| l.as_millis() as u64)
    }
}

/// Issues timed probes through an injected transport
pub struct Prober<T> {
    transport: T,
}

impl<T: RpcTransport> Prober<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One timed `eth_blockNumber` read against `url`
    ///
    /// Failures of any kind become a `Down` sample carrying the error
    /// string; this never returns an error and never retries. Retry, if
    /// wanted, is the caller's business.
    pub async fn probe(&self, name: &str, url: &str) -> HealthSample {
        let started = tokio::time::Instant::now();

        match self.transport.block_number(url).await {
            Ok(block) => {
                let latency = started.elapsed();
                let status = classify(latency.as_millis() as u64);
                tracing::debug!(
                    "{} answered block {} in {}ms ({})",
                    name,
                    block,
                    latency.as_millis(),
                    status
                );
                HealthSample {
                    provider: name.to_string(),
                    latency: Some(latency),
                    status,
                    observed_at: SystemTime::now(),
                    error: None,
                }
            }
            Err(e) => {
                tracing::debug!("{} probe failed: {}", name, e);
                HealthSample {
                    provider: name.to_string(),
                    latency: None,
                    status: HealthStatus::Down,
                    observed_at: SystemTime::now(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
