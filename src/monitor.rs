//! Advisory health monitor for the active endpoint
//!
//! Re-probes one externally chosen endpoint on a fixed interval, keeping
//! only the latest sample. No history, no aggregation; the previous
//! sample is simply replaced.

use crate::rpc::{HealthSample, HealthStatus, Prober, RpcTransport};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default time between probes
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// How the running binary was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Mode of the current build
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }
}

/// Whether the health indicator should be shown
///
/// Production users only see it when something is wrong; development
/// builds always show it.
pub fn indicator_visible(status: HealthStatus, mode: BuildMode) -> bool {
    mode == BuildMode::Development || status != HealthStatus::Healthy
}

type SharedSample = Arc<RwLock<Option<HealthSample>>>;

/// Periodic prober for a single endpoint
///
/// Everything it needs is injected at construction; there is no global
/// state and the loop stops cleanly through the cancellation token.
pub struct HealthMonitor<T> {
    prober: Prober<T>,
    name: String,
    url: String,
    interval: Duration,
    latest: SharedSample,
    cancel: CancellationToken,
}

impl<T: RpcTransport> HealthMonitor<T> {
    pub fn new(
        transport: T,
        name: impl Into<String>,
        url: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            prober: Prober::new(transport),
            name: name.into(),
            url: url.into(),
            interval: DEFAULT_INTERVAL,
            latest: Arc::new(RwLock::new(None)),
            cancel,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Shared handle to the latest sample, for readers outside the loop
    pub fn latest_handle(&self) -> SharedSample {
        self.latest.clone()
    }

    /// Latest sample, if any probe has completed yet
    pub fn latest(&self) -> Option<HealthSample> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Probe once and publish the sample, unless cancelled meanwhile
    pub async fn probe_once(&self) -> HealthSample {
        let sample = self.prober.probe(&self.name, &self.url).await;

        if !self.cancel.is_cancelled() {
            if sample.status != HealthStatus::Healthy {
                tracing::warn!("{} is {}", self.name, sample.status);
            }
            *self.latest.write().unwrap_or_else(|e| e.into_inner()) = Some(sample.clone());
        }

        sample
    }

    /// Probe once per interval until cancelled; the first probe fires
    /// immediately
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }
            self.probe_once().await;
        }
    }
}
