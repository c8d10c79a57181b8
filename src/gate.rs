//! Startup gate: pick the first candidate fast enough to boot against
//!
//! Single sequential pass in list order, stopping at the first endpoint
//! under the acceptance threshold. When the whole list disappoints, the
//! gate releases anyway (fail-open) so startup is never blocked forever.

use crate::config::Candidate;
use crate::rpc::{HealthSample, Prober, RpcTransport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A candidate answering faster than this is good enough to boot with.
/// Deliberately looser than the classifier's healthy bar: the gate decides
/// whether the app can start, not how the endpoint is graded.
pub const GATE_ACCEPT_MS: u64 = 1000;

/// Result of a gate pass
#[derive(Debug)]
pub struct GateOutcome {
    /// First candidate under the acceptance threshold, if any
    pub selected: Option<Candidate>,
    /// Every sample taken, in probe order
    pub samples: Vec<HealthSample>,
    /// True when the list was exhausted and the gate released anyway
    pub fail_open: bool,
    /// True when cancellation stopped the pass early
    pub cancelled: bool,
}

/// Blocking startup gate over a candidate list
pub struct StartupGate<T> {
    prober: Prober<T>,
    accept: Duration,
    cancel: CancellationToken,
}

impl<T: RpcTransport> StartupGate<T> {
    pub fn new(transport: T, cancel: CancellationToken) -> Self {
        Self {
            prober: Prober::new(transport),
            accept: Duration::from_millis(GATE_ACCEPT_MS),
            cancel,
        }
    }

    pub fn with_accept_threshold(mut self, accept: Duration) -> Self {
        self.accept = accept;
        self
    }

    /// Probe enabled candidates in order; stop at the first acceptable one
    ///
    /// The token is checked before each probe and again before its sample
    /// is published, so a cancelled gate never reports a stale selection.
    pub async fn run(&self, candidates: &[Candidate]) -> GateOutcome {
        let mut samples = Vec::new();

        for candidate in candidates.iter().filter(|c| c.enabled) {
            if self.cancel.is_cancelled() {
                return GateOutcome {
                    selected: None,
                    samples,
                    fail_open: false,
                    cancelled: true,
                };
            }

            let sample = self.prober.probe(&candidate.name, &candidate.url).await;

            if self.cancel.is_cancelled() {
                return GateOutcome {
                    selected: None,
                    samples,
                    fail_open: false,
                    cancelled: true,
                };
            }

            let accepted = sample.latency.is_some_and(|l| l < self.accept);
            samples.push(sample);

            if accepted {
                tracing::info!("startup gate selected {}", candidate.name);
                return GateOutcome {
                    selected: Some(candidate.clone()),
                    samples,
                    fail_open: false,
                    cancelled: false,
                };
            }
        }

        tracing::warn!(
            "no candidate answered under {}ms, releasing fail-open",
            self.accept.as_millis()
        );
        GateOutcome {
            selected: None,
            samples,
            fail_open: true,
            cancelled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::{Behavior, Script, ScriptedTransport};
    use crate::rpc::HealthStatus;

    fn candidate(name: &str, url: &str) -> Candidate {
        Candidate::new(name, url)
    }

    #[tokio::test(start_paused = true)]
    async fn selects_first_fast_candidate_and_stops() {
        let transport = ScriptedTransport::new()
            .with("https://a", Script::latency_ms(300))
            .with("https://b", Script::latency_ms(1500))
            .with("https://c", Script::new(Behavior::Refuse));
        let gate = StartupGate::new(transport, CancellationToken::new());

        let candidates = vec![
            candidate("a", "https://a"),
            candidate("b", "https://b"),
            candidate("c", "https://c"),
        ];
        let outcome = gate.run(&candidates).await;

        let selected = outcome.selected.expect("should select a");
        assert_eq!(selected.name, "a");
        assert!(!outcome.fail_open);
        // Later candidates are never probed once one is accepted
        assert_eq!(outcome.samples.len(), 1);
        assert_eq!(outcome.samples[0].status, HealthStatus::Healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn probes_sequentially_until_one_qualifies() {
        // Acceptable candidate last: the gate must walk the whole list
        let transport = ScriptedTransport::new()
            .with("https://a", Script::new(Behavior::Refuse))
            .with("https://b", Script::latency_ms(1500))
            .with("https://c", Script::latency_ms(300));
        let gate = StartupGate::new(transport, CancellationToken::new());

        let candidates = vec![
            candidate("a", "https://a"),
            candidate("b", "https://b"),
            candidate("c", "https://c"),
        ];
        let outcome = gate.run(&candidates).await;

        assert_eq!(outcome.selected.unwrap().name, "c");
        let statuses: Vec<_> = outcome.samples.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                HealthStatus::Down,
                HealthStatus::Degraded,
                HealthStatus::Healthy
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn releases_fail_open_when_everything_is_slow() {
        let transport = ScriptedTransport::new()
            .with("https://a", Script::latency_ms(1200))
            .with("https://b", Script::new(Behavior::RateLimit));
        let gate = StartupGate::new(transport, CancellationToken::new());

        let candidates = vec![candidate("a", "https://a"), candidate("b", "https://b")];
        let outcome = gate.run(&candidates).await;

        assert!(outcome.selected.is_none());
        assert!(outcome.fail_open);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.samples.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_latency_is_not_accepted() {
        // Exactly the threshold must not qualify; acceptance is strict
        let transport = ScriptedTransport::new().with("https://a", Script::latency_ms(1000));
        let gate = StartupGate::new(transport, CancellationToken::new());

        let outcome = gate.run(&[candidate("a", "https://a")]).await;
        assert!(outcome.selected.is_none());
        assert!(outcome.fail_open);
    }

    #[tokio::test(start_paused = true)]
    async fn skips_disabled_candidates() {
        let transport = ScriptedTransport::new().with("https://b", Script::latency_ms(100));
        let gate = StartupGate::new(transport, CancellationToken::new());

        let mut disabled = candidate("a", "https://a");
        disabled.enabled = false;
        let outcome = gate.run(&[disabled, candidate("b", "https://b")]).await;

        assert_eq!(outcome.selected.unwrap().name, "b");
        assert_eq!(outcome.samples.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_gate_publishes_nothing() {
        let transport = ScriptedTransport::new().with("https://a", Script::latency_ms(100));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let gate = StartupGate::new(transport, cancel);

        let outcome = gate.run(&[candidate("a", "https://a")]).await;
        assert!(outcome.cancelled);
        assert!(outcome.selected.is_none());
        assert!(outcome.samples.is_empty());
        assert!(!outcome.fail_open);
    }
}
