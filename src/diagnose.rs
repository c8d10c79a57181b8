//! Batch-size and rate-limit discovery across the candidate list
//!
//! For each candidate, strictly in order: time one cheap read, climb the
//! JSON-RPC batch size until the endpoint pushes back, then hammer single
//! calls for a fixed window to see where the limiter bites. A pause
//! between candidates keeps one endpoint's limiter from tainting the
//! next. Results are printed for a human operator; nothing feeds back
//! into runtime configuration.

use crate::config::Candidate;
use crate::rpc::{classify, HealthStatus, RpcTransport};
use std::time::Duration;

/// Batch sizes are climbed in steps of this
pub const BATCH_STEP: u32 = 10;

/// Largest batch size ever attempted
pub const BATCH_CAP: u32 = 100;

/// Default sustained-rate window per endpoint
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// Default pause between candidates
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(2);

/// Knobs for a diagnostic run
#[derive(Debug, Clone)]
pub struct DiagnoseOptions {
    /// Sustained-rate window per endpoint
    pub window: Duration,
    /// Pause between candidates
    pub pause: Duration,
    /// Batch size increment
    pub step: u32,
    /// Batch size ceiling
    pub cap: u32,
}

impl Default for DiagnoseOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            pause: DEFAULT_PAUSE,
            step: BATCH_STEP,
            cap: BATCH_CAP,
        }
    }
}

/// Findings for one candidate
#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub name: String,
    pub url: String,
    /// Single-call latency; absent when even that failed
    pub latency_ms: Option<u64>,
    pub status: HealthStatus,
    /// Largest batch that succeeded (a multiple of the step, at most the cap)
    pub max_batch: u32,
    /// Whether the endpoint rate-limited us at any point
    pub rate_limited: bool,
    /// Successful single calls before the limiter bit during the window,
    /// absent when the window closed without one
    pub calls_before_limit: Option<u32>,
    /// Error text when the candidate never answered
    pub error: Option<String>,
}

impl EndpointReport {
    /// True when the candidate failed its very first call
    pub fn errored(&self) -> bool {
        self.latency_ms.is_none()
    }
}

/// Suggested configuration, for manual transcription by the operator
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub primary: EndpointReport,
    pub fallback: Option<EndpointReport>,
    /// 70% of the mean max batch across candidates that answered
    pub suggested_batch: u32,
}

/// Full output of one diagnostic run
#[derive(Debug)]
pub struct DiagnosticReport {
    /// Per-candidate findings, best first
    pub reports: Vec<EndpointReport>,
    pub recommendation: Option<Recommendation>,
}

/// One-shot diagnostic runner
pub struct Diagnostics<T> {
    transport: T,
    options: DiagnoseOptions,
}

impl<T: RpcTransport> Diagnostics<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            options: DiagnoseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DiagnoseOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the full survey over enabled candidates
    pub async fn run(&self, candidates: &[Candidate]) -> DiagnosticReport {
        self.run_with(candidates, |_| {}).await
    }

    /// Run the survey, invoking `on_each` after every candidate finishes
    pub async fn run_with<F>(&self, candidates: &[Candidate], mut on_each: F) -> DiagnosticReport
    where
        F: FnMut(&EndpointReport),
    {
        let enabled: Vec<_> = candidates.iter().filter(|c| c.enabled).collect();
        let mut reports = Vec::with_capacity(enabled.len());

        for (i, candidate) in enabled.iter().enumerate() {
            let report = self.survey_candidate(candidate).await;
            tracing::info!(
                "{}: batch {} rate_limited {} ({})",
                report.name,
                report.max_batch,
                report.rate_limited,
                report
                    .latency_ms
                    .map(|ms| format!("{ms}ms"))
                    .unwrap_or_else(|| "no answer".to_string()),
            );
            on_each(&report);
            reports.push(report);

            if i + 1 < enabled.len() {
                tokio::time::sleep(self.options.pause).await;
            }
        }

        sort_reports(&mut reports);
        let recommendation = recommend(&reports);
        DiagnosticReport {
            reports,
            recommendation,
        }
    }

    async fn survey_candidate(&self, candidate: &Candidate) -> EndpointReport {
        // Single-call latency first; a candidate that cannot answer this
        // is reported as errored and skips the expensive stages
        let started = tokio::time::Instant::now();
        let latency_ms = match self.transport.block_number(&candidate.url).await {
            Ok(_) => started.elapsed().as_millis() as u64,
            Err(e) => {
                return EndpointReport {
                    name: candidate.name.clone(),
                    url: candidate.url.clone(),
                    latency_ms: None,
                    status: HealthStatus::Down,
                    max_batch: 0,
                    rate_limited: e.is_rate_limit(),
                    calls_before_limit: None,
                    error: Some(e.to_string()),
                };
            }
        };
        let status = classify(latency_ms);

        // Climb batch sizes until the endpoint pushes back or the cap holds
        let mut max_batch = 0;
        let mut rate_limited = false;
        let mut size = self.options.step;
        while size <= self.options.cap {
            match self.transport.call_batch(&candidate.url, size as usize).await {
                Ok(()) => {
                    max_batch = size;
                    size += self.options.step;
                }
                Err(e) => {
                    rate_limited = e.is_rate_limit();
                    break;
                }
            }
        }

        // Sustained single calls until the window closes or the limiter bites
        let deadline = tokio::time::Instant::now() + self.options.window;
        let mut answered = 0;
        let mut limited_in_window = false;
        while tokio::time::Instant::now() < deadline {
            match self.transport.block_number(&candidate.url).await {
                Ok(_) => answered += 1,
                Err(e) => {
                    limited_in_window = e.is_rate_limit();
                    break;
                }
            }
        }

        EndpointReport {
            name: candidate.name.clone(),
            url: candidate.url.clone(),
            latency_ms: Some(latency_ms),
            status,
            max_batch,
            rate_limited: rate_limited || limited_in_window,
            calls_before_limit: limited_in_window.then_some(answered),
            error: None,
        }
    }
}

/// Composite ranking: no-rate-limit first, then larger batches, then
/// lower latency. Candidates that never answered sink to the bottom of
/// their class via the latency key.
fn sort_reports(reports: &mut [EndpointReport]) {
    reports.sort_by(|a, b| {
        a.rate_limited
            .cmp(&b.rate_limited)
            .then_with(|| b.max_batch.cmp(&a.max_batch))
            .then_with(|| {
                a.latency_ms
                    .unwrap_or(u64::MAX)
                    .cmp(&b.latency_ms.unwrap_or(u64::MAX))
            })
    });
}

/// Suggested batch size is 70% of the mean max batch over candidates that
/// answered; no recommendation when none did
fn recommend(reports: &[EndpointReport]) -> Option<Recommendation> {
    let usable: Vec<&EndpointReport> = reports.iter().filter(|r| !r.errored()).collect();
    let primary = usable.first()?;

    let mean =
        usable.iter().map(|r| r.max_batch as f64).sum::<f64>() / usable.len() as f64;
    let suggested_batch = (mean * 0.7) as u32;

    Some(Recommendation {
        primary: (*primary).clone(),
        fallback: usable.get(1).map(|r| (*r).clone()),
        suggested_batch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::{Behavior, Script, ScriptedTransport};

    fn candidate(name: &str, url: &str) -> Candidate {
        Candidate::new(name, url)
    }

    fn report(name: &str, latency: Option<u64>, batch: u32, limited: bool) -> EndpointReport {
        EndpointReport {
            name: name.to_string(),
            url: format!("https://{name}"),
            latency_ms: latency,
            status: latency.map_or(HealthStatus::Down, classify),
            max_batch: batch,
            rate_limited: limited,
            calls_before_limit: None,
            error: latency.is_none().then(|| "refused".to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batch_climb_stops_at_first_rate_limit() {
        let transport = ScriptedTransport::new().with(
            "https://a",
            Script::latency_ms(100).with_batch_limit(40),
        );
        let options = DiagnoseOptions {
            window: Duration::from_secs(1),
            pause: Duration::ZERO,
            ..Default::default()
        };
        let diagnostics = Diagnostics::new(transport).with_options(options);

        let result = diagnostics.run(&[candidate("a", "https://a")]).await;
        let r = &result.reports[0];

        assert_eq!(r.max_batch, 40);
        assert_eq!(r.max_batch % BATCH_STEP, 0);
        assert!(r.max_batch <= BATCH_CAP);
        assert!(r.rate_limited);
        assert_eq!(r.latency_ms, Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn batch_climb_respects_the_cap() {
        // Endpoint that would accept far more than we ever ask for
        let transport = ScriptedTransport::new().with(
            "https://a",
            Script::latency_ms(100).with_batch_limit(10_000),
        );
        let options = DiagnoseOptions {
            window: Duration::from_secs(1),
            pause: Duration::ZERO,
            ..Default::default()
        };
        let diagnostics = Diagnostics::new(transport).with_options(options);

        let result = diagnostics.run(&[candidate("a", "https://a")]).await;
        let r = &result.reports[0];

        assert_eq!(r.max_batch, BATCH_CAP);
        assert!(!r.rate_limited);
        assert!(r.calls_before_limit.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn window_counts_calls_until_limiter_bites() {
        // One call spent on the latency stage, then five answered in the
        // window before the scripted limiter kicks in
        let transport = ScriptedTransport::new().with(
            "https://a",
            Script::latency_ms(50)
                .with_batch_limit(100)
                .with_calls_before_limit(6),
        );
        let options = DiagnoseOptions {
            window: Duration::from_secs(5),
            pause: Duration::ZERO,
            ..Default::default()
        };
        let diagnostics = Diagnostics::new(transport).with_options(options);

        let result = diagnostics.run(&[candidate("a", "https://a")]).await;
        let r = &result.reports[0];

        assert_eq!(r.calls_before_limit, Some(5));
        assert!(r.rate_limited);
    }

    #[tokio::test(start_paused = true)]
    async fn dead_candidate_is_reported_inline_and_run_continues() {
        let transport = ScriptedTransport::new()
            .with("https://dead", Script::new(Behavior::Refuse))
            .with(
                "https://ok",
                Script::latency_ms(100).with_batch_limit(100),
            );
        let options = DiagnoseOptions {
            window: Duration::from_secs(1),
            pause: Duration::from_secs(2),
            ..Default::default()
        };
        let diagnostics = Diagnostics::new(transport).with_options(options);

        let result = diagnostics
            .run(&[candidate("dead", "https://dead"), candidate("ok", "https://ok")])
            .await;

        assert_eq!(result.reports.len(), 2);
        // The working endpoint ranks first despite list order
        assert_eq!(result.reports[0].name, "ok");
        assert!(result.reports[1].errored());
        assert_eq!(result.recommendation.unwrap().primary.name, "ok");
    }

    #[test]
    fn ranking_prefers_unlimited_then_batch_then_latency() {
        let mut reports = vec![
            report("limited-big", Some(100), 100, true),
            report("slow", Some(900), 50, false),
            report("fast", Some(120), 50, false),
            report("dead", None, 0, false),
            report("big", Some(400), 80, false),
        ];
        sort_reports(&mut reports);

        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["big", "fast", "slow", "dead", "limited-big"]);
    }

    #[test]
    fn recommendation_takes_seventy_percent_of_mean_batch() {
        let mut reports = vec![
            report("a", Some(100), 100, false),
            report("b", Some(200), 60, false),
        ];
        sort_reports(&mut reports);
        let rec = recommend(&reports).unwrap();

        assert_eq!(rec.primary.name, "a");
        assert_eq!(rec.fallback.unwrap().name, "b");
        // mean(100, 60) = 80, 70% of that is 56
        assert_eq!(rec.suggested_batch, 56);
    }

    #[test]
    fn no_recommendation_when_nothing_answered() {
        let reports = vec![report("dead", None, 0, false)];
        assert!(recommend(&reports).is_none());
    }
}
