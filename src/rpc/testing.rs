//! Scripted transport for timing tests
//!
//! Paired with `#[tokio::test(start_paused = true)]`: scripted latencies
//! are real `tokio::time::sleep`s, so the paused clock advances by exactly
//! the scripted amount and measured latencies are deterministic.

use crate::error::ProbeError;
use crate::rpc::RpcTransport;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// What a scripted endpoint does when asked for a block number
pub enum Behavior {
    /// Answer after this long
    Latency(Duration),
    /// Fail immediately with a connection error
    Refuse,
    /// Fail immediately with a rate-limit error
    RateLimit,
}

/// Per-endpoint script
pub struct Script {
    behavior: Behavior,
    /// Largest batch size that succeeds; bigger batches get rate-limited
    batch_limit: Option<usize>,
    /// Single calls answered before the limiter kicks in
    calls_before_limit: Option<u32>,
    calls: AtomicU32,
}

impl Script {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            batch_limit: None,
            calls_before_limit: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn latency_ms(ms: u64) -> Self {
        Self::new(Behavior::Latency(Duration::from_millis(ms)))
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    pub fn with_calls_before_limit(mut self, calls: u32) -> Self {
        self.calls_before_limit = Some(calls);
        self
    }
}

/// Transport answering from per-URL scripts; panics on unscripted URLs
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, script: Script) -> Self {
        self.scripts.insert(url.into(), script);
        self
    }

    fn script(&self, url: &str) -> &Script {
        self.scripts
            .get(url)
            .unwrap_or_else(|| panic!("unscripted url: {url}"))
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn block_number(&self, url: &str) -> Result<u64, ProbeError> {
        let script = self.script(url);

        if let Some(limit) = script.calls_before_limit {
            let taken = script.calls.fetch_add(1, Ordering::SeqCst);
            if taken >= limit {
                return Err(ProbeError::RateLimited("scripted limiter".to_string()));
            }
        }

        match &script.behavior {
            Behavior::Latency(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(12_345_678)
            }
            Behavior::Refuse => Err(ProbeError::ConnectionFailed(
                "scripted refusal".to_string(),
            )),
            Behavior::RateLimit => Err(ProbeError::RateLimited("scripted limiter".to_string())),
        }
    }

    async fn call_batch(&self, url: &str, size: usize) -> Result<(), ProbeError> {
        let script = self.script(url);

        match &script.behavior {
            Behavior::Refuse => {
                return Err(ProbeError::ConnectionFailed(
                    "scripted refusal".to_string(),
                ))
            }
            Behavior::RateLimit => {
                return Err(ProbeError::RateLimited("scripted limiter".to_string()))
            }
            Behavior::Latency(delay) => tokio::time::sleep(*delay).await,
        }

        match script.batch_limit {
            Some(limit) if size > limit => Err(ProbeError::RateLimited(format!(
                "batch of {size} exceeds scripted limit"
            ))),
            _ => Ok(()),
        }
    }
}
