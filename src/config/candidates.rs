//! Candidate endpoint list for Base mainnet
//!
//! Premium providers are prepended only when their API key is present.
//! Key validity is never checked here; a bad key simply shows up as a
//! failed probe. Ordering defines probe priority, not correctness.

use serde::{Deserialize, Serialize};

/// A named RPC endpoint eligible for probing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Short provider name
    pub name: String,
    /// RPC URL
    pub url: String,
    /// Whether this candidate participates in probing
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Candidate {
    /// Create an enabled candidate
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            enabled: true,
        }
    }

    /// Create a candidate from a bare URL, naming it after the host
    pub fn from_url(url: &str) -> Self {
        let name = url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or(url)
            .to_string();
        Self::new(name, url)
    }
}

/// Premium provider credentials, read once at startup
///
/// Absence of a key disables that candidate; no validation happens here.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub alchemy: Option<String>,
    pub infura: Option<String>,
    pub ankr: Option<String>,
    /// QuickNode hands out a full per-account URL, not a key
    pub quicknode_url: Option<String>,
}

impl ProviderKeys {
    /// Read keys from the process environment
    pub fn from_env() -> Self {
        Self {
            alchemy: env_value("ALCHEMY_API_KEY"),
            infura: env_value("INFURA_API_KEY"),
            ankr: env_value("ANKR_API_KEY"),
            quicknode_url: env_value("QUICKNODE_BASE_URL"),
        }
    }

    /// Fill gaps from stored config-file keys; env values win
    pub fn overlay(mut self, other: &super::ApiKeys) -> Self {
        self.alchemy = self.alchemy.or_else(|| other.alchemy.clone());
        self.infura = self.infura.or_else(|| other.infura.clone());
        self.ankr = self.ankr.or_else(|| other.ankr.clone());
        self.quicknode_url = self.quicknode_url.or_else(|| other.quicknode_url.clone());
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Public Base mainnet endpoints, in probe priority order
const PUBLIC_ENDPOINTS: &[(&str, &str)] = &[
    ("base-official", "https://mainnet.base.org"),
    ("llamarpc", "https://base.llamarpc.com"),
    ("publicnode", "https://base-rpc.publicnode.com"),
    ("blockpi", "https://base.blockpi.network/v1/rpc/public"),
    ("1rpc", "https://1rpc.io/base"),
    ("meowrpc", "https://base.meowrpc.com"),
];

/// Build the ordered candidate list for a set of provider keys
///
/// Premium candidates come first, in declaration order (Alchemy, Infura,
/// Ankr, QuickNode), followed by the public fallbacks. The result is
/// deterministic for a fixed set of keys.
pub fn candidate_list(keys: &ProviderKeys) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if let Some(key) = &keys.alchemy {
        candidates.push(Candidate::new(
            "alchemy",
            format!("https://base-mainnet.g.alchemy.com/v2/{key}"),
        ));
    }
    if let Some(key) = &keys.infura {
        candidates.push(Candidate::new(
            "infura",
            format!("https://base-mainnet.infura.io/v3/{key}"),
        ));
    }
    if let Some(key) = &keys.ankr {
        candidates.push(Candidate::new(
            "ankr",
            format!("https://rpc.ankr.com/base/{key}"),
        ));
    }
    if let Some(url) = &keys.quicknode_url {
        candidates.push(Candidate::new("quicknode", url));
    }

    for (name, url) in PUBLIC_ENDPOINTS {
        candidates.push(Candidate::new(*name, *url));
    }

    candidates
}
