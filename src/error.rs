//! Error types for rpc-sentinel

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Probe-related errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Errors a single probe can produce
///
/// Probing components catch all of these and degrade the candidate to
/// `Down` (or flag it rate-limited) instead of propagating them. Only
/// construction and configuration failures surface as `Err` to callers.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Rate limited by endpoint: {0}")]
    RateLimited(String),

    #[error("Invalid response from endpoint: {0}")]
    InvalidResponse(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProbeError {
    /// Whether this failure means the endpoint asked us to slow down
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProbeError::RateLimited(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    InvalidFile(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown provider: {0} (expected alchemy, infura, ankr, or quicknode)")]
    UnknownProvider(String),

    #[error("Config file parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
