//! JSON-RPC transport for probing
//!
//! Two request shapes only: a single `eth_blockNumber`, and a JSON-RPC
//! batch of identical `eth_call` reads (ERC-20 `decimals()` against USDC).
//! Everything else the chain offers is someone else's problem.

use crate::error::ProbeError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// USDC on Base, the cheapest stable contract to read against
pub const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

/// Selector for `decimals()`
const DECIMALS_SELECTOR: &str = "0x313ce567";

/// The network seam the probing components talk through
///
/// Implemented by [`HttpTransport`] in production and by a scripted fake
/// in tests, so probing logic never needs a live endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// One `eth_blockNumber` call, the cheapest read an endpoint answers
    async fn block_number(&self, url: &str) -> Result<u64, ProbeError>;

    /// A JSON-RPC batch of `size` identical `eth_call` reads
    async fn call_batch(&self, url: &str, size: usize) -> Result<(), ProbeError>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProbeError::Http)?;

        Ok(Self { client, timeout })
    }

    async fn post(&self, url: &str, body: Value) -> Result<Value, ProbeError> {
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(timeout_ms)
                } else if e.is_connect() {
                    ProbeError::ConnectionFailed(e.to_string())
                } else {
                    ProbeError::Http(e)
                }
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProbeError::RateLimited(format!("HTTP 429 from {url}")));
        }
        if !response.status().is_success() {
            return Err(ProbeError::InvalidResponse(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(timeout_ms)
            } else {
                ProbeError::Http(e)
            }
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn block_number(&self, url: &str) -> Result<u64, ProbeError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_blockNumber",
            "params": [],
        });

        let value = self.post(url, body).await?;
        check_rpc_error(&value)?;

        let hex = value
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::InvalidResponse("missing result field".to_string()))?;

        parse_hex_u64(hex)
    }

    async fn call_batch(&self, url: &str, size: usize) -> Result<(), ProbeError> {
        let batch: Vec<Value> = (0..size)
            .map(|i| {
                json!({
                    "jsonrpc": "2.0",
                    "id": i + 1,
                    "method": "eth_call",
                    "params": [{"to": USDC_BASE, "data": DECIMALS_SELECTOR}, "latest"],
                })
            })
            .collect();

        let value = self.post(url, Value::Array(batch)).await?;

        let entries = match value.as_array() {
            Some(entries) => entries,
            // Some endpoints answer an oversized batch with a single error object
            None => {
                check_rpc_error(&value)?;
                return Err(ProbeError::InvalidResponse(
                    "expected batch response array".to_string(),
                ));
            }
        };

        for entry in entries {
            check_rpc_error(entry)?;
        }
        Ok(())
    }
}

/// Map a JSON-RPC error object to a ProbeError, if present
fn check_rpc_error(value: &Value) -> Result<(), ProbeError> {
    let Some(error) = value.get("error") else {
        return Ok(());
    };
    // Some providers put an explicit null here on success
    if error.is_null() {
        return Ok(());
    }

    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();

    if is_rate_limit_shape(code, &message) {
        return Err(ProbeError::RateLimited(message));
    }
    Err(ProbeError::Rpc { code, message })
}

/// Providers disagree on how they say "slow down"; match the common shapes
fn is_rate_limit_shape(code: i64, message: &str) -> bool {
    if code == -32005 || code == -32029 {
        return true;
    }
    let message = message.to_ascii_lowercase();
    message.contains("rate limit")
        || message.contains("too many request")
        || message.contains("exceeded")
}

fn parse_hex_u64(hex: &str) -> Result<u64, ProbeError> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    u64::from_str_radix(digits, 16)
        .map_err(|_| ProbeError::InvalidResponse(format!("bad block number: {hex}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x10").unwrap(), 16);
        assert_eq!(parse_hex_u64("0x0").unwrap(), 0);
        assert_eq!(parse_hex_u64("ff").unwrap(), 255);
        assert!(parse_hex_u64("0xzz").is_err());
        assert!(parse_hex_u64("").is_err());
    }

    #[test]
    fn test_rate_limit_shapes() {
        assert!(is_rate_limit_shape(-32005, "limit reached"));
        assert!(is_rate_limit_shape(-32029, ""));
        assert!(is_rate_limit_shape(0, "Rate limit hit, retry later"));
        assert!(is_rate_limit_shape(0, "Too many requests"));
        assert!(is_rate_limit_shape(0, "daily quota exceeded"));
        assert!(!is_rate_limit_shape(-32000, "execution reverted"));
        assert!(!is_rate_limit_shape(0, "internal error"));
    }

    #[test]
    fn test_check_rpc_error() {
        let ok = json!({"jsonrpc": "2.0", "id": 1, "result": "0x1"});
        assert!(check_rpc_error(&ok).is_ok());

        let limited = json!({"error": {"code": -32005, "message": "limit reached"}});
        assert!(matches!(
            check_rpc_error(&limited),
            Err(ProbeError::RateLimited(_))
        ));

        let reverted = json!({"error": {"code": 3, "message": "execution reverted"}});
        assert!(matches!(
            check_rpc_error(&reverted),
            Err(ProbeError::Rpc { code: 3, .. })
        ));
    }
}
