//! JSON-RPC transport and health probing

mod prober;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use prober::{
    classify, HealthSample, HealthStatus, Prober, DEGRADED_MAX_MS, HEALTHY_MAX_MS,
};
pub use transport::{HttpTransport, RpcTransport, USDC_BASE};
