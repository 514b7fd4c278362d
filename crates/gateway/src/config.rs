//! Configuration for the in-memory development gateway.

use std::time::Duration;

/// Knobs for [`MemoryGateway`](crate::memory::MemoryGateway), loaded from
/// environment variables.
///
/// All fields have defaults suitable for tests; development builds usually
/// turn on latency and seeding to approximate the hosted backend.
#[derive(Debug, Clone)]
pub struct MemoryGatewayConfig {
    /// Simulated round trip applied before each mutating call commits.
    pub latency: Duration,
    /// Seed a small demo data set at construction.
    pub seed_demo_data: bool,
}

impl MemoryGatewayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// Reads an optional `.env` file first.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `GANGWAY_GATEWAY_LATENCY_MS` | `0`     |
    /// | `GANGWAY_SEED_DEMO`          | `false` |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let latency_ms: u64 = std::env::var("GANGWAY_GATEWAY_LATENCY_MS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("GANGWAY_GATEWAY_LATENCY_MS must be a valid u64");

        let seed_demo_data: bool = std::env::var("GANGWAY_SEED_DEMO")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("GANGWAY_SEED_DEMO must be true or false");

        Self {
            latency: Duration::from_millis(latency_ms),
            seed_demo_data,
        }
    }
}

impl Default for MemoryGatewayConfig {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            seed_demo_data: false,
        }
    }
}
