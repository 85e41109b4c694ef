//! Mock service settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latency and seeding settings for [`MockApi`](crate::MockApi)
///
/// Deserializes from the `[api]` table of `referly.toml`; every field is optional.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Fixed part of the simulated latency
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound of the random latency added on top of the base
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
    /// Seed for the repository contents and latency jitter
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_base_delay_ms() -> u64 {
    300
}

fn default_jitter_ms() -> u64 {
    500
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            jitter_ms: default_jitter_ms(),
            seed: None,
        }
    }
}

impl ApiConfig {
    /// No simulated latency
    pub fn instant() -> Self {
        Self {
            base_delay_ms: 0,
            jitter_ms: 0,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set both latency parts; durations beyond `u64::MAX` ms saturate
    pub fn with_latency(mut self, base: Duration, jitter: Duration) -> Self {
        self.base_delay_ms = saturating_millis(base);
        self.jitter_ms = saturating_millis(jitter);
        self
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }
}
