use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the live value synchronizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long an entry without subscribers survives before eviction, in milliseconds
    pub grace_period_ms: u64,
    /// Upper bound on a single fetch, in seconds. Expiry counts as a transient failure
    pub fetch_timeout_secs: u64,
    /// Interval of `LiveSynchronizer::default_options`, in milliseconds
    pub default_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 2_000,
            fetch_timeout_secs: 10,
            default_interval_ms: 20_000,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(grace_str) = std::env::var("SYNC_GRACE_PERIOD_MS") {
            config.grace_period_ms = grace_str.parse()
                .map_err(|e| eyre::eyre!("Invalid SYNC_GRACE_PERIOD_MS: {}", e))?;
        }

        if let Ok(timeout_str) = std::env::var("SYNC_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = timeout_str.parse()
                .map_err(|e| eyre::eyre!("Invalid SYNC_FETCH_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(interval_str) = std::env::var("SYNC_DEFAULT_INTERVAL_MS") {
            config.default_interval_ms = interval_str.parse()
                .map_err(|e| eyre::eyre!("Invalid SYNC_DEFAULT_INTERVAL_MS: {}", e))?;
        }

        if config.fetch_timeout_secs == 0 {
            return Err(eyre::eyre!("SYNC_FETCH_TIMEOUT_SECS must be positive"));
        }

        Ok(config)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn default_interval(&self) -> Duration {
        Duration::from_millis(self.default_interval_ms)
    }
}
