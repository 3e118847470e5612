use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level settings read from the environment.
///
/// Campaign-specific knobs (sources, per-post limits, scoring threshold) live
/// in [`crate::CampaignConfig`] instead; this struct only covers how the
/// process connects to its collaborators.
#[derive(Clone)]
pub struct AppConfig {
    /// Unset is fine for runs that never touch Postgres (`--dry-run`).
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub campaign_path: PathBuf,
    /// Account performing the run; scopes the recency cache.
    pub account_id: i64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Base URL of the device automation bridge.
    pub device_url: String,
    pub device_timeout_secs: u64,
    pub device_max_retries: u32,
    pub device_retry_backoff_base_secs: u64,
    /// Base settle delay after each UI action, before jitter.
    pub settle_ms: u64,
    /// Upper bound for a single wait on an expected UI element.
    pub wait_timeout_ms: u64,
    /// Fixed seed for the session RNG; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("campaign_path", &self.campaign_path)
            .field("database_url", &"[redacted]")
            .field("account_id", &self.account_id)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("device_url", &self.device_url)
            .field("device_timeout_secs", &self.device_timeout_secs)
            .field("device_max_retries", &self.device_max_retries)
            .field(
                "device_retry_backoff_base_secs",
                &self.device_retry_backoff_base_secs,
            )
            .field("settle_ms", &self.settle_ms)
            .field("wait_timeout_ms", &self.wait_timeout_ms)
            .field("rng_seed", &self.rng_seed)
            .finish()
    }
}
