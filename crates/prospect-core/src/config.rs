use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    }

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_as::<u32>(var, &or_default(var, default))
    };
    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_as::<u64>(var, &or_default(var, default))
    };

    let database_url = lookup("DATABASE_URL").ok();

    let env = parse_environment(&or_default("PROSPECT_ENV", "development"));
    let log_level = or_default("PROSPECT_LOG_LEVEL", "info");
    let campaign_path = PathBuf::from(or_default(
        "PROSPECT_CAMPAIGN_PATH",
        "./config/campaign.yaml",
    ));
    let account_id = parse_as::<i64>(
        "PROSPECT_ACCOUNT_ID",
        &or_default("PROSPECT_ACCOUNT_ID", "1"),
    )?;

    let db_max_connections = parse_u32("PROSPECT_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("PROSPECT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PROSPECT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let device_url = or_default("PROSPECT_DEVICE_URL", "http://127.0.0.1:7912");
    let device_timeout_secs = parse_u64("PROSPECT_DEVICE_TIMEOUT_SECS", "30")?;
    let device_max_retries = parse_u32("PROSPECT_DEVICE_MAX_RETRIES", "3")?;
    let device_retry_backoff_base_secs =
        parse_u64("PROSPECT_DEVICE_RETRY_BACKOFF_BASE_SECS", "1")?;
    let settle_ms = parse_u64("PROSPECT_SETTLE_MS", "1500")?;
    let wait_timeout_ms = parse_u64("PROSPECT_WAIT_TIMEOUT_MS", "5000")?;

    let rng_seed = match lookup("PROSPECT_RNG_SEED") {
        Ok(raw) => Some(parse_as::<u64>("PROSPECT_RNG_SEED", &raw)?),
        Err(_) => None,
    };

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        campaign_path,
        account_id,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        device_url,
        device_timeout_secs,
        device_max_retries,
        device_retry_backoff_base_secs,
        settle_ms,
        wait_timeout_ms,
        rng_seed,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
