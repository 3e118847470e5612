//! `discover` command: wire config, store, device bridge and the engine.

use std::path::Path;

use anyhow::Context;
use prospect_core::{AppConfig, ProspectStore};
use prospect_db::{MemoryStore, PgStore};
use prospect_discovery::{Discovery, RunResult, TracingSink};
use prospect_scraper::{HttpDevice, Pacing, Selectors, Session};

/// Connect to Postgres with the pool settings from `config`.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the pool cannot be
/// established.
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let database_url = config.require_database_url()?;
    let pool_config = prospect_db::PoolConfig::from_app_config(config);
    prospect_db::connect_pool(database_url, pool_config)
        .await
        .context("failed to connect to database")
}

fn build_session(config: &AppConfig) -> anyhow::Result<Session> {
    let device = HttpDevice::new(
        &config.device_url,
        config.device_timeout_secs,
        config.device_max_retries,
        config.device_retry_backoff_base_secs,
    )
    .context("failed to build device bridge client")?;
    Ok(Session::new(
        Box::new(device),
        Selectors::default(),
        Pacing::from_app_config(config),
        config.rng_seed,
    ))
}

/// Run a campaign from `campaign_path`, optionally resuming `resume_id`.
///
/// With `dry_run` the engine writes to an in-memory store; nothing touches
/// the database.
///
/// # Errors
///
/// Returns an error if the campaign file is invalid, the device client
/// cannot be built, or the database cannot be reached. Failures inside the
/// run itself are reported through [`RunResult`].
pub(crate) async fn run_discover(
    config: &AppConfig,
    campaign_path: &Path,
    resume_id: Option<i64>,
    dry_run: bool,
) -> anyhow::Result<RunResult> {
    let campaign = prospect_core::load_campaign(campaign_path)
        .with_context(|| format!("invalid campaign file {}", campaign_path.display()))?;
    let session = build_session(config)?;
    tracing::info!(
        campaign = %campaign.name,
        sources = campaign.sources().len(),
        dry_run,
        device_url = %config.device_url,
        "starting discovery"
    );

    let store: Box<dyn ProspectStore> = if dry_run {
        Box::new(MemoryStore::new())
    } else {
        let pool = connect(config).await?;
        prospect_db::run_migrations(&pool)
            .await
            .context("failed to apply migrations")?;
        Box::new(PgStore::new(pool))
    };

    let sink = TracingSink;
    let result = Discovery::new(store.as_ref(), &session, &campaign, config.account_id, &sink)
        .run(resume_id)
        .await;
    if let Some(error) = &result.error {
        tracing::error!(error = %error, "discovery run failed");
    }
    Ok(result)
}
