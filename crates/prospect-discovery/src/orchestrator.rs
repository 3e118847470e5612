//! Top-level run: campaign lifecycle, source loop, enrichment and scoring.
//!
//! A run creates (or resumes) the campaign, walks every configured source in
//! order under the global budget, then enriches and scores what it found.
//! A failing source is logged and skipped; a store failure stops the
//! campaign and ends the run with an error.

use std::time::Duration;

use prospect_core::{
    CampaignConfig, CampaignRequest, CampaignStatus, NewCampaign, ProspectStore, StoreError,
};
use prospect_scraper::Session;
use serde::Serialize;

use crate::budget::{RunBudget, StopReason};
use crate::context::RunContext;
use crate::enrichment::{enrich_profiles, score_profiles};
use crate::error::DiscoveryError;
use crate::events::{DiscoveryEvent, EventSink, RunCounts};
use crate::ledger::ProfileLedger;
use crate::recency::RecencyCache;
use crate::source::{process_source, SourceOutcome};

/// What a run reports back, whether it finished, hit a budget or failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub campaign_id: Option<i64>,
    pub counts: RunCounts,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    pub error: Option<String>,
    /// Set when a budget cut the run short; still a success.
    pub stop_reason: Option<StopReason>,
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

pub struct Discovery<'a> {
    store: &'a dyn ProspectStore,
    session: &'a Session,
    config: &'a CampaignConfig,
    account_id: i64,
    events: &'a dyn EventSink,
}

impl std::fmt::Debug for Discovery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("campaign", &self.config.name)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl<'a> Discovery<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn ProspectStore,
        session: &'a Session,
        config: &'a CampaignConfig,
        account_id: i64,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            store,
            session,
            config,
            account_id,
            events,
        }
    }

    /// Run the campaign, resuming campaign `resume_id` when given.
    ///
    /// Never returns an error: failures are reported through
    /// [`RunResult::error`] with whatever counts were reached.
    pub async fn run(&self, resume_id: Option<i64>) -> RunResult {
        let budget = RunBudget::new(self.config.session_duration(), self.config.max_profiles);
        let request = CampaignRequest {
            resume_id,
            new: NewCampaign {
                account_id: self.account_id,
                name: self.config.name.clone(),
                niche_keywords: self.config.niche_keywords.clone(),
                sources: self.config.sources(),
                min_score_threshold: self.config.min_score_threshold,
            },
        };

        let campaign = match self.store.create_or_load_campaign(&request).await {
            Ok(campaign) => campaign,
            Err(e) => {
                tracing::error!(error = %e, "could not create or load campaign");
                return RunResult {
                    success: false,
                    campaign_id: resume_id,
                    counts: RunCounts::default(),
                    duration: budget.elapsed(),
                    error: Some(e.to_string()),
                    stop_reason: None,
                };
            }
        };
        tracing::info!(
            campaign_id = campaign.id,
            name = %campaign.name,
            resumed = resume_id.is_some(),
            "discovery run started"
        );

        let mut ctx = match self.context(campaign.id, resume_id, budget).await {
            Ok(ctx) => ctx,
            Err(e) => {
                let error = DiscoveryError::from(e);
                return self.fail(campaign.id, RunCounts::default(), budget, &error).await;
            }
        };

        match drive(&mut ctx).await {
            Ok(stop_reason) => {
                let counts = ctx.counts;
                if let Err(e) = self.complete(&ctx).await {
                    let error = DiscoveryError::from(e);
                    return self.fail(campaign.id, counts, budget, &error).await;
                }
                let duration = budget.elapsed();
                self.events.emit(&DiscoveryEvent::summary(&counts, duration));
                tracing::info!(
                    campaign_id = campaign.id,
                    profiles = counts.profiles_discovered,
                    qualified = counts.qualified,
                    duration_secs = duration.as_secs(),
                    stop_reason = ?stop_reason,
                    "discovery run finished"
                );
                RunResult {
                    success: true,
                    campaign_id: Some(campaign.id),
                    counts,
                    duration,
                    error: None,
                    stop_reason,
                }
            }
            Err(e) => self.fail(campaign.id, ctx.counts, budget, &e).await,
        }
    }

    async fn context(
        &self,
        campaign_id: i64,
        resume_id: Option<i64>,
        budget: RunBudget,
    ) -> Result<RunContext<'a>, StoreError> {
        let ledger = if resume_id.is_some() {
            let profiles = self.store.list_profiles(campaign_id).await?;
            let open = self.store.list_open_progress(campaign_id).await?;
            tracing::info!(
                campaign_id,
                profiles = profiles.len(),
                open_sources = open.len(),
                "resuming campaign"
            );
            ProfileLedger::with_profiles(budget.max_profiles(), profiles)
        } else {
            ProfileLedger::new(budget.max_profiles())
        };

        let recency = if self.config.skip_recently_scraped {
            RecencyCache::load(
                self.store,
                self.account_id,
                self.config.recency_days,
                Some(campaign_id),
            )
            .await?
        } else {
            RecencyCache::disabled()
        };

        let counts = RunCounts {
            profiles_discovered: u32::try_from(ledger.len()).unwrap_or(u32::MAX),
            ..RunCounts::default()
        };
        Ok(RunContext {
            store: self.store,
            session: self.session,
            config: self.config,
            events: self.events,
            campaign_id,
            budget,
            ledger,
            recency,
            counts,
        })
    }

    async fn complete(&self, ctx: &RunContext<'_>) -> Result<(), StoreError> {
        let discovered = u32::try_from(ctx.ledger.len()).unwrap_or(u32::MAX);
        self.store
            .update_campaign_totals(ctx.campaign_id, discovered, ctx.counts.qualified)
            .await?;
        self.store
            .set_campaign_status(ctx.campaign_id, CampaignStatus::Completed)
            .await
    }

    async fn fail(
        &self,
        campaign_id: i64,
        counts: RunCounts,
        budget: RunBudget,
        error: &DiscoveryError,
    ) -> RunResult {
        tracing::error!(campaign_id, error = %error, "discovery run failed");
        stop_best_effort(self.store, campaign_id).await;
        RunResult {
            success: false,
            campaign_id: Some(campaign_id),
            counts,
            duration: budget.elapsed(),
            error: Some(error.to_string()),
            stop_reason: None,
        }
    }
}

/// Mark the campaign STOPPED, logging rather than propagating a failure.
async fn stop_best_effort(store: &dyn ProspectStore, campaign_id: i64) {
    if let Err(e) = store
        .set_campaign_status(campaign_id, CampaignStatus::Stopped)
        .await
    {
        tracing::error!(campaign_id, error = %e, "failed to mark campaign stopped");
    }
}

/// Sources, then enrichment, then scoring. Returns the budget that cut the
/// source loop short, if any.
async fn drive(ctx: &mut RunContext<'_>) -> Result<Option<StopReason>, DiscoveryError> {
    let mut stop_reason = None;
    for source in ctx.config.sources() {
        if let Some(reason) = ctx.stop_reason() {
            tracing::info!(%reason, "budget reached, not starting more sources");
            stop_reason = Some(reason);
            break;
        }
        match process_source(ctx, &source).await {
            Ok(SourceOutcome::Completed { posts, end }) => {
                tracing::info!(source = %source, posts, ?end, "source done");
                ctx.counts.sources_completed += 1;
            }
            Ok(SourceOutcome::AlreadyDone) => {}
            Ok(SourceOutcome::Unreachable) => {
                ctx.counts.sources_failed += 1;
            }
            Ok(SourceOutcome::Stopped(reason)) => {
                stop_reason = Some(reason);
                break;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "source failed, moving on");
                ctx.counts.sources_failed += 1;
            }
        }
    }

    if ctx.config.enrich_profiles {
        if ctx.budget.expired() {
            tracing::info!("session time reached, skipping enrichment");
        } else {
            enrich_profiles(ctx).await?;
        }
    }
    if ctx.config.score_profiles {
        score_profiles(ctx).await?;
    }
    Ok(stop_reason)
}
