//! Post-harvest passes over the ledger: profile enrichment, then scoring.

use prospect_core::{ProfileAttributes, ProfilePatch, StoreError};
use prospect_scoring::ScoringConfig;
use prospect_scraper::{navigation, read_profile, Lookup, ScraperError};

use crate::context::RunContext;

/// Visit the best unenriched profiles and store what their screens show.
///
/// A profile that cannot be opened or read is logged and skipped; only
/// store failures abort the pass. Stops early when the session time runs
/// out. Returns the number of profiles enriched.
///
/// # Errors
///
/// Returns [`StoreError`] if an attribute write fails.
pub async fn enrich_profiles(ctx: &mut RunContext<'_>) -> Result<u32, StoreError> {
    let budget = usize::try_from(ctx.config.max_profiles_to_enrich).unwrap_or(usize::MAX);
    let candidates = ctx.ledger.enrichment_candidates(budget);
    tracing::info!(candidates = candidates.len(), "enriching profiles");

    let mut enriched = 0u32;
    for username in candidates {
        if ctx.budget.expired() {
            tracing::info!(enriched, "session time reached during enrichment");
            break;
        }
        match visit(ctx, &username).await {
            Ok(Lookup::Found(attributes)) => {
                let patch = ProfilePatch {
                    attributes: Some(attributes.clone()),
                    ..ProfilePatch::default()
                };
                ctx.store
                    .upsert_profile(ctx.campaign_id, &username, &patch)
                    .await?;
                ctx.ledger.set_attributes(&username, attributes);
                enriched += 1;
            }
            Ok(Lookup::NotFound) => {
                tracing::warn!(username, "profile not readable, skipping");
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "profile visit failed, skipping");
            }
        }
    }
    ctx.counts.profiles_enriched += enriched;
    Ok(enriched)
}

async fn visit(
    ctx: &RunContext<'_>,
    username: &str,
) -> Result<Lookup<ProfileAttributes>, ScraperError> {
    if !navigation::open_profile(ctx.session, username).await?.is_found() {
        return Ok(Lookup::NotFound);
    }
    let attributes = read_profile(ctx.session, username).await;
    ctx.session.back().await?;
    attributes
}

/// Score every enriched profile and attach a persona to qualified ones.
///
/// Returns `(scored, qualified)`.
///
/// # Errors
///
/// Returns [`StoreError`] if a score write fails.
pub async fn score_profiles(ctx: &mut RunContext<'_>) -> Result<(u32, u32), StoreError> {
    let config = ScoringConfig::from_campaign(ctx.config);
    let evaluations: Vec<_> = ctx
        .ledger
        .scoring_candidates()
        .into_iter()
        .map(|profile| {
            (
                profile.username.clone(),
                prospect_scoring::evaluate(profile, &config),
            )
        })
        .collect();

    let (mut scored, mut qualified) = (0u32, 0u32);
    for (username, evaluation) in evaluations {
        let is_qualified = evaluation.is_qualified();
        let patch = ProfilePatch {
            score: Some(evaluation.score),
            persona: evaluation.persona.clone(),
            ..ProfilePatch::default()
        };
        ctx.store
            .upsert_profile(ctx.campaign_id, &username, &patch)
            .await?;
        tracing::debug!(
            username,
            score = evaluation.score.score,
            qualified = is_qualified,
            "profile scored"
        );
        ctx.ledger
            .set_score(&username, evaluation.score, evaluation.persona);
        scored += 1;
        if is_qualified {
            qualified += 1;
        }
    }
    ctx.counts.profiles_scored += scored;
    ctx.counts.qualified = qualified;
    tracing::info!(scored, qualified, "scoring complete");
    Ok((scored, qualified))
}
