//! One source, driven through `PROFILE -> (LIKERS -> COMMENTS)* -> DONE`.

use std::collections::HashSet;

use prospect_core::{CommentRecord, Interaction, InteractionKind, Phase, SourceKey, SourceType};
use prospect_scraper::{
    navigation, post, CommentRowParser, CurrentPost, ListEnd, ListScraper, Lookup, NavStop,
    NextPost, ParsedComment, PostNavigator, UserRowParser,
};

use crate::budget::StopReason;
use crate::context::RunContext;
use crate::error::DiscoveryError;
use crate::events::DiscoveryEvent;
use crate::ledger::Admission;
use crate::progress::ProgressTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Every reachable post was processed and the source is marked DONE.
    Completed { posts: u32, end: NavStop },
    /// A previous run already completed this source.
    AlreadyDone,
    /// The source could not be opened; its progress is left untouched.
    Unreachable,
    /// A budget fired; progress holds the last finished phase.
    Stopped(StopReason),
}

/// Result of one list harvest on the open post.
#[derive(Debug, Clone, Copy, Default)]
struct Harvest {
    recorded: u32,
    stopped: bool,
}

/// Process `source` from its saved phase until it is done or a budget fires.
///
/// # Errors
///
/// Returns [`DiscoveryError`] when the device fails, the store fails or the
/// progress machine refuses a transition.
pub async fn process_source(
    ctx: &mut RunContext<'_>,
    source: &SourceKey,
) -> Result<SourceOutcome, DiscoveryError> {
    let mut tracker = ProgressTracker::load(ctx.store, ctx.campaign_id, source).await?;
    if tracker.is_completed() {
        tracing::info!(source = %source, "source already completed, skipping");
        return Ok(SourceOutcome::AlreadyDone);
    }
    if let Some(reason) = ctx.stop_reason() {
        return Ok(SourceOutcome::Stopped(reason));
    }

    let session = ctx.session;
    let Lookup::Found(route) = navigation::open_source(session, source).await? else {
        tracing::warn!(source = %source, "source could not be opened");
        return Ok(SourceOutcome::Unreachable);
    };
    if route.is_degraded() {
        ctx.counts.degraded += 1;
        tracing::warn!(source = %source, ?route, degraded = true, "opened source through search");
    }

    if tracker.phase() == Phase::Profile {
        let total_posts = match source.source_type {
            SourceType::Target => {
                let Lookup::Found(attributes) =
                    prospect_scraper::read_profile(session, &source.value).await?
                else {
                    tracing::warn!(source = %source, "target profile not readable");
                    return Ok(SourceOutcome::Unreachable);
                };
                attributes.posts.map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            }
            SourceType::Hashtag => None,
            SourceType::PostUrl => Some(1),
        };
        tracker.complete_profile(total_posts).await?;
        ctx.events.emit(&DiscoveryEvent::PhaseCompleted {
            source: source.clone(),
            post_index: tracker.post_index(),
            phase: Phase::Profile,
            scraped: 0,
        });
    }

    let mut navigator =
        PostNavigator::new(session, source.clone(), ctx.config.max_posts_per_source);
    navigator.resume_at(tracker.post_index()).await?;
    let mut posts = 0u32;

    let end = loop {
        if let Some(reason) = ctx.stop_reason() {
            tracing::info!(source = %source, %reason, "stopping source");
            return Ok(SourceOutcome::Stopped(reason));
        }
        let current = match navigator.next_post().await? {
            NextPost::Post(current) => current,
            NextPost::Stop(stop) => break stop,
        };
        tracker.move_to_post(current.index)?;
        tracing::info!(
            source = %source,
            post_index = current.index,
            phase = %tracker.phase(),
            signature = %current.signature,
            "processing post"
        );

        if tracker.phase() == Phase::Likers {
            let harvest = harvest_likers(ctx, source, &current).await?;
            if harvest.stopped {
                return Ok(stopped(ctx, source));
            }
            tracker
                .complete_likers(&current.post_ref, harvest.recorded, current.signature.likes, None)
                .await?;
            ctx.events.emit(&DiscoveryEvent::PhaseCompleted {
                source: source.clone(),
                post_index: current.index,
                phase: Phase::Likers,
                scraped: harvest.recorded,
            });
            if let Some(reason) = ctx.stop_reason() {
                tracing::info!(source = %source, %reason, "stopping source after likers");
                return Ok(SourceOutcome::Stopped(reason));
            }
        }

        if tracker.phase() == Phase::Comments {
            let harvest = harvest_comments(ctx, source, &current).await?;
            if harvest.stopped {
                return Ok(stopped(ctx, source));
            }
            tracker
                .complete_comments(
                    &current.post_ref,
                    harvest.recorded,
                    current.signature.comments,
                    None,
                )
                .await?;
            ctx.events.emit(&DiscoveryEvent::PhaseCompleted {
                source: source.clone(),
                post_index: current.index,
                phase: Phase::Comments,
                scraped: harvest.recorded,
            });
        }
        posts += 1;
    };

    if end == NavStop::Stuck {
        ctx.counts.sources_stuck += 1;
        ctx.events.emit(&DiscoveryEvent::SourceStuck {
            source: source.clone(),
            unique_posts: navigator.unique_posts(),
        });
    }
    tracker.finish().await?;
    tracing::info!(source = %source, posts, ?end, "source completed");
    Ok(SourceOutcome::Completed { posts, end })
}

fn stopped(ctx: &RunContext<'_>, source: &SourceKey) -> SourceOutcome {
    let reason = ctx.stop_reason().unwrap_or(StopReason::SessionTime);
    tracing::info!(source = %source, %reason, "stopped mid-list");
    SourceOutcome::Stopped(reason)
}

fn remaining(limit: u32, seen: &HashSet<String>) -> usize {
    usize::try_from(limit)
        .unwrap_or(usize::MAX)
        .saturating_sub(seen.len())
}

async fn harvest_likers(
    ctx: &mut RunContext<'_>,
    source: &SourceKey,
    current: &CurrentPost,
) -> Result<Harvest, DiscoveryError> {
    let session = ctx.session;
    if !post::open_likers(session).await?.is_found() {
        tracing::warn!(source = %source, post_ref = %current.post_ref, "likers not available");
        return Ok(Harvest::default());
    }

    let mut seen = ctx
        .store
        .recorded_usernames(ctx.campaign_id, &current.post_ref, InteractionKind::Like)
        .await?;
    let max = remaining(ctx.config.max_likers_per_post, &seen);
    let budget = ctx.budget;
    let ledger = &ctx.ledger;
    let stop = |rows: &[String]| {
        budget.expired() || ledger.would_fill(rows.iter().map(String::as_str))
    };
    let harvest = ListScraper::new(session)
        .scrape(&mut UserRowParser, max, &mut seen, &stop)
        .await?;
    session.back().await?;
    if harvest.degraded {
        ctx.counts.degraded += 1;
        tracing::warn!(post_ref = %current.post_ref, degraded = true, "likers list cut short by the app");
    }
    tracing::info!(
        source = %source,
        post_ref = %current.post_ref,
        rows = harvest.rows.len(),
        end = %harvest.end,
        passes = harvest.passes,
        "likers harvested"
    );

    let mut out = Harvest {
        recorded: 0,
        stopped: harvest.end == ListEnd::Stopped,
    };
    for username in &harvest.rows {
        let interaction = Interaction::like(source.clone(), current.post_ref.clone());
        if ctx.record(username, interaction).await? != Admission::Rejected {
            out.recorded += 1;
        }
    }
    ctx.counts.likers_scraped += out.recorded;
    Ok(out)
}

async fn harvest_comments(
    ctx: &mut RunContext<'_>,
    source: &SourceKey,
    current: &CurrentPost,
) -> Result<Harvest, DiscoveryError> {
    let session = ctx.session;
    if !post::open_comments(session).await?.is_found() {
        tracing::warn!(source = %source, post_ref = %current.post_ref, "comments not available");
        return Ok(Harvest::default());
    }
    if !post::apply_comment_sort(session, ctx.config.comment_sort).await? {
        tracing::warn!(
            source = %source,
            sort = ?ctx.config.comment_sort,
            "comment sort not applied, reading default order"
        );
    }

    let mut seen = ctx
        .store
        .recorded_usernames(ctx.campaign_id, &current.post_ref, InteractionKind::Comment)
        .await?;
    let max = remaining(ctx.config.max_comments_per_post, &seen);
    let budget = ctx.budget;
    let ledger = &ctx.ledger;
    let stop = |rows: &[ParsedComment]| {
        budget.expired() || ledger.would_fill(rows.iter().map(|c| c.username.as_str()))
    };
    let mut parser = CommentRowParser::default();
    let harvest = ListScraper::new(session)
        .scrape(&mut parser, max, &mut seen, &stop)
        .await?;
    session.back().await?;
    if harvest.degraded {
        ctx.counts.degraded += 1;
        tracing::warn!(post_ref = %current.post_ref, degraded = true, "comment list cut short by the app");
    }
    tracing::info!(
        source = %source,
        post_ref = %current.post_ref,
        rows = harvest.rows.len(),
        end = %harvest.end,
        "comments harvested"
    );

    let mut out = Harvest {
        recorded: 0,
        stopped: harvest.end == ListEnd::Stopped,
    };
    for comment in harvest.rows {
        let interaction = Interaction::comment(
            source.clone(),
            current.post_ref.clone(),
            &comment.text,
            comment.like_count,
        );
        if ctx.record(&comment.username, interaction).await? == Admission::Rejected {
            continue;
        }
        ctx.store
            .append_comment(
                ctx.campaign_id,
                &CommentRecord {
                    username: comment.username,
                    text: comment.text,
                    like_count: comment.like_count,
                    is_reply: comment.is_reply,
                    parent_username: comment.parent_username,
                    post_ref: current.post_ref.clone(),
                    source: source.clone(),
                },
            )
            .await?;
        out.recorded += 1;
    }
    ctx.counts.comments_scraped += out.recorded;
    Ok(out)
}
