//! Reading the currently open post and opening its likers and comments.

use prospect_core::CommentSort;
use serde::{Deserialize, Serialize};

use crate::counts::parse_count;
use crate::error::{Lookup, ScraperError};
use crate::selectors::Selectors;
use crate::session::Session;

/// Reply threads expanded per comment-sheet read.
pub const MAX_REPLY_EXPANSIONS: usize = 5;

/// Content fingerprint of the post on screen, used to notice that a "next
/// post" gesture landed on the same post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostSignature {
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub is_video: bool,
}

impl std::fmt::Display for PostSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<u64>| v.map_or_else(|| "?".to_string(), |n| n.to_string());
        write!(
            f,
            "likes={} comments={} video={}",
            show(self.likes),
            show(self.comments),
            self.is_video
        )
    }
}

/// Whether a post screen is showing.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried.
pub async fn is_post_open(session: &Session) -> Result<bool, ScraperError> {
    session.wait_chain(&session.selectors().post_view).await
}

/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried.
pub async fn read_signature(session: &Session) -> Result<PostSignature, ScraperError> {
    let s = session.selectors();
    let likes = session
        .find_first(&s.like_count)
        .await?
        .found()
        .and_then(|e| parse_count(e.label()));
    let comments = session
        .find_first(&s.comment_count)
        .await?
        .found()
        .and_then(|e| parse_count(e.label()));
    let is_video = session.find_first(&s.video_indicator).await?.is_found();

    Ok(PostSignature {
        likes,
        comments,
        is_video,
    })
}

/// Open the likers list of the post on screen.
///
/// `NotFound` when the post shows no like counter (likes hidden, or the
/// counter did not render) or the list did not appear after clicking it.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried or clicked.
pub async fn open_likers(session: &Session) -> Result<Lookup<()>, ScraperError> {
    let s = session.selectors();
    if !session.click_first(&s.like_count).await? {
        tracing::debug!("no like counter on post");
        return Ok(Lookup::NotFound);
    }
    if session.wait_chain(&s.likers_list_indicator).await? {
        return Ok(Lookup::Found(()));
    }
    tracing::warn!("likers list did not open");
    if !is_post_open(session).await? {
        session.back().await?;
    }
    Ok(Lookup::NotFound)
}

/// Open the comment sheet of the post on screen.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried or clicked.
pub async fn open_comments(session: &Session) -> Result<Lookup<()>, ScraperError> {
    let s = session.selectors();
    let clicked = session.click_first(&s.comment_button).await?
        || session.click_first(&s.comment_count).await?;
    if !clicked {
        tracing::debug!("no comment entry point on post");
        return Ok(Lookup::NotFound);
    }
    if session.wait_chain(&s.comments_view_indicator).await? {
        return Ok(Lookup::Found(()));
    }
    tracing::warn!("comment sheet did not open");
    if !is_post_open(session).await? {
        session.back().await?;
    }
    Ok(Lookup::NotFound)
}

/// Switch the open comment sheet to `sort`. Returns whether the requested
/// order is in effect; a missing menu or option leaves the default order.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried or clicked.
pub async fn apply_comment_sort(session: &Session, sort: CommentSort) -> Result<bool, ScraperError> {
    if sort == CommentSort::ForYou {
        return Ok(true);
    }
    if !session
        .click_first(&session.selectors().comment_sort_button)
        .await?
    {
        tracing::debug!(sort = %sort, "comment sort button not found");
        return Ok(false);
    }

    let option = Selectors::sort_option(sort.label());
    match session.device().query_visible(&option).await?.into_iter().next() {
        Some(element) => {
            session.click(element).await?;
            tracing::debug!(sort = %sort, "comment sort applied");
            Ok(true)
        }
        None => {
            tracing::warn!(sort = %sort, "comment sort option missing, keeping default order");
            session.back().await?;
            Ok(false)
        }
    }
}

/// Click up to [`MAX_REPLY_EXPANSIONS`] visible "view replies" controls.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried or clicked.
pub async fn expand_replies(session: &Session) -> Result<usize, ScraperError> {
    let buttons = session.query_chain(&session.selectors().view_replies).await?;
    let mut expanded = 0;
    for button in buttons.into_iter().take(MAX_REPLY_EXPANSIONS) {
        session.click(button).await?;
        expanded += 1;
    }
    if expanded > 0 {
        tracing::debug!(expanded, "expanded reply threads");
    }
    Ok(expanded)
}
