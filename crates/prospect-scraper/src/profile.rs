//! Reading a profile screen.

use prospect_core::ProfileAttributes;

use crate::counts::parse_count;
use crate::error::{Lookup, ScraperError};
use crate::selectors::SelectorChain;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowList {
    Followers,
    Following,
}

/// Read the attributes of the profile on screen.
///
/// `NotFound` when no profile header shows up in time, or when the header
/// belongs to someone other than `username`.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried.
pub async fn read_profile(
    session: &Session,
    username: &str,
) -> Result<Lookup<ProfileAttributes>, ScraperError> {
    let s = session.selectors();
    if !session.wait_chain(&s.profile_header).await? {
        tracing::debug!(username, "profile header not visible");
        return Ok(Lookup::NotFound);
    }

    if let Some(shown) = text_of(session, &s.profile_username).await? {
        let shown = shown.trim_start_matches('@');
        if !shown.eq_ignore_ascii_case(username) {
            tracing::warn!(username, shown, "profile screen shows a different account");
            return Ok(Lookup::NotFound);
        }
    }

    let category = text_of(session, &s.profile_category).await?;
    let is_business =
        category.is_some() || session.find_first(&s.profile_business).await?.is_found();

    Ok(Lookup::Found(ProfileAttributes {
        bio: text_of(session, &s.profile_bio).await?,
        external_link: text_of(session, &s.profile_link).await?,
        followers: count_of(session, &s.profile_followers).await?,
        following: count_of(session, &s.profile_following).await?,
        posts: count_of(session, &s.profile_posts).await?,
        is_private: session.find_first(&s.profile_private).await?.is_found(),
        is_verified: session.find_first(&s.profile_verified).await?.is_found(),
        is_business,
        category,
    }))
}

/// Open the followers or following list of the profile on screen.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried or clicked.
pub async fn open_follow_list(session: &Session, list: FollowList) -> Result<Lookup<()>, ScraperError> {
    let s = session.selectors();
    let button = match list {
        FollowList::Followers => &s.followers_button,
        FollowList::Following => &s.following_button,
    };
    if !session.click_first(button).await? {
        tracing::debug!(?list, "follow list button not found");
        return Ok(Lookup::NotFound);
    }
    if session.wait_chain(&s.user_row).await? {
        Ok(Lookup::Found(()))
    } else {
        tracing::warn!(?list, "follow list did not render any rows");
        Ok(Lookup::NotFound)
    }
}

async fn text_of(session: &Session, chain: &SelectorChain) -> Result<Option<String>, ScraperError> {
    Ok(session
        .find_first(chain)
        .await?
        .found()
        .map(|e| e.label().trim().to_string())
        .filter(|t| !t.is_empty()))
}

async fn count_of(session: &Session, chain: &SelectorChain) -> Result<Option<u64>, ScraperError> {
    Ok(text_of(session, chain).await?.and_then(|t| parse_count(&t)))
}
