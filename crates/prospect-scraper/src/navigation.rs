//! Getting a source onto the screen.
//!
//! Deep links are tried first. When a deep link does not land on the
//! expected screen the slower search path is used and the route is reported
//! as degraded; only when both fail is the source unreachable.

use prospect_core::{SourceKey, SourceType};

use crate::error::{Lookup, ScraperError};
use crate::post;
use crate::selectors::SelectorChain;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    DeepLink,
    Search,
}

impl Route {
    #[must_use]
    pub fn is_degraded(self) -> bool {
        self == Route::Search
    }
}

#[must_use]
pub fn profile_deep_link(username: &str) -> String {
    format!("instagram://user?username={username}")
}

#[must_use]
pub fn hashtag_deep_link(tag: &str) -> String {
    format!("instagram://tag?name={tag}")
}

/// Bring the screen for `source` up: a profile, a hashtag grid, or the post.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be driven.
pub async fn open_source(session: &Session, source: &SourceKey) -> Result<Lookup<Route>, ScraperError> {
    match source.source_type {
        SourceType::Target => open_profile(session, &source.value).await,
        SourceType::Hashtag => open_hashtag(session, &source.value).await,
        SourceType::PostUrl => open_post_url(session, &source.value).await,
    }
}

/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be driven.
pub async fn open_profile(session: &Session, username: &str) -> Result<Lookup<Route>, ScraperError> {
    let landing = &session.selectors().profile_header;
    session.open_uri(&profile_deep_link(username)).await?;
    if session.wait_chain(landing).await? {
        return Ok(Lookup::Found(Route::DeepLink));
    }
    search_fallback(session, username, username, landing).await
}

/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be driven.
pub async fn open_hashtag(session: &Session, tag: &str) -> Result<Lookup<Route>, ScraperError> {
    let landing = &session.selectors().hashtag_header;
    session.open_uri(&hashtag_deep_link(tag)).await?;
    if session.wait_chain(landing).await? {
        return Ok(Lookup::Found(Route::DeepLink));
    }
    search_fallback(session, &format!("#{tag}"), tag, landing).await
}

/// Post URLs have no search equivalent; if the link does not open a post
/// the source is unreachable.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be driven.
pub async fn open_post_url(session: &Session, url: &str) -> Result<Lookup<Route>, ScraperError> {
    session.open_uri(url).await?;
    if post::is_post_open(session).await? {
        Ok(Lookup::Found(Route::DeepLink))
    } else {
        tracing::warn!(url, "post link did not open a post");
        Ok(Lookup::NotFound)
    }
}

async fn search_fallback(
    session: &Session,
    query: &str,
    expected: &str,
    landing: &SelectorChain,
) -> Result<Lookup<Route>, ScraperError> {
    tracing::warn!(query, degraded = true, "deep link unavailable, falling back to search");
    let s = session.selectors();

    if !session.click_first(&s.search_tab).await? {
        tracing::warn!(query, "search tab not found");
        return Ok(Lookup::NotFound);
    }
    if !session.click_first(&s.search_input).await? {
        tracing::warn!(query, "search input not found");
        return Ok(Lookup::NotFound);
    }
    session.type_text(query).await?;
    if !session.wait_chain(&s.search_result).await? {
        tracing::warn!(query, "search returned no results");
        return Ok(Lookup::NotFound);
    }

    let results = session.query_chain(&s.search_result).await?;
    let Some(hit) = results.into_iter().find(|e| {
        e.label()
            .trim()
            .trim_start_matches('#')
            .eq_ignore_ascii_case(expected)
    }) else {
        tracing::warn!(query, "no exact search match");
        return Ok(Lookup::NotFound);
    };

    session.click(hit).await?;
    if session.wait_chain(landing).await? {
        Ok(Lookup::Found(Route::Search))
    } else {
        tracing::warn!(query, "search result did not open the expected screen");
        Ok(Lookup::NotFound)
    }
}
