//! Walks a source's posts one at a time with a duplicate-post guard.
//!
//! The app sometimes re-renders the same post after a failed "next"
//! gesture. Every post is fingerprinted with a [`PostSignature`]; seeing an
//! already-seen signature [`MAX_CONSECUTIVE_DUPLICATES`] times in a row means
//! pagination is stuck or the feed looped, and the source is abandoned.

use std::collections::HashSet;

use prospect_core::{SourceKey, SourceType};

use crate::device::ScrollDirection;
use crate::error::ScraperError;
use crate::post::{self, PostSignature};
use crate::session::Session;

pub const MAX_CONSECUTIVE_DUPLICATES: u32 = 5;

/// How the next post is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Open the first grid post, then swipe through the feed.
    Swipe,
    /// Open each grid post by position, backing out to the grid in between.
    Grid,
    /// Exactly one post, already on screen.
    Single,
}

impl FeedMode {
    #[must_use]
    pub fn for_source(source: &SourceKey) -> Self {
        match source.source_type {
            SourceType::Target => FeedMode::Swipe,
            SourceType::Hashtag => FeedMode::Grid,
            SourceType::PostUrl => FeedMode::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPost {
    /// Feed position of the post within its source.
    pub index: u32,
    pub post_ref: String,
    pub signature: PostSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStop {
    /// `max_posts` unique posts were handed out.
    Exhausted,
    /// Too many consecutive duplicate signatures.
    Stuck,
    /// The feed has no post at the next position.
    NoMorePosts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPost {
    Post(CurrentPost),
    Stop(NavStop),
}

pub struct PostNavigator<'s> {
    session: &'s Session,
    source: SourceKey,
    mode: FeedMode,
    max_posts: u32,
    seen: HashSet<PostSignature>,
    duplicates: u32,
    position: u32,
    unique: u32,
    opened: bool,
    pending_advance: bool,
}

impl<'s> PostNavigator<'s> {
    /// The source's screen must already be showing.
    #[must_use]
    pub fn new(session: &'s Session, source: SourceKey, max_posts: u32) -> Self {
        let mode = FeedMode::for_source(&source);
        Self {
            session,
            source,
            mode,
            max_posts,
            seen: HashSet::new(),
            duplicates: 0,
            position: 0,
            unique: 0,
            opened: false,
            pending_advance: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    #[must_use]
    pub fn unique_posts(&self) -> u32 {
        self.unique
    }

    /// Continue an interrupted source at feed position `index`.
    ///
    /// Positions before `index` count towards `max_posts` as if they had
    /// been processed; their signatures are not known.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be driven.
    pub async fn resume_at(&mut self, index: u32) -> Result<(), ScraperError> {
        if index == 0 {
            return Ok(());
        }
        match self.mode {
            FeedMode::Swipe => {
                if self.open_current().await? {
                    for _ in 0..index {
                        self.session.scroll(ScrollDirection::Down).await?;
                    }
                }
            }
            FeedMode::Grid | FeedMode::Single => {}
        }
        self.position = index;
        self.unique = index;
        tracing::info!(source = %self.source, post_index = index, "resuming source at post");
        Ok(())
    }

    /// Move to the next unique post, or say why there is none.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be driven.
    pub async fn next_post(&mut self) -> Result<NextPost, ScraperError> {
        if self.unique >= self.max_posts {
            return Ok(NextPost::Stop(NavStop::Exhausted));
        }
        if self.pending_advance {
            self.pending_advance = false;
            self.advance().await?;
        }

        loop {
            if self.unique >= self.max_posts {
                return Ok(NextPost::Stop(NavStop::Exhausted));
            }
            if !self.open_current().await? {
                tracing::debug!(source = %self.source, position = self.position, "no post at position");
                return Ok(NextPost::Stop(NavStop::NoMorePosts));
            }

            let signature = post::read_signature(self.session).await?;
            let index = self.position;
            if !self.seen.insert(signature) {
                self.duplicates += 1;
                tracing::warn!(
                    source = %self.source,
                    post_index = index,
                    duplicates = self.duplicates,
                    signature = %signature,
                    "duplicate post signature"
                );
                if self.duplicates >= MAX_CONSECUTIVE_DUPLICATES {
                    tracing::warn!(
                        source = %self.source,
                        unique_posts = self.unique,
                        "post navigation stuck on repeated posts, abandoning source"
                    );
                    return Ok(NextPost::Stop(NavStop::Stuck));
                }
                self.advance().await?;
                continue;
            }

            self.duplicates = 0;
            self.unique += 1;
            self.pending_advance = true;
            return Ok(NextPost::Post(CurrentPost {
                index,
                post_ref: self.source.post_ref(index),
                signature,
            }));
        }
    }

    async fn open_current(&mut self) -> Result<bool, ScraperError> {
        match self.mode {
            FeedMode::Single => {
                if self.position > 0 {
                    return Ok(false);
                }
                post::is_post_open(self.session).await
            }
            FeedMode::Swipe => {
                if !self.opened {
                    if !self.click_grid_post(0).await? {
                        return Ok(false);
                    }
                    self.opened = true;
                }
                post::is_post_open(self.session).await
            }
            FeedMode::Grid => {
                if !self.opened {
                    if !self.click_grid_post(self.position).await? {
                        return Ok(false);
                    }
                    self.opened = true;
                }
                post::is_post_open(self.session).await
            }
        }
    }

    async fn click_grid_post(&self, position: u32) -> Result<bool, ScraperError> {
        let tiles = self
            .session
            .query_chain(&self.session.selectors().grid_post)
            .await?;
        let Some(tile) = usize::try_from(position)
            .ok()
            .and_then(|p| tiles.into_iter().nth(p))
        else {
            return Ok(false);
        };
        self.session.click(tile).await?;
        Ok(true)
    }

    async fn advance(&mut self) -> Result<(), ScraperError> {
        self.position += 1;
        match self.mode {
            FeedMode::Swipe => self.session.scroll(ScrollDirection::Down).await,
            FeedMode::Grid => {
                if self.opened {
                    self.opened = false;
                    self.session.back().await?;
                }
                Ok(())
            }
            FeedMode::Single => Ok(()),
        }
    }
}
