//! Write-through progress state machine, one per source.
//!
//! `PROFILE -> LIKERS -> COMMENTS -> (next post) LIKERS ... -> DONE`.
//! Every transition is persisted before the method returns, so an
//! interruption loses at most the phase that was in flight.

use prospect_core::{Phase, ProgressState, ProgressStatus, ProspectStore, SourceKey};

use crate::error::ProgressError;

pub struct ProgressTracker<'a> {
    store: &'a dyn ProspectStore,
    campaign_id: i64,
    state: ProgressState,
}

impl std::fmt::Debug for ProgressTracker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("campaign_id", &self.campaign_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl<'a> ProgressTracker<'a> {
    /// Load the stored state for `source`, or persist a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Store`] if the store cannot be read or written.
    pub async fn load(
        store: &'a dyn ProspectStore,
        campaign_id: i64,
        source: &SourceKey,
    ) -> Result<Self, ProgressError> {
        let state = match store.get_progress(campaign_id, source).await? {
            Some(state) => {
                tracing::info!(
                    source = %source,
                    phase = %state.phase,
                    post_index = state.current_post_index,
                    "loaded saved progress"
                );
                state
            }
            None => {
                let state = ProgressState::new(source.clone());
                store.put_progress(campaign_id, &state).await?;
                state
            }
        };
        Ok(Self {
            store,
            campaign_id,
            state,
        })
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn post_index(&self) -> u32 {
        self.state.current_post_index
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// The navigator skipped duplicate positions; move the in-memory index
    /// forward. Persisted with the next transition.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::IndexRegressed`] if `index` is behind the
    /// current post index.
    pub fn move_to_post(&mut self, index: u32) -> Result<(), ProgressError> {
        if index < self.state.current_post_index {
            return Err(ProgressError::IndexRegressed {
                key: self.state.source.clone(),
                from: self.state.current_post_index,
                to: index,
            });
        }
        self.state.current_post_index = index;
        Ok(())
    }

    /// PROFILE finished; `total_posts` is what the source reports, if known.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] on an illegal transition or a failed write.
    pub async fn complete_profile(&mut self, total_posts: Option<u32>) -> Result<(), ProgressError> {
        self.check(Phase::Likers)?;
        if total_posts.is_some() {
            self.state.total_posts = total_posts;
        }
        self.persist(Phase::Likers).await
    }

    /// LIKERS of the current post finished with `scraped` new likers out of
    /// a shown total of `total`.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] on an illegal transition or a failed write.
    pub async fn complete_likers(
        &mut self,
        post_ref: &str,
        scraped: u32,
        total: Option<u64>,
        last_identity: Option<&str>,
    ) -> Result<(), ProgressError> {
        self.check(Phase::Comments)?;
        self.state.likers.scraped = self.state.likers.scraped.saturating_add(scraped);
        self.state.likers.total = self
            .state
            .likers
            .total
            .saturating_add(total.map_or(0, saturating_u32));
        self.note(post_ref, last_identity);
        self.persist(Phase::Comments).await
    }

    /// COMMENTS of the current post finished; the tracker moves on to the
    /// likers of the next post.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] on an illegal transition or a failed write.
    pub async fn complete_comments(
        &mut self,
        post_ref: &str,
        scraped: u32,
        total: Option<u64>,
        last_identity: Option<&str>,
    ) -> Result<(), ProgressError> {
        self.check(Phase::Likers)?;
        self.state.comments.scraped = self.state.comments.scraped.saturating_add(scraped);
        self.state.comments.total = self
            .state
            .comments
            .total
            .saturating_add(total.map_or(0, saturating_u32));
        self.state.current_post_index = self.state.current_post_index.saturating_add(1);
        self.note(post_ref, last_identity);
        self.persist(Phase::Likers).await
    }

    /// The source has no more posts to process.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] on an illegal transition or a failed write.
    pub async fn finish(&mut self) -> Result<(), ProgressError> {
        self.check(Phase::Done)?;
        self.state.status = ProgressStatus::Completed;
        self.persist(Phase::Done).await
    }

    fn check(&self, next: Phase) -> Result<(), ProgressError> {
        if self.state.phase.can_advance_to(next) {
            Ok(())
        } else {
            Err(ProgressError::IllegalTransition {
                key: self.state.source.clone(),
                from: self.state.phase,
                to: next,
            })
        }
    }

    fn note(&mut self, post_ref: &str, last_identity: Option<&str>) {
        self.state.resume_hint.last_post_ref = Some(post_ref.to_string());
        if let Some(identity) = last_identity {
            self.state.resume_hint.last_identity = Some(identity.to_string());
        }
    }

    async fn persist(&mut self, next: Phase) -> Result<(), ProgressError> {
        let previous = self.state.phase;
        self.state.phase = next;
        if let Err(e) = self.store.put_progress(self.campaign_id, &self.state).await {
            self.state.phase = previous;
            return Err(e.into());
        }
        tracing::debug!(
            source = %self.state.source,
            from = %previous,
            to = %next,
            post_index = self.state.current_post_index,
            "progress persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
