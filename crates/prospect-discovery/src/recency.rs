//! Usernames harvested recently by the same account.
//!
//! A recently-seen prospect is still recorded (its interactions matter for
//! the engagement graph) but is never enriched or scored again in this run.

use std::collections::HashSet;

use prospect_core::{ProspectStore, StoreError};

#[derive(Debug, Default)]
pub struct RecencyCache {
    known: HashSet<String>,
    skipped: HashSet<String>,
}

impl RecencyCache {
    /// Load the window for `account_id`, leaving out `exclude_campaign` so a
    /// resumed campaign does not skip its own harvest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub async fn load(
        store: &dyn ProspectStore,
        account_id: i64,
        days: u32,
        exclude_campaign: Option<i64>,
    ) -> Result<Self, StoreError> {
        let known = store
            .recently_seen_usernames(account_id, days, exclude_campaign)
            .await?;
        tracing::info!(
            account_id,
            days,
            usernames = known.len(),
            "loaded recency cache"
        );
        Ok(Self::from_usernames(known))
    }

    #[must_use]
    pub fn from_usernames(known: HashSet<String>) -> Self {
        Self {
            known,
            skipped: HashSet::new(),
        }
    }

    /// A cache that knows nobody; used when recency skipping is disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.known.contains(username)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Count `username` as skipped. Returns `false` if it was already counted.
    pub fn mark_skipped(&mut self, username: &str) -> bool {
        if self.skipped.contains(username) {
            return false;
        }
        self.skipped.insert(username.to_string());
        tracing::debug!(username, "recently seen, skipping enrichment");
        true
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.len()
    }
}
