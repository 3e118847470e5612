use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    Campaign, CampaignRequest, CampaignStatus, CommentRecord, DiscoveredProfile, Interaction,
    InteractionKind, ProfilePatch, ProgressState, SourceKey,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("campaign {0} not found")]
    CampaignNotFound(i64),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Durable storage for campaigns, progress, profiles and their interactions.
///
/// Every write is immediate; callers rely on a successful return meaning the
/// data survives a crash. Implementations must be safe to share, but the
/// engine only ever calls them from one task.
#[async_trait]
pub trait ProspectStore: Send + Sync {
    /// Load the campaign named by `request.resume_id`, or create one from
    /// `request.new` when no id is given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CampaignNotFound`] for an unknown resume id.
    async fn create_or_load_campaign(&self, request: &CampaignRequest)
        -> Result<Campaign, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn set_campaign_status(
        &self,
        campaign_id: i64,
        status: CampaignStatus,
    ) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn update_campaign_totals(
        &self,
        campaign_id: i64,
        total_discovered: u32,
        total_qualified: u32,
    ) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn get_progress(
        &self,
        campaign_id: i64,
        source: &SourceKey,
    ) -> Result<Option<ProgressState>, StoreError>;

    /// All progress rows of a campaign that are not yet completed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn list_open_progress(&self, campaign_id: i64)
        -> Result<Vec<ProgressState>, StoreError>;

    /// Insert or overwrite the progress row keyed by `state.source`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn put_progress(&self, campaign_id: i64, state: &ProgressState)
        -> Result<(), StoreError>;

    /// Create the profile if missing, then merge `patch` into it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn upsert_profile(
        &self,
        campaign_id: i64,
        username: &str,
        patch: &ProfilePatch,
    ) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn list_profiles(&self, campaign_id: i64)
        -> Result<Vec<DiscoveredProfile>, StoreError>;

    /// Record an interaction. Unique on `(campaign, username, kind, post_ref)`;
    /// returns `false` when it was already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn append_interaction(
        &self,
        campaign_id: i64,
        username: &str,
        interaction: &Interaction,
    ) -> Result<bool, StoreError>;

    /// Usernames that already have an interaction of `kind` on `post_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn recorded_usernames(
        &self,
        campaign_id: i64,
        post_ref: &str,
        kind: InteractionKind,
    ) -> Result<HashSet<String>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn append_comment(&self, campaign_id: i64, comment: &CommentRecord)
        -> Result<(), StoreError>;

    /// Usernames first discovered within the last `days` days by any campaign
    /// of `account_id`, other than `exclude_campaign`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn recently_seen_usernames(
        &self,
        account_id: i64,
        days: u32,
        exclude_campaign: Option<i64>,
    ) -> Result<HashSet<String>, StoreError>;
}
