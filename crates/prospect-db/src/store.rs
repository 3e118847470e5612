//! [`ProspectStore`] backed by Postgres.

use std::collections::HashSet;

use async_trait::async_trait;
use prospect_core::{
    Campaign, CampaignRequest, CampaignStatus, CommentRecord, DiscoveredProfile, Interaction,
    InteractionKind, ProfilePatch, ProgressState, ProspectStore, SourceKey, StoreError,
};
use sqlx::PgPool;

use crate::{campaigns, interactions, profiles, progress, recency, DbError};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProspectStore for PgStore {
    async fn create_or_load_campaign(
        &self,
        request: &CampaignRequest,
    ) -> Result<Campaign, StoreError> {
        let row = match request.resume_id {
            Some(id) => {
                let row = campaigns::get_campaign(&self.pool, id)
                    .await?
                    .ok_or(StoreError::CampaignNotFound(id))?;
                campaigns::set_campaign_status(&self.pool, id, CampaignStatus::Active).await?;
                tracing::info!(campaign_id = id, "resuming campaign");
                campaigns::CampaignRow {
                    status: CampaignStatus::Active.as_str().to_string(),
                    ..row
                }
            }
            None => {
                let row = campaigns::insert_campaign(&self.pool, &request.new).await?;
                tracing::info!(campaign_id = row.id, name = %row.name, "created campaign");
                row
            }
        };
        Ok(Campaign::try_from(row)?)
    }

    async fn set_campaign_status(
        &self,
        campaign_id: i64,
        status: CampaignStatus,
    ) -> Result<(), StoreError> {
        campaigns::set_campaign_status(&self.pool, campaign_id, status)
            .await
            .map_err(|e| not_found_as_campaign(e, campaign_id))
    }

    async fn update_campaign_totals(
        &self,
        campaign_id: i64,
        total_discovered: u32,
        total_qualified: u32,
    ) -> Result<(), StoreError> {
        campaigns::update_campaign_totals(&self.pool, campaign_id, total_discovered, total_qualified)
            .await
            .map_err(|e| not_found_as_campaign(e, campaign_id))
    }

    async fn get_progress(
        &self,
        campaign_id: i64,
        source: &SourceKey,
    ) -> Result<Option<ProgressState>, StoreError> {
        let row = progress::get_progress(&self.pool, campaign_id, source).await?;
        Ok(row.map(ProgressState::try_from).transpose()?)
    }

    async fn list_open_progress(&self, campaign_id: i64) -> Result<Vec<ProgressState>, StoreError> {
        let rows = progress::list_open_progress(&self.pool, campaign_id).await?;
        let states = rows
            .into_iter()
            .map(ProgressState::try_from)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(states)
    }

    async fn put_progress(&self, campaign_id: i64, state: &ProgressState) -> Result<(), StoreError> {
        Ok(progress::upsert_progress(&self.pool, campaign_id, state).await?)
    }

    async fn upsert_profile(
        &self,
        campaign_id: i64,
        username: &str,
        patch: &ProfilePatch,
    ) -> Result<(), StoreError> {
        Ok(profiles::upsert_profile(&self.pool, campaign_id, username, patch).await?)
    }

    async fn list_profiles(&self, campaign_id: i64) -> Result<Vec<DiscoveredProfile>, StoreError> {
        Ok(profiles::list_profiles(&self.pool, campaign_id).await?)
    }

    async fn append_interaction(
        &self,
        campaign_id: i64,
        username: &str,
        interaction: &Interaction,
    ) -> Result<bool, StoreError> {
        Ok(interactions::insert_interaction(&self.pool, campaign_id, username, interaction).await?)
    }

    async fn recorded_usernames(
        &self,
        campaign_id: i64,
        post_ref: &str,
        kind: InteractionKind,
    ) -> Result<HashSet<String>, StoreError> {
        Ok(interactions::recorded_usernames(&self.pool, campaign_id, post_ref, kind).await?)
    }

    async fn append_comment(
        &self,
        campaign_id: i64,
        comment: &CommentRecord,
    ) -> Result<(), StoreError> {
        Ok(interactions::insert_comment(&self.pool, campaign_id, comment).await?)
    }

    async fn recently_seen_usernames(
        &self,
        account_id: i64,
        days: u32,
        exclude_campaign: Option<i64>,
    ) -> Result<HashSet<String>, StoreError> {
        Ok(recency::recently_seen_usernames(&self.pool, account_id, days, exclude_campaign).await?)
    }
}

fn not_found_as_campaign(e: DbError, campaign_id: i64) -> StoreError {
    match e {
        DbError::NotFound => StoreError::CampaignNotFound(campaign_id),
        other => other.into(),
    }
}
