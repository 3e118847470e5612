//! In-process [`ProspectStore`] used for dry runs and engine tests.
//!
//! Mirrors the Postgres semantics: one profile per `(campaign, username)`,
//! interactions unique on `(campaign, username, kind, post_ref)`, progress
//! keyed by source.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use prospect_core::{
    Campaign, CampaignRequest, CampaignStatus, CommentRecord, DiscoveredProfile, Interaction,
    InteractionKind, ProfilePatch, ProgressState, ProspectStore, SourceKey, StoreError,
};
use uuid::Uuid;

type InteractionKey = (i64, String, InteractionKind, String);

#[derive(Debug, Default)]
struct MemoryState {
    campaigns: BTreeMap<i64, Campaign>,
    progress: BTreeMap<(i64, SourceKey), ProgressState>,
    profiles: BTreeMap<(i64, String), DiscoveredProfile>,
    interactions: Vec<(i64, String, Interaction)>,
    interaction_keys: HashSet<InteractionKey>,
    comments: Vec<(i64, CommentRecord)>,
    progress_writes: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    #[must_use]
    pub fn campaign(&self, campaign_id: i64) -> Option<Campaign> {
        self.lock().campaigns.get(&campaign_id).cloned()
    }

    #[must_use]
    pub fn progress(&self, campaign_id: i64, source: &SourceKey) -> Option<ProgressState> {
        self.lock()
            .progress
            .get(&(campaign_id, source.clone()))
            .cloned()
    }

    /// Number of `put_progress` calls so far, across campaigns.
    #[must_use]
    pub fn progress_writes(&self) -> usize {
        self.lock().progress_writes
    }

    #[must_use]
    pub fn interactions(&self, campaign_id: i64) -> Vec<(String, Interaction)> {
        self.lock()
            .interactions
            .iter()
            .filter(|(id, _, _)| *id == campaign_id)
            .map(|(_, username, interaction)| (username.clone(), interaction.clone()))
            .collect()
    }

    #[must_use]
    pub fn comments(&self, campaign_id: i64) -> Vec<CommentRecord> {
        self.lock()
            .comments
            .iter()
            .filter(|(id, _)| *id == campaign_id)
            .map(|(_, comment)| comment.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl ProspectStore for MemoryStore {
    async fn create_or_load_campaign(
        &self,
        request: &CampaignRequest,
    ) -> Result<Campaign, StoreError> {
        let mut state = self.check()?;

        if let Some(id) = request.resume_id {
            let campaign = state
                .campaigns
                .get_mut(&id)
                .ok_or(StoreError::CampaignNotFound(id))?;
            campaign.status = CampaignStatus::Active;
            return Ok(campaign.clone());
        }

        let id = state.campaigns.keys().next_back().map_or(1, |last| last + 1);
        let new = &request.new;
        let campaign = Campaign {
            id,
            public_id: Uuid::new_v4(),
            account_id: new.account_id,
            name: new.name.clone(),
            niche_keywords: new.niche_keywords.clone(),
            sources: new.sources.clone(),
            min_score_threshold: new.min_score_threshold,
            status: CampaignStatus::Active,
            total_discovered: 0,
            total_qualified: 0,
            created_at: Utc::now(),
        };
        state.campaigns.insert(id, campaign.clone());
        Ok(campaign)
    }

    async fn set_campaign_status(
        &self,
        campaign_id: i64,
        status: CampaignStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.check()?;
        let campaign = state
            .campaigns
            .get_mut(&campaign_id)
            .ok_or(StoreError::CampaignNotFound(campaign_id))?;
        campaign.status = status;
        Ok(())
    }

    async fn update_campaign_totals(
        &self,
        campaign_id: i64,
        total_discovered: u32,
        total_qualified: u32,
    ) -> Result<(), StoreError> {
        let mut state = self.check()?;
        let campaign = state
            .campaigns
            .get_mut(&campaign_id)
            .ok_or(StoreError::CampaignNotFound(campaign_id))?;
        campaign.total_discovered = total_discovered;
        campaign.total_qualified = total_qualified;
        Ok(())
    }

    async fn get_progress(
        &self,
        campaign_id: i64,
        source: &SourceKey,
    ) -> Result<Option<ProgressState>, StoreError> {
        let state = self.check()?;
        Ok(state.progress.get(&(campaign_id, source.clone())).cloned())
    }

    async fn list_open_progress(&self, campaign_id: i64) -> Result<Vec<ProgressState>, StoreError> {
        let state = self.check()?;
        Ok(state
            .progress
            .iter()
            .filter(|((id, _), p)| *id == campaign_id && !p.is_completed())
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn put_progress(&self, campaign_id: i64, progress: &ProgressState) -> Result<(), StoreError> {
        let mut state = self.check()?;
        state
            .progress
            .insert((campaign_id, progress.source.clone()), progress.clone());
        state.progress_writes += 1;
        Ok(())
    }

    async fn upsert_profile(
        &self,
        campaign_id: i64,
        username: &str,
        patch: &ProfilePatch,
    ) -> Result<(), StoreError> {
        let mut state = self.check()?;
        state
            .profiles
            .entry((campaign_id, username.to_string()))
            .or_insert_with(|| DiscoveredProfile::new(username))
            .apply(patch);
        Ok(())
    }

    async fn list_profiles(&self, campaign_id: i64) -> Result<Vec<DiscoveredProfile>, StoreError> {
        let state = self.check()?;
        let mut by_user: HashMap<&str, Vec<Interaction>> = HashMap::new();
        for (id, username, interaction) in &state.interactions {
            if *id == campaign_id {
                by_user
                    .entry(username.as_str())
                    .or_default()
                    .push(interaction.clone());
            }
        }

        Ok(state
            .profiles
            .iter()
            .filter(|((id, _), _)| *id == campaign_id)
            .map(|((_, username), profile)| DiscoveredProfile {
                interactions: by_user.remove(username.as_str()).unwrap_or_default(),
                ..profile.clone()
            })
            .collect())
    }

    async fn append_interaction(
        &self,
        campaign_id: i64,
        username: &str,
        interaction: &Interaction,
    ) -> Result<bool, StoreError> {
        let mut state = self.check()?;
        let key = (
            campaign_id,
            username.to_string(),
            interaction.kind,
            interaction.post_ref.clone(),
        );
        if !state.interaction_keys.insert(key) {
            return Ok(false);
        }
        state
            .interactions
            .push((campaign_id, username.to_string(), interaction.clone()));
        Ok(true)
    }

    async fn recorded_usernames(
        &self,
        campaign_id: i64,
        post_ref: &str,
        kind: InteractionKind,
    ) -> Result<HashSet<String>, StoreError> {
        let state = self.check()?;
        Ok(state
            .interaction_keys
            .iter()
            .filter(|(id, _, k, post)| *id == campaign_id && *k == kind && post == post_ref)
            .map(|(_, username, _, _)| username.clone())
            .collect())
    }

    async fn append_comment(
        &self,
        campaign_id: i64,
        comment: &CommentRecord,
    ) -> Result<(), StoreError> {
        let mut state = self.check()?;
        let duplicate = state.comments.iter().any(|(id, c)| {
            *id == campaign_id
                && c.post_ref == comment.post_ref
                && c.username == comment.username
                && c.text == comment.text
        });
        if !duplicate {
            state.comments.push((campaign_id, comment.clone()));
        }
        Ok(())
    }

    async fn recently_seen_usernames(
        &self,
        account_id: i64,
        days: u32,
        exclude_campaign: Option<i64>,
    ) -> Result<HashSet<String>, StoreError> {
        let state = self.check()?;
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        Ok(state
            .profiles
            .iter()
            .filter(|((id, _), profile)| {
                Some(*id) != exclude_campaign
                    && profile.first_seen_at >= cutoff
                    && state
                        .campaigns
                        .get(id)
                        .is_some_and(|c| c.account_id == account_id)
            })
            .map(|((_, username), _)| username.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_core::NewCampaign;

    fn request(account_id: i64) -> CampaignRequest {
        CampaignRequest {
            resume_id: None,
            new: NewCampaign {
                account_id,
                name: "test".to_string(),
                niche_keywords: vec!["fitness".to_string()],
                sources: vec![SourceKey::hashtag("gym")],
                min_score_threshold: 60,
            },
        }
    }

    #[tokio::test]
    async fn campaigns_get_sequential_ids_and_resume_reactivates() {
        let store = MemoryStore::new();
        let first = store.create_or_load_campaign(&request(1)).await.unwrap();
        let second = store.create_or_load_campaign(&request(1)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        store
            .set_campaign_status(first.id, CampaignStatus::Stopped)
            .await
            .unwrap();
        let resumed = store
            .create_or_load_campaign(&CampaignRequest {
                resume_id: Some(first.id),
                ..request(1)
            })
            .await
            .unwrap();
        assert_eq!(resumed.id, first.id);
        assert_eq!(resumed.status, CampaignStatus::Active);
    }

    #[tokio::test]
    async fn resume_of_unknown_campaign_fails() {
        let store = MemoryStore::new();
        let err = store
            .create_or_load_campaign(&CampaignRequest {
                resume_id: Some(9),
                ..request(1)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CampaignNotFound(9)));
    }

    #[tokio::test]
    async fn interactions_are_idempotent_per_post() {
        let store = MemoryStore::new();
        let source = SourceKey::hashtag("gym");
        let like = Interaction::like(source.clone(), "#gym/post/0");

        assert!(store.append_interaction(1, "jane", &like).await.unwrap());
        assert!(!store.append_interaction(1, "jane", &like).await.unwrap());
        let other_post = Interaction::like(source, "#gym/post/1");
        assert!(store.append_interaction(1, "jane", &other_post).await.unwrap());

        let names = store
            .recorded_usernames(1, "#gym/post/0", InteractionKind::Like)
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains("jane"));
    }

    #[tokio::test]
    async fn list_profiles_attaches_interactions() {
        let store = MemoryStore::new();
        let source = SourceKey::hashtag("gym");
        store
            .upsert_profile(1, "jane", &ProfilePatch::source(source.clone()))
            .await
            .unwrap();
        store
            .append_interaction(1, "jane", &Interaction::like(source, "#gym/post/0"))
            .await
            .unwrap();

        let profiles = store.list_profiles(1).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].interactions.len(), 1);
    }

    #[tokio::test]
    async fn recency_excludes_current_campaign_and_other_accounts() {
        let store = MemoryStore::new();
        let a = store.create_or_load_campaign(&request(1)).await.unwrap();
        let b = store.create_or_load_campaign(&request(2)).await.unwrap();
        store
            .upsert_profile(a.id, "jane", &ProfilePatch::default())
            .await
            .unwrap();
        store
            .upsert_profile(b.id, "omar", &ProfilePatch::default())
            .await
            .unwrap();

        let seen = store.recently_seen_usernames(1, 7, None).await.unwrap();
        assert!(seen.contains("jane"));
        assert!(!seen.contains("omar"));

        let seen = store.recently_seen_usernames(1, 7, Some(a.id)).await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let err = store.list_profiles(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
