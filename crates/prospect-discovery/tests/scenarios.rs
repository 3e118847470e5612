//! End-to-end discovery runs against a scripted device and the in-memory store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use prospect_core::{
    Campaign, CampaignConfig, CampaignRequest, CampaignStatus, CommentRecord, DiscoveredProfile,
    Interaction, InteractionKind, NewCampaign, Phase, ProfileAttributes, ProfilePatch,
    ProgressState, ProspectStore, SourceKey, StoreError,
};
use prospect_db::MemoryStore;
use prospect_discovery::{
    CollectingSink, Discovery, DiscoveryEvent, RunResult, StopReason,
};
use prospect_scraper::testing::{ScriptedComment, ScriptedDevice, ScriptedPost, ScriptedProfile};

const ACCOUNT: i64 = 1;

fn names(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn hashtag_config(max_posts: u32, max_likers: u32) -> CampaignConfig {
    CampaignConfig {
        name: "food run".to_string(),
        hashtags: vec!["food".to_string()],
        niche_keywords: vec!["coffee".to_string()],
        max_posts_per_source: max_posts,
        max_likers_per_post: max_likers,
        ..CampaignConfig::default()
    }
}

async fn run(
    device: &ScriptedDevice,
    store: &MemoryStore,
    config: &CampaignConfig,
    resume_id: Option<i64>,
) -> (RunResult, CollectingSink) {
    let session = device.session();
    let sink = CollectingSink::new();
    let result = Discovery::new(store, &session, config, ACCOUNT, &sink)
        .run(resume_id)
        .await;
    (result, sink)
}

fn interaction_keys(store: &MemoryStore, campaign_id: i64) -> Vec<(String, InteractionKind, String)> {
    store
        .interactions(campaign_id)
        .into_iter()
        .map(|(username, i)| (username, i.kind, i.post_ref))
        .collect()
}

fn anna() -> ScriptedProfile {
    ScriptedProfile::new(ProfileAttributes {
        bio: Some("Founder of a coffee roastery, DM for wholesale".to_string()),
        external_link: Some("https://anna.coffee".to_string()),
        followers: Some(2_400),
        following: Some(800),
        posts: Some(120),
        is_business: true,
        ..ProfileAttributes::default()
    })
}

// ---- Test 1 – hashtag run completes within its limits -----------------------

#[tokio::test]
async fn hashtag_run_completes_within_post_and_liker_limits() {
    let device = ScriptedDevice::new()
        .with_hashtag(
            "food",
            vec![
                ScriptedPost::new(100)
                    .likers(names("a", 8))
                    .comments(vec![
                        ScriptedComment::new("anna", "love this roast").likes(3),
                        ScriptedComment::new("ben", "same here").reply_to("anna"),
                    ]),
                ScriptedPost::new(200).likers(names("b", 8)),
                ScriptedPost::new(300).likers(names("c", 8)),
            ],
        )
        .with_profile("anna", anna());
    let store = MemoryStore::new();
    let config = hashtag_config(2, 5);

    let (result, sink) = run(&device, &store, &config, None).await;

    assert!(result.success, "run failed: {:?}", result.error);
    let campaign_id = result.campaign_id.unwrap();
    assert_eq!(store.campaign(campaign_id).unwrap().status, CampaignStatus::Completed);
    assert_eq!(result.counts.likers_scraped, 10);
    assert_eq!(result.counts.comments_scraped, 2);
    assert_eq!(result.counts.profiles_discovered, 12);
    assert_eq!(result.counts.sources_completed, 1);
    assert!(result.stop_reason.is_none());

    let keys = interaction_keys(&store, campaign_id);
    assert!(keys.iter().all(|(_, _, post_ref)| !post_ref.ends_with("/post/2")));

    let reply = store
        .comments(campaign_id)
        .into_iter()
        .find(|c| c.username == "ben")
        .unwrap();
    assert!(reply.is_reply);
    assert_eq!(reply.parent_username.as_deref(), Some("anna"));

    let progress = store.progress(campaign_id, &SourceKey::hashtag("food")).unwrap();
    assert_eq!(progress.phase, Phase::Done);
    assert!(progress.is_completed());

    // only anna has a reachable profile
    assert_eq!(result.counts.profiles_enriched, 1);
    let profiles = store.list_profiles(campaign_id).await.unwrap();
    let anna = profiles.iter().find(|p| p.username == "anna").unwrap();
    assert!(anna.attributes.is_some());
    assert!(anna.score.is_some());

    assert!(matches!(
        sink.events().last(),
        Some(DiscoveryEvent::Summary { profiles_scraped: 12, .. })
    ));
}

// ---- Test 2 – repeated posts halt the source --------------------------------

#[tokio::test]
async fn duplicate_posts_halt_the_source_instead_of_looping() {
    let posts = (0..8)
        .map(|_| ScriptedPost::new(42).likers(["same"]))
        .collect();
    let device = ScriptedDevice::new().with_hashtag("food", posts);
    let store = MemoryStore::new();
    let config = CampaignConfig {
        enrich_profiles: false,
        ..hashtag_config(8, 10)
    };

    let (result, sink) = run(&device, &store, &config, None).await;

    assert!(result.success);
    assert_eq!(result.counts.sources_stuck, 1);
    assert_eq!(result.counts.sources_completed, 1);
    let campaign_id = result.campaign_id.unwrap();
    let keys = interaction_keys(&store, campaign_id);
    assert_eq!(keys, vec![("same".to_string(), InteractionKind::Like, "#food/post/0".to_string())]);
    let progress = store.progress(campaign_id, &SourceKey::hashtag("food")).unwrap();
    assert!(progress.is_completed());

    let stuck: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, DiscoveryEvent::SourceStuck { .. }))
        .collect();
    assert_eq!(
        stuck,
        vec![DiscoveryEvent::SourceStuck {
            source: SourceKey::hashtag("food"),
            unique_posts: 1,
        }]
    );
}

// ---- Test 3 – recently seen prospects are recorded but not enriched ---------

#[tokio::test]
async fn recently_seen_prospect_is_recorded_once_and_not_enriched() {
    let store = MemoryStore::new();
    let earlier = store
        .create_or_load_campaign(&CampaignRequest {
            resume_id: None,
            new: NewCampaign {
                account_id: ACCOUNT,
                name: "earlier".to_string(),
                niche_keywords: Vec::new(),
                sources: vec![SourceKey::hashtag("drinks")],
                min_score_threshold: 60,
            },
        })
        .await
        .unwrap();
    store
        .upsert_profile(earlier.id, "anna", &ProfilePatch::source(SourceKey::hashtag("drinks")))
        .await
        .unwrap();

    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(10).likers(["anna", "max"])])
        .with_profile("anna", anna());
    let config = hashtag_config(1, 10);

    let (result, _) = run(&device, &store, &config, None).await;

    assert!(result.success);
    assert_eq!(result.counts.skipped_recent, 1);
    assert_eq!(result.counts.profiles_enriched, 0);
    let campaign_id = result.campaign_id.unwrap();
    assert_ne!(campaign_id, earlier.id);

    let anna_rows = interaction_keys(&store, campaign_id)
        .into_iter()
        .filter(|(username, _, _)| username == "anna")
        .count();
    assert_eq!(anna_rows, 1);
    let profiles = store.list_profiles(campaign_id).await.unwrap();
    let anna = profiles.iter().find(|p| p.username == "anna").unwrap();
    assert!(anna.recently_seen);
    assert!(anna.attributes.is_none());
    assert!(anna.score.is_none());
}

// ---- Test 4 – profile cap stops the run as a success ------------------------

#[tokio::test]
async fn profile_cap_stops_collection_but_run_succeeds() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(10).likers(names("u", 6))]);
    let store = MemoryStore::new();
    let config = CampaignConfig {
        max_profiles: 3,
        ..hashtag_config(1, 10)
    };

    let (result, _) = run(&device, &store, &config, None).await;

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.stop_reason, Some(StopReason::MaxProfiles));
    assert_eq!(result.counts.profiles_discovered, 3);
    assert_eq!(store.interactions(result.campaign_id.unwrap()).len(), 3);
}

// ---- Test 5 – a prospect seen in two sources is one profile -----------------

#[tokio::test]
async fn prospect_across_sources_merges_into_one_profile() {
    let device = ScriptedDevice::new()
        .with_profile(
            "acme",
            ScriptedProfile::new(ProfileAttributes {
                posts: Some(1),
                ..ProfileAttributes::default()
            })
            .posts(vec![ScriptedPost::new(50).likers(["jane", "bob"])]),
        )
        .with_hashtag("food", vec![ScriptedPost::new(60).likers(["jane", "cara"])]);
    let store = MemoryStore::new();
    let config = CampaignConfig {
        targets: vec!["acme".to_string()],
        enrich_profiles: false,
        ..hashtag_config(1, 10)
    };

    let (result, _) = run(&device, &store, &config, None).await;

    assert!(result.success);
    assert_eq!(result.counts.profiles_discovered, 3);
    assert_eq!(result.counts.sources_completed, 2);
    let campaign_id = result.campaign_id.unwrap();

    let target = store.progress(campaign_id, &SourceKey::target("acme")).unwrap();
    assert_eq!(target.total_posts, Some(1));

    let profiles = store.list_profiles(campaign_id).await.unwrap();
    let jane = profiles.iter().find(|p| p.username == "jane").unwrap();
    assert_eq!(jane.sources.len(), 2);
    assert_eq!(jane.like_count(), 2);
}

// ---- Test 6 – unreachable source does not abort the run ---------------------

#[tokio::test]
async fn unreachable_source_is_skipped() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(10).likers(["jane"])]);
    let store = MemoryStore::new();
    let config = CampaignConfig {
        hashtags: vec!["missing".to_string(), "food".to_string()],
        enrich_profiles: false,
        ..hashtag_config(1, 10)
    };

    let (result, _) = run(&device, &store, &config, None).await;

    assert!(result.success);
    assert_eq!(result.counts.sources_failed, 1);
    assert_eq!(result.counts.sources_completed, 1);
    assert_eq!(result.counts.profiles_discovered, 1);
}

// ---- Test 7 – resume continues from the saved phase -------------------------

#[tokio::test]
async fn resume_picks_up_comments_of_interrupted_post_without_duplicates() {
    let device = ScriptedDevice::new().with_hashtag(
        "food",
        vec![
            ScriptedPost::new(100).likers(names("u", 3)),
            ScriptedPost::new(200)
                .likers(names("v", 3))
                .comments(vec![ScriptedComment::new("c1", "great spot")]),
            ScriptedPost::new(300).likers(names("w", 3)),
        ],
    );
    let store = MemoryStore::new();
    let first = CampaignConfig {
        max_profiles: 5,
        enrich_profiles: false,
        ..hashtag_config(3, 3)
    };

    // u0..u2 from post 0, then v0 and v1 fill the cap during post 1's likers,
    // leaving that list unfinished
    let (interrupted, _) = run(&device, &store, &first, None).await;
    assert_eq!(interrupted.stop_reason, Some(StopReason::MaxProfiles));
    let campaign_id = interrupted.campaign_id.unwrap();
    let saved = store.progress(campaign_id, &SourceKey::hashtag("food")).unwrap();
    assert_eq!(saved.phase, Phase::Likers);
    assert_eq!(saved.current_post_index, 1);

    let second = CampaignConfig {
        max_profiles: 100,
        ..first
    };
    let (resumed, _) = run(&device, &store, &second, Some(campaign_id)).await;

    assert!(resumed.success);
    assert_eq!(resumed.campaign_id, Some(campaign_id));
    assert_eq!(resumed.counts.comments_scraped, 1);
    // v2 from the unfinished list, then w0..w2
    assert_eq!(resumed.counts.likers_scraped, 4);

    let keys = interaction_keys(&store, campaign_id);
    let unique: HashSet<_> = keys.iter().cloned().collect();
    assert_eq!(unique.len(), keys.len());
    assert!(keys.contains(&(
        "c1".to_string(),
        InteractionKind::Comment,
        "#food/post/1".to_string()
    )));
    let post1_likes = keys
        .iter()
        .filter(|(_, kind, post_ref)| *kind == InteractionKind::Like && post_ref == "#food/post/1")
        .count();
    assert_eq!(post1_likes, 3);

    let done = store.progress(campaign_id, &SourceKey::hashtag("food")).unwrap();
    assert_eq!(done.phase, Phase::Done);
    assert_eq!(store.campaign(campaign_id).unwrap().total_discovered, 10);
}

// ---- Test 8 – unavailable store fails the run -------------------------------

#[tokio::test]
async fn unavailable_store_returns_failure_result() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(10).likers(["jane"])]);
    let store = MemoryStore::new();
    store.set_unavailable(true);

    let (result, sink) = run(&device, &store, &hashtag_config(1, 10), None).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("unavailable"));
    assert_eq!(result.counts.profiles_discovered, 0);
    assert!(sink.events().is_empty());
}

// ---- Test 9 – reaching the profile cap ends the list without scrolling ------

#[tokio::test]
async fn profile_cap_ends_list_scrolling_at_once() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(60).likers(names("u", 60))]);
    let store = MemoryStore::new();
    let config = CampaignConfig {
        max_profiles: 3,
        enrich_profiles: false,
        ..hashtag_config(1, 100)
    };

    let (result, _) = run(&device, &store, &config, None).await;

    assert!(result.success);
    assert_eq!(result.stop_reason, Some(StopReason::MaxProfiles));
    assert_eq!(result.counts.profiles_discovered, 3);
    // the first page already holds enough new names
    assert_eq!(device.action_count("scroll:down"), 0);
    let saved = store.progress(result.campaign_id.unwrap(), &SourceKey::hashtag("food")).unwrap();
    assert_eq!(saved.phase, Phase::Likers);
}

// ---- Test 10 – a store failure mid-run stops the campaign -------------------

/// Delegates to a [`MemoryStore`] but fails every interaction write after
/// the first `allowed`.
struct FailingInteractions<'a> {
    inner: &'a MemoryStore,
    allowed: usize,
    appended: AtomicUsize,
}

impl<'a> FailingInteractions<'a> {
    fn new(inner: &'a MemoryStore, allowed: usize) -> Self {
        Self {
            inner,
            allowed,
            appended: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProspectStore for FailingInteractions<'_> {
    async fn create_or_load_campaign(
        &self,
        request: &CampaignRequest,
    ) -> Result<Campaign, StoreError> {
        self.inner.create_or_load_campaign(request).await
    }

    async fn set_campaign_status(
        &self,
        campaign_id: i64,
        status: CampaignStatus,
    ) -> Result<(), StoreError> {
        self.inner.set_campaign_status(campaign_id, status).await
    }

    async fn update_campaign_totals(
        &self,
        campaign_id: i64,
        total_discovered: u32,
        total_qualified: u32,
    ) -> Result<(), StoreError> {
        self.inner
            .update_campaign_totals(campaign_id, total_discovered, total_qualified)
            .await
    }

    async fn get_progress(
        &self,
        campaign_id: i64,
        source: &SourceKey,
    ) -> Result<Option<ProgressState>, StoreError> {
        self.inner.get_progress(campaign_id, source).await
    }

    async fn list_open_progress(&self, campaign_id: i64) -> Result<Vec<ProgressState>, StoreError> {
        self.inner.list_open_progress(campaign_id).await
    }

    async fn put_progress(&self, campaign_id: i64, state: &ProgressState) -> Result<(), StoreError> {
        self.inner.put_progress(campaign_id, state).await
    }

    async fn upsert_profile(
        &self,
        campaign_id: i64,
        username: &str,
        patch: &ProfilePatch,
    ) -> Result<(), StoreError> {
        self.inner.upsert_profile(campaign_id, username, patch).await
    }

    async fn list_profiles(&self, campaign_id: i64) -> Result<Vec<DiscoveredProfile>, StoreError> {
        self.inner.list_profiles(campaign_id).await
    }

    async fn append_interaction(
        &self,
        campaign_id: i64,
        username: &str,
        interaction: &Interaction,
    ) -> Result<bool, StoreError> {
        if self.appended.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner
            .append_interaction(campaign_id, username, interaction)
            .await
    }

    async fn recorded_usernames(
        &self,
        campaign_id: i64,
        post_ref: &str,
        kind: InteractionKind,
    ) -> Result<HashSet<String>, StoreError> {
        self.inner.recorded_usernames(campaign_id, post_ref, kind).await
    }

    async fn append_comment(
        &self,
        campaign_id: i64,
        comment: &CommentRecord,
    ) -> Result<(), StoreError> {
        self.inner.append_comment(campaign_id, comment).await
    }

    async fn recently_seen_usernames(
        &self,
        account_id: i64,
        days: u32,
        exclude_campaign: Option<i64>,
    ) -> Result<HashSet<String>, StoreError> {
        self.inner
            .recently_seen_usernames(account_id, days, exclude_campaign)
            .await
    }
}

#[tokio::test]
async fn store_failure_mid_run_stops_campaign_and_keeps_progress() {
    let device = ScriptedDevice::new().with_hashtag(
        "food",
        vec![
            ScriptedPost::new(100).likers(names("u", 3)),
            ScriptedPost::new(200).likers(names("v", 3)),
            ScriptedPost::new(300).likers(names("w", 3)),
        ],
    );
    let store = MemoryStore::new();
    let config = CampaignConfig {
        enrich_profiles: false,
        ..hashtag_config(3, 10)
    };

    // u0..u2 and v0 are written, v1 hits the failure
    let failing = FailingInteractions::new(&store, 4);
    let session = device.session();
    let sink = CollectingSink::new();
    let failed = Discovery::new(&failing, &session, &config, ACCOUNT, &sink)
        .run(None)
        .await;

    assert!(!failed.success);
    assert!(failed.error.as_deref().unwrap().contains("connection reset"));
    assert!(failed.stop_reason.is_none());
    assert_eq!(failed.counts.likers_scraped, 3);
    assert_eq!(failed.counts.interactions_recorded, 4);
    assert!(!sink
        .events()
        .iter()
        .any(|e| matches!(e, DiscoveryEvent::Summary { .. })));

    let campaign_id = failed.campaign_id.unwrap();
    assert_eq!(store.campaign(campaign_id).unwrap().status, CampaignStatus::Stopped);
    let saved = store.progress(campaign_id, &SourceKey::hashtag("food")).unwrap();
    assert_eq!(saved.phase, Phase::Likers);
    assert_eq!(saved.current_post_index, 1);
    assert_eq!(store.interactions(campaign_id).len(), 4);

    let (resumed, _) = run(&device, &store, &config, Some(campaign_id)).await;

    assert!(resumed.success, "resume failed: {:?}", resumed.error);
    // v1, v2 then w0..w2
    assert_eq!(resumed.counts.likers_scraped, 5);
    assert_eq!(store.campaign(campaign_id).unwrap().status, CampaignStatus::Completed);
    let keys = interaction_keys(&store, campaign_id);
    let unique: HashSet<_> = keys.iter().cloned().collect();
    assert_eq!(keys.len(), 9);
    assert_eq!(unique.len(), 9);
}
