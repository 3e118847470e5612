use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a persisted enum column holds a value this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Target,
    Hashtag,
    PostUrl,
}

impl SourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Target => "target",
            SourceType::Hashtag => "hashtag",
            SourceType::PostUrl => "post_url",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "target" => Ok(SourceType::Target),
            "hashtag" => Ok(SourceType::Hashtag),
            "post_url" => Ok(SourceType::PostUrl),
            other => Err(ParseEnumError::new("source type", other)),
        }
    }
}

/// Identity of a configured source: `(source_type, source_value)`.
///
/// Values are stored normalized, without the leading `@` or `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceKey {
    pub source_type: SourceType,
    pub value: String,
}

impl SourceKey {
    #[must_use]
    pub fn new(source_type: SourceType, value: impl Into<String>) -> Self {
        Self {
            source_type,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn target(username: impl Into<String>) -> Self {
        Self::new(SourceType::Target, username)
    }

    #[must_use]
    pub fn hashtag(tag: impl Into<String>) -> Self {
        Self::new(SourceType::Hashtag, tag)
    }

    #[must_use]
    pub fn post_url(url: impl Into<String>) -> Self {
        Self::new(SourceType::PostUrl, url)
    }

    /// Human-facing form: `@user`, `#tag`, or the post URL as-is.
    #[must_use]
    pub fn label(&self) -> String {
        match self.source_type {
            SourceType::Target => format!("@{}", self.value),
            SourceType::Hashtag => format!("#{}", self.value),
            SourceType::PostUrl => self.value.clone(),
        }
    }

    /// Synthetic reference for the post at `index` within this source.
    ///
    /// Post URLs are their own reference; grid posts have no stable URL on
    /// screen so they are addressed by position.
    #[must_use]
    pub fn post_ref(&self, index: u32) -> String {
        match self.source_type {
            SourceType::PostUrl => self.value.clone(),
            _ => format!("{}/post/{index}", self.label()),
        }
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source_type, self.value)
    }
}

// ---------------------------------------------------------------------------
// Progress state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Profile,
    Likers,
    Comments,
    Done,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Profile => "PROFILE",
            Phase::Likers => "LIKERS",
            Phase::Comments => "COMMENTS",
            Phase::Done => "DONE",
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Phases only move forward, except that finishing a post's comments
    /// wraps back to `Likers` for the following post. `Done` is terminal.
    #[must_use]
    pub fn can_advance_to(self, next: Phase) -> bool {
        match (self, next) {
            (Phase::Done, _) => false,
            (Phase::Comments, Phase::Likers) => true,
            (from, to) => to > from,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROFILE" => Ok(Phase::Profile),
            "LIKERS" => Ok(Phase::Likers),
            "COMMENTS" => Ok(Phase::Comments),
            "DONE" => Ok(Phase::Done),
            other => Err(ParseEnumError::new("phase", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

impl ProgressStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(ParseEnumError::new("progress status", other)),
        }
    }
}

/// Cumulative scraped/total pair for one phase across a source's posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounter {
    pub scraped: u32,
    pub total: u32,
}

/// Opaque breadcrumbs for a resumed run. Not a cursor: lists may reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeHint {
    pub last_post_ref: Option<String>,
    pub last_identity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub source: SourceKey,
    pub current_post_index: u32,
    pub total_posts: Option<u32>,
    pub phase: Phase,
    pub likers: PhaseCounter,
    pub comments: PhaseCounter,
    pub resume_hint: ResumeHint,
    pub status: ProgressStatus,
}

impl ProgressState {
    /// Fresh state for a source that has never been processed.
    #[must_use]
    pub fn new(source: SourceKey) -> Self {
        Self {
            source,
            current_post_index: 0,
            total_posts: None,
            phase: Phase::Profile,
            likers: PhaseCounter::default(),
            comments: PhaseCounter::default(),
            resume_hint: ResumeHint::default(),
            status: ProgressStatus::InProgress,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Active,
    Completed,
    Stopped,
}

impl CampaignStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Completed => "COMPLETED",
            CampaignStatus::Stopped => "STOPPED",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(CampaignStatus::Active),
            "COMPLETED" => Ok(CampaignStatus::Completed),
            "STOPPED" => Ok(CampaignStatus::Stopped),
            other => Err(ParseEnumError::new("campaign status", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub public_id: Uuid,
    pub account_id: i64,
    pub name: String,
    pub niche_keywords: Vec<String>,
    pub sources: Vec<SourceKey>,
    pub min_score_threshold: u8,
    pub status: CampaignStatus,
    pub total_discovered: u32,
    pub total_qualified: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a campaign record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub account_id: i64,
    pub name: String,
    pub niche_keywords: Vec<String>,
    pub sources: Vec<SourceKey>,
    pub min_score_threshold: u8,
}

/// Either resume an existing campaign by id or create a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRequest {
    pub resume_id: Option<i64>,
    pub new: NewCampaign,
}

// ---------------------------------------------------------------------------
// Interactions and comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Like,
    Comment,
}

impl InteractionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Like => "LIKE",
            InteractionKind::Comment => "COMMENT",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIKE" => Ok(InteractionKind::Like),
            "COMMENT" => Ok(InteractionKind::Comment),
            other => Err(ParseEnumError::new("interaction kind", other)),
        }
    }
}

/// One observed engagement by a prospect on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub source: SourceKey,
    pub post_ref: String,
    pub comment_text: Option<String>,
    pub comment_likes: u32,
    pub detected_at: DateTime<Utc>,
}

impl Interaction {
    #[must_use]
    pub fn like(source: SourceKey, post_ref: impl Into<String>) -> Self {
        Self {
            kind: InteractionKind::Like,
            source,
            post_ref: post_ref.into(),
            comment_text: None,
            comment_likes: 0,
            detected_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn comment(source: SourceKey, post_ref: impl Into<String>, text: &str, likes: u32) -> Self {
        Self {
            kind: InteractionKind::Comment,
            source,
            post_ref: post_ref.into(),
            comment_text: Some(text.to_string()),
            comment_likes: likes,
            detected_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub username: String,
    pub text: String,
    pub like_count: u32,
    pub is_reply: bool,
    /// Author of the top-level comment this reply hangs under.
    pub parent_username: Option<String>,
    pub post_ref: String,
    pub source: SourceKey,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Attributes captured by visiting a prospect's profile screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub bio: Option<String>,
    pub external_link: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub posts: Option<u64>,
    pub is_private: bool,
    pub is_verified: bool,
    pub is_business: bool,
    pub category: Option<String>,
}

impl ProfileAttributes {
    #[must_use]
    pub fn bio_text(&self) -> &str {
        self.bio.as_deref().unwrap_or("")
    }
}

/// Per-component scores, each already capped at 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub business_signal: u8,
    pub engagement: u8,
    pub completeness: u8,
    pub niche_relevance: u8,
    pub follower_ratio: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileScore {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Professional,
    Casual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStyle {
    Direct,
    ValueFirst,
    Curiosity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningMessage {
    pub style: MessageStyle,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub interests: Vec<String>,
    pub pain_points: Vec<String>,
    pub communication_style: CommunicationStyle,
    pub best_approach: String,
    pub ice_breaker: Option<String>,
    pub opening_messages: Vec<OpeningMessage>,
}

/// The one record per `(campaign, username)` that the engine accumulates into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredProfile {
    pub username: String,
    pub interactions: Vec<Interaction>,
    pub sources: BTreeSet<SourceKey>,
    /// Present only once enrichment has visited the profile.
    pub attributes: Option<ProfileAttributes>,
    pub score: Option<ProfileScore>,
    pub persona: Option<Persona>,
    /// Seen by an earlier campaign inside the retention window; never
    /// enriched or scored in this campaign.
    pub recently_seen: bool,
    pub first_seen_at: DateTime<Utc>,
}

impl DiscoveredProfile {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            interactions: Vec::new(),
            sources: BTreeSet::new(),
            attributes: None,
            score: None,
            persona: None,
            recently_seen: false,
            first_seen_at: Utc::now(),
        }
    }

    /// Merge an interaction into this record, adding its source.
    pub fn record(&mut self, interaction: Interaction) {
        self.sources.insert(interaction.source.clone());
        self.interactions.push(interaction);
    }

    #[must_use]
    pub fn like_count(&self) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.kind == InteractionKind::Like)
            .count()
    }

    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.kind == InteractionKind::Comment)
            .count()
    }

    #[must_use]
    pub fn has_commented(&self) -> bool {
        self.comment_count() > 0
    }

    #[must_use]
    pub fn comment_texts(&self) -> Vec<&str> {
        self.interactions
            .iter()
            .filter_map(|i| i.comment_text.as_deref())
            .collect()
    }

    /// Highest like count on any comment this person left.
    #[must_use]
    pub fn max_comment_likes(&self) -> u32 {
        self.interactions
            .iter()
            .filter(|i| i.kind == InteractionKind::Comment)
            .map(|i| i.comment_likes)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.attributes.is_some()
    }

    /// Apply a patch the same way the store does.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        self.sources.extend(patch.sources.iter().cloned());
        if let Some(attributes) = &patch.attributes {
            self.attributes = Some(attributes.clone());
        }
        if let Some(score) = patch.score {
            self.score = Some(score);
        }
        if let Some(persona) = &patch.persona {
            self.persona = Some(persona.clone());
        }
        self.recently_seen |= patch.recently_seen;
    }
}

/// Partial update for a profile; `None` fields leave stored values untouched.
///
/// Sources are unioned and `recently_seen` is sticky once set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub sources: Vec<SourceKey>,
    pub attributes: Option<ProfileAttributes>,
    pub score: Option<ProfileScore>,
    pub persona: Option<Persona>,
    pub recently_seen: bool,
}

impl ProfilePatch {
    #[must_use]
    pub fn source(source: SourceKey) -> Self {
        Self {
            sources: vec![source],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_key_display_and_label() {
        let key = SourceKey::hashtag("smallbusiness");
        assert_eq!(key.to_string(), "hashtag:smallbusiness");
        assert_eq!(key.label(), "#smallbusiness");
        assert_eq!(SourceKey::target("acme").label(), "@acme");
    }

    #[test]
    fn post_ref_is_positional_except_for_urls() {
        assert_eq!(SourceKey::target("acme").post_ref(2), "@acme/post/2");
        assert_eq!(SourceKey::hashtag("food").post_ref(0), "#food/post/0");
        let url = "https://www.instagram.com/p/Cx1/";
        assert_eq!(SourceKey::post_url(url).post_ref(0), url);
    }

    #[test]
    fn phase_round_trips_through_str() {
        for phase in [Phase::Profile, Phase::Likers, Phase::Comments, Phase::Done] {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("SHARES".parse::<Phase>().is_err());
    }

    #[test]
    fn phase_transitions_move_forward_or_wrap_to_next_post() {
        assert!(Phase::Profile.can_advance_to(Phase::Likers));
        assert!(Phase::Likers.can_advance_to(Phase::Comments));
        assert!(Phase::Comments.can_advance_to(Phase::Likers));
        assert!(Phase::Comments.can_advance_to(Phase::Done));
        assert!(Phase::Likers.can_advance_to(Phase::Done));
        assert!(!Phase::Likers.can_advance_to(Phase::Profile));
        assert!(!Phase::Done.can_advance_to(Phase::Likers));
        assert!(!Phase::Likers.can_advance_to(Phase::Likers));
    }

    #[test]
    fn phase_serializes_uppercase() {
        let json = serde_json::to_string(&Phase::Comments).unwrap();
        assert_eq!(json, "\"COMMENTS\"");
    }

    #[test]
    fn unknown_campaign_status_is_rejected() {
        let err = "PAUSED".parse::<CampaignStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown campaign status value: 'PAUSED'");
    }

    #[test]
    fn record_merges_sources_and_interactions() {
        let mut profile = DiscoveredProfile::new("jane");
        profile.record(Interaction::like(SourceKey::hashtag("a"), "#a/post/0"));
        profile.record(Interaction::comment(
            SourceKey::hashtag("b"),
            "#b/post/1",
            "love it",
            7,
        ));
        profile.record(Interaction::like(SourceKey::hashtag("a"), "#a/post/1"));

        assert_eq!(profile.interactions.len(), 3);
        assert_eq!(profile.sources.len(), 2);
        assert_eq!(profile.like_count(), 2);
        assert_eq!(profile.comment_count(), 1);
        assert!(profile.has_commented());
        assert_eq!(profile.comment_texts(), vec!["love it"]);
        assert_eq!(profile.max_comment_likes(), 7);
    }

    #[test]
    fn apply_patch_keeps_existing_fields_and_sticky_flag() {
        let mut profile = DiscoveredProfile::new("jane");
        profile.apply(&ProfilePatch {
            attributes: Some(ProfileAttributes {
                bio: Some("founder".to_string()),
                ..ProfileAttributes::default()
            }),
            recently_seen: true,
            ..ProfilePatch::default()
        });
        profile.apply(&ProfilePatch::source(SourceKey::target("acme")));

        assert!(profile.is_enriched());
        assert!(profile.recently_seen);
        assert_eq!(profile.sources.len(), 1);
    }
}
