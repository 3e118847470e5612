//! Database operations for `discovered_profiles`.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use prospect_core::{
    DiscoveredProfile, Interaction, Persona, ProfileAttributes, ProfilePatch, ProfileScore,
    ScoreBreakdown, SourceKey,
};
use sqlx::PgPool;

use crate::interactions::list_interactions;
use crate::{from_db_bigint, to_db_bigint, DbError};

/// A row from the `discovered_profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub username: String,
    pub sources: serde_json::Value,
    pub bio: Option<String>,
    pub external_link: Option<String>,
    pub followers_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
    pub is_private: bool,
    pub is_verified: bool,
    pub is_business: bool,
    pub category: Option<String>,
    pub enriched_at: Option<DateTime<Utc>>,
    pub score: Option<i16>,
    pub score_breakdown: Option<serde_json::Value>,
    pub persona: Option<serde_json::Value>,
    pub recently_seen: bool,
    pub first_seen_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Builds the domain record; interactions are attached by the caller.
    fn into_profile(self, interactions: Vec<Interaction>) -> Result<DiscoveredProfile, DbError> {
        let sources: BTreeSet<SourceKey> = serde_json::from_value(self.sources)?;

        let attributes = self.enriched_at.map(|_| ProfileAttributes {
            bio: self.bio,
            external_link: self.external_link,
            followers: self.followers_count.map(from_db_bigint),
            following: self.following_count.map(from_db_bigint),
            posts: self.posts_count.map(from_db_bigint),
            is_private: self.is_private,
            is_verified: self.is_verified,
            is_business: self.is_business,
            category: self.category,
        });

        let score = match (self.score, self.score_breakdown) {
            (Some(score), Some(breakdown)) => Some(ProfileScore {
                score: u8::try_from(score)
                    .map_err(|_| DbError::InvalidValue(format!("score {score} out of range")))?,
                breakdown: serde_json::from_value::<ScoreBreakdown>(breakdown)?,
            }),
            _ => None,
        };

        let persona = self
            .persona
            .map(serde_json::from_value::<Persona>)
            .transpose()?;

        Ok(DiscoveredProfile {
            username: self.username,
            interactions,
            sources,
            attributes,
            score,
            persona,
            recently_seen: self.recently_seen,
            first_seen_at: self.first_seen_at,
        })
    }
}

/// Creates the profile row if needed and merges `patch` into it.
///
/// Sources are unioned under a row lock; attribute columns are only written
/// when the patch carries attributes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn upsert_profile(
    pool: &PgPool,
    campaign_id: i64,
    username: &str,
    patch: &ProfilePatch,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO discovered_profiles (campaign_id, username) VALUES ($1, $2) \
         ON CONFLICT (campaign_id, username) DO NOTHING",
    )
    .bind(campaign_id)
    .bind(username)
    .execute(&mut *tx)
    .await?;

    let stored: serde_json::Value = sqlx::query_scalar(
        "SELECT sources FROM discovered_profiles \
         WHERE campaign_id = $1 AND username = $2 FOR UPDATE",
    )
    .bind(campaign_id)
    .bind(username)
    .fetch_one(&mut *tx)
    .await?;

    let mut sources: BTreeSet<SourceKey> = serde_json::from_value(stored)?;
    sources.extend(patch.sources.iter().cloned());
    let sources = serde_json::to_value(&sources)?;

    let attrs = patch.attributes.as_ref();
    let breakdown = patch
        .score
        .map(|s| serde_json::to_value(s.breakdown))
        .transpose()?;
    let persona = patch.persona.as_ref().map(serde_json::to_value).transpose()?;

    sqlx::query(
        "UPDATE discovered_profiles SET \
             sources = $3, \
             bio = CASE WHEN $4 THEN $5 ELSE bio END, \
             external_link = CASE WHEN $4 THEN $6 ELSE external_link END, \
             followers_count = CASE WHEN $4 THEN $7 ELSE followers_count END, \
             following_count = CASE WHEN $4 THEN $8 ELSE following_count END, \
             posts_count = CASE WHEN $4 THEN $9 ELSE posts_count END, \
             is_private = CASE WHEN $4 THEN $10 ELSE is_private END, \
             is_verified = CASE WHEN $4 THEN $11 ELSE is_verified END, \
             is_business = CASE WHEN $4 THEN $12 ELSE is_business END, \
             category = CASE WHEN $4 THEN $13 ELSE category END, \
             enriched_at = CASE WHEN $4 THEN NOW() ELSE enriched_at END, \
             score = COALESCE($14, score), \
             score_breakdown = COALESCE($15, score_breakdown), \
             persona = COALESCE($16, persona), \
             recently_seen = recently_seen OR $17, \
             updated_at = NOW() \
         WHERE campaign_id = $1 AND username = $2",
    )
    .bind(campaign_id)
    .bind(username)
    .bind(sources)
    .bind(attrs.is_some())
    .bind(attrs.and_then(|a| a.bio.clone()))
    .bind(attrs.and_then(|a| a.external_link.clone()))
    .bind(attrs.and_then(|a| a.followers.map(to_db_bigint)))
    .bind(attrs.and_then(|a| a.following.map(to_db_bigint)))
    .bind(attrs.and_then(|a| a.posts.map(to_db_bigint)))
    .bind(attrs.is_some_and(|a| a.is_private))
    .bind(attrs.is_some_and(|a| a.is_verified))
    .bind(attrs.is_some_and(|a| a.is_business))
    .bind(attrs.and_then(|a| a.category.clone()))
    .bind(patch.score.map(|s| i16::from(s.score)))
    .bind(breakdown)
    .bind(persona)
    .bind(patch.recently_seen)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Loads every profile of a campaign with its interactions, ordered by username.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a stored value cannot be decoded.
pub async fn list_profiles(
    pool: &PgPool,
    campaign_id: i64,
) -> Result<Vec<DiscoveredProfile>, DbError> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        "SELECT username, sources, bio, external_link, followers_count, following_count, \
                posts_count, is_private, is_verified, is_business, category, enriched_at, \
                score, score_breakdown, persona, recently_seen, first_seen_at \
         FROM discovered_profiles \
         WHERE campaign_id = $1 \
         ORDER BY username",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    let mut by_user: HashMap<String, Vec<Interaction>> = HashMap::new();
    for row in list_interactions(pool, campaign_id).await? {
        let username = row.username.clone();
        by_user
            .entry(username)
            .or_default()
            .push(Interaction::try_from(row)?);
    }

    rows.into_iter()
        .map(|row| {
            let interactions = by_user.remove(&row.username).unwrap_or_default();
            row.into_profile(interactions)
        })
        .collect()
}
