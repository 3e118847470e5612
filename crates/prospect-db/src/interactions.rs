//! Database operations for `discovery_interactions` and `scraped_comments`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use prospect_core::{CommentRecord, Interaction, InteractionKind, SourceKey};
use sqlx::PgPool;

use crate::{from_db_int, to_db_int, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `discovery_interactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InteractionRow {
    pub username: String,
    pub kind: String,
    pub source_type: String,
    pub source_value: String,
    pub post_ref: String,
    pub comment_text: Option<String>,
    pub comment_likes: i32,
    pub detected_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for Interaction {
    type Error = DbError;

    fn try_from(row: InteractionRow) -> Result<Self, Self::Error> {
        Ok(Interaction {
            kind: row.kind.parse()?,
            source: SourceKey::new(row.source_type.parse()?, row.source_value),
            post_ref: row.post_ref,
            comment_text: row.comment_text,
            comment_likes: from_db_int(row.comment_likes),
            detected_at: row.detected_at,
        })
    }
}

/// A row from the `scraped_comments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub campaign_id: i64,
    pub username: String,
    pub content: String,
    pub like_count: i32,
    pub is_reply: bool,
    pub parent_username: Option<String>,
    pub post_ref: String,
    pub scraped_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// Records an interaction unless the same `(username, kind, post_ref)` is
/// already stored for the campaign.
///
/// Returns `true` when a new row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_interaction(
    pool: &PgPool,
    campaign_id: i64,
    username: &str,
    interaction: &Interaction,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO discovery_interactions \
             (campaign_id, username, kind, source_type, source_value, post_ref, \
              comment_text, comment_likes, detected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (campaign_id, username, kind, post_ref) DO NOTHING",
    )
    .bind(campaign_id)
    .bind(username)
    .bind(interaction.kind.as_str())
    .bind(interaction.source.source_type.as_str())
    .bind(&interaction.source.value)
    .bind(&interaction.post_ref)
    .bind(interaction.comment_text.as_deref())
    .bind(to_db_int(interaction.comment_likes))
    .bind(interaction.detected_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Lists all interactions of a campaign in recording order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_interactions(
    pool: &PgPool,
    campaign_id: i64,
) -> Result<Vec<InteractionRow>, DbError> {
    let rows = sqlx::query_as::<_, InteractionRow>(
        "SELECT username, kind, source_type, source_value, post_ref, \
                comment_text, comment_likes, detected_at \
         FROM discovery_interactions \
         WHERE campaign_id = $1 \
         ORDER BY id",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Usernames already recorded with `kind` on `post_ref`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recorded_usernames(
    pool: &PgPool,
    campaign_id: i64,
    post_ref: &str,
    kind: InteractionKind,
) -> Result<HashSet<String>, DbError> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT username FROM discovery_interactions \
         WHERE campaign_id = $1 AND post_ref = $2 AND kind = $3",
    )
    .bind(campaign_id)
    .bind(post_ref)
    .bind(kind.as_str())
    .fetch_all(pool)
    .await?;

    Ok(names.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Stores a scraped comment. Identical comments on the same post are kept once.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_comment(
    pool: &PgPool,
    campaign_id: i64,
    comment: &CommentRecord,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO scraped_comments \
             (campaign_id, username, content, like_count, is_reply, parent_username, \
              source_type, source_value, post_ref) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (campaign_id, post_ref, username, content) DO NOTHING",
    )
    .bind(campaign_id)
    .bind(&comment.username)
    .bind(&comment.text)
    .bind(to_db_int(comment.like_count))
    .bind(comment.is_reply)
    .bind(comment.parent_username.as_deref())
    .bind(comment.source.source_type.as_str())
    .bind(&comment.source.value)
    .bind(&comment.post_ref)
    .execute(pool)
    .await?;

    Ok(())
}

/// Lists the comments scraped for a campaign.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_comments(pool: &PgPool, campaign_id: i64) -> Result<Vec<CommentRow>, DbError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT id, campaign_id, username, content, like_count, is_reply, \
                parent_username, post_ref, scraped_at \
         FROM scraped_comments \
         WHERE campaign_id = $1 \
         ORDER BY id",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
