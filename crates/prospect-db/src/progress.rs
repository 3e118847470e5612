//! Database operations for `discovery_progress`.

use prospect_core::{PhaseCounter, ProgressState, ResumeHint, SourceKey};
use sqlx::PgPool;

use crate::{from_db_int, to_db_int, DbError};

/// A row from the `discovery_progress` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub source_type: String,
    pub source_value: String,
    pub current_post_index: i32,
    pub total_posts: Option<i32>,
    pub current_phase: String,
    pub likers_scraped: i32,
    pub likers_total: i32,
    pub comments_scraped: i32,
    pub comments_total: i32,
    pub resume_hint: serde_json::Value,
    pub status: String,
}

impl TryFrom<ProgressRow> for ProgressState {
    type Error = DbError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        let resume_hint: ResumeHint = if row.resume_hint.is_null() {
            ResumeHint::default()
        } else {
            serde_json::from_value(row.resume_hint)?
        };
        Ok(ProgressState {
            source: SourceKey::new(row.source_type.parse()?, row.source_value),
            current_post_index: from_db_int(row.current_post_index),
            total_posts: row.total_posts.map(from_db_int),
            phase: row.current_phase.parse()?,
            likers: PhaseCounter {
                scraped: from_db_int(row.likers_scraped),
                total: from_db_int(row.likers_total),
            },
            comments: PhaseCounter {
                scraped: from_db_int(row.comments_scraped),
                total: from_db_int(row.comments_total),
            },
            resume_hint,
            status: row.status.parse()?,
        })
    }
}

const PROGRESS_COLUMNS: &str = "source_type, source_value, current_post_index, total_posts, \
     current_phase, likers_scraped, likers_total, comments_scraped, comments_total, \
     resume_hint, status";

/// Fetches the progress row for one source of a campaign.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_progress(
    pool: &PgPool,
    campaign_id: i64,
    source: &SourceKey,
) -> Result<Option<ProgressRow>, DbError> {
    let row = sqlx::query_as::<_, ProgressRow>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM discovery_progress \
         WHERE campaign_id = $1 AND source_type = $2 AND source_value = $3"
    ))
    .bind(campaign_id)
    .bind(source.source_type.as_str())
    .bind(&source.value)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists every `in_progress` row of a campaign.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_open_progress(
    pool: &PgPool,
    campaign_id: i64,
) -> Result<Vec<ProgressRow>, DbError> {
    let rows = sqlx::query_as::<_, ProgressRow>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM discovery_progress \
         WHERE campaign_id = $1 AND status = 'in_progress' \
         ORDER BY id"
    ))
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts or replaces the progress row keyed by the state's source.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_progress(
    pool: &PgPool,
    campaign_id: i64,
    state: &ProgressState,
) -> Result<(), DbError> {
    let resume_hint = serde_json::to_value(&state.resume_hint)?;

    sqlx::query(
        "INSERT INTO discovery_progress \
             (campaign_id, source_type, source_value, current_post_index, total_posts, \
              current_phase, likers_scraped, likers_total, comments_scraped, comments_total, \
              resume_hint, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (campaign_id, source_type, source_value) DO UPDATE SET \
             current_post_index = EXCLUDED.current_post_index, \
             total_posts = EXCLUDED.total_posts, \
             current_phase = EXCLUDED.current_phase, \
             likers_scraped = EXCLUDED.likers_scraped, \
             likers_total = EXCLUDED.likers_total, \
             comments_scraped = EXCLUDED.comments_scraped, \
             comments_total = EXCLUDED.comments_total, \
             resume_hint = EXCLUDED.resume_hint, \
             status = EXCLUDED.status, \
             updated_at = NOW()",
    )
    .bind(campaign_id)
    .bind(state.source.source_type.as_str())
    .bind(&state.source.value)
    .bind(to_db_int(state.current_post_index))
    .bind(state.total_posts.map(to_db_int))
    .bind(state.phase.as_str())
    .bind(to_db_int(state.likers.scraped))
    .bind(to_db_int(state.likers.total))
    .bind(to_db_int(state.comments.scraped))
    .bind(to_db_int(state.comments.total))
    .bind(resume_hint)
    .bind(state.status.as_str())
    .execute(pool)
    .await?;

    Ok(())
}
