//! Database operations for `discovery_campaigns`.

use chrono::{DateTime, Utc};
use prospect_core::{Campaign, CampaignStatus, NewCampaign, SourceKey};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{from_db_int, to_db_int, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `discovery_campaigns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: i64,
    pub public_id: Uuid,
    pub account_id: i64,
    pub name: String,
    pub niche_keywords: Vec<String>,
    /// JSON array of `SourceKey`.
    pub sources: serde_json::Value,
    pub min_score_threshold: i16,
    pub status: String,
    pub total_discovered: i32,
    pub total_qualified: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = DbError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let sources: Vec<SourceKey> = serde_json::from_value(row.sources)?;
        Ok(Campaign {
            id: row.id,
            public_id: row.public_id,
            account_id: row.account_id,
            name: row.name,
            niche_keywords: row.niche_keywords,
            sources,
            min_score_threshold: u8::try_from(row.min_score_threshold).map_err(|_| {
                DbError::InvalidValue(format!(
                    "min_score_threshold {} out of range",
                    row.min_score_threshold
                ))
            })?,
            status: row.status.parse()?,
            total_discovered: from_db_int(row.total_discovered),
            total_qualified: from_db_int(row.total_qualified),
            created_at: row.created_at,
        })
    }
}

const CAMPAIGN_COLUMNS: &str = "id, public_id, account_id, name, niche_keywords, sources, \
     min_score_threshold, status, total_discovered, total_qualified, created_at";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Creates a new campaign in `ACTIVE` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_campaign(pool: &PgPool, new: &NewCampaign) -> Result<CampaignRow, DbError> {
    let public_id = Uuid::new_v4();
    let sources = serde_json::to_value(&new.sources)?;

    let row = sqlx::query_as::<_, CampaignRow>(&format!(
        "INSERT INTO discovery_campaigns \
             (public_id, account_id, name, niche_keywords, sources, min_score_threshold, status) \
         VALUES ($1, $2, $3, $4, $5, $6, 'ACTIVE') \
         RETURNING {CAMPAIGN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(new.account_id)
    .bind(&new.name)
    .bind(&new.niche_keywords)
    .bind(sources)
    .bind(i16::from(new.min_score_threshold))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a campaign by internal id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_campaign(pool: &PgPool, id: i64) -> Result<Option<CampaignRow>, DbError> {
    let row = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM discovery_campaigns WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Sets the campaign status.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no campaign has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_campaign_status(
    pool: &PgPool,
    id: i64,
    status: CampaignStatus,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_campaigns SET status = $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Stores the end-of-run discovered and qualified totals.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no campaign has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_campaign_totals(
    pool: &PgPool,
    id: i64,
    total_discovered: u32,
    total_qualified: u32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_campaigns \
         SET total_discovered = $1, total_qualified = $2, updated_at = NOW() \
         WHERE id = $3",
    )
    .bind(to_db_int(total_discovered))
    .bind(to_db_int(total_qualified))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
