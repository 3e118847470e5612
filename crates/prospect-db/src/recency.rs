//! Cross-campaign recency lookup backing the enrichment skip list.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::{to_db_int, DbError};

/// Usernames first discovered within the last `days` days by any campaign of
/// `account_id`, optionally ignoring one campaign (the one being resumed).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recently_seen_usernames(
    pool: &PgPool,
    account_id: i64,
    days: u32,
    exclude_campaign: Option<i64>,
) -> Result<HashSet<String>, DbError> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT p.username \
         FROM discovered_profiles p \
         JOIN discovery_campaigns c ON c.id = p.campaign_id \
         WHERE c.account_id = $1 \
           AND p.first_seen_at >= NOW() - make_interval(days => $2) \
           AND ($3::BIGINT IS NULL OR p.campaign_id <> $3)",
    )
    .bind(account_id)
    .bind(to_db_int(days))
    .bind(exclude_campaign)
    .fetch_all(pool)
    .await?;

    Ok(names.into_iter().collect())
}
