use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::SourceKey;
use crate::ConfigError;

/// Order the comment sheet is switched to before reading comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSort {
    /// The app's own default ordering; no action needed.
    ForYou,
    #[default]
    MostRecent,
    MetaVerified,
}

impl CommentSort {
    /// Text of the sort option in the app's sort menu.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CommentSort::ForYou => "For you",
            CommentSort::MostRecent => "Most recent",
            CommentSort::MetaVerified => "Meta Verified",
        }
    }
}

impl std::fmt::Display for CommentSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentSort::ForYou => write!(f, "for_you"),
            CommentSort::MostRecent => write!(f, "most_recent"),
            CommentSort::MetaVerified => write!(f, "meta_verified"),
        }
    }
}

/// Validated run configuration for one discovery campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConfig {
    pub name: String,
    pub targets: Vec<String>,
    pub hashtags: Vec<String>,
    pub post_urls: Vec<String>,
    pub niche_keywords: Vec<String>,
    pub max_posts_per_source: u32,
    pub max_likers_per_post: u32,
    pub max_comments_per_post: u32,
    pub enrich_profiles: bool,
    pub max_profiles_to_enrich: u32,
    pub comment_sort: CommentSort,
    pub session_duration_minutes: u32,
    pub max_profiles: u32,
    pub skip_recently_scraped: bool,
    pub recency_days: u32,
    pub score_profiles: bool,
    /// Qualification threshold on the 0-100 score scale.
    pub min_score_threshold: u8,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            name: "discovery".to_string(),
            targets: Vec::new(),
            hashtags: Vec::new(),
            post_urls: Vec::new(),
            niche_keywords: Vec::new(),
            max_posts_per_source: 5,
            max_likers_per_post: 100,
            max_comments_per_post: 200,
            enrich_profiles: true,
            max_profiles_to_enrich: 50,
            comment_sort: CommentSort::MostRecent,
            session_duration_minutes: 60,
            max_profiles: 500,
            skip_recently_scraped: true,
            recency_days: 7,
            score_profiles: true,
            min_score_threshold: 60,
        }
    }
}

impl CampaignConfig {
    /// Sources in processing order: targets, then hashtags, then post URLs.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceKey> {
        self.targets
            .iter()
            .map(SourceKey::target)
            .chain(self.hashtags.iter().map(SourceKey::hashtag))
            .chain(self.post_urls.iter().map(SourceKey::post_url))
            .collect()
    }

    #[must_use]
    pub fn session_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.session_duration_minutes) * 60)
    }
}

// ---------------------------------------------------------------------------
// Raw YAML layer
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawThreshold {
    Whole(u32),
    Fraction(f64),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCampaignConfig {
    name: Option<String>,
    #[serde(default, alias = "target_accounts")]
    targets: Vec<String>,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default, alias = "post_references")]
    post_urls: Vec<String>,
    #[serde(default)]
    niche_keywords: Vec<String>,
    max_posts_per_source: Option<u32>,
    max_likers_per_post: Option<u32>,
    max_comments_per_post: Option<u32>,
    enrich_profiles: Option<bool>,
    max_profiles_to_enrich: Option<u32>,
    comment_sort: Option<CommentSort>,
    session_duration_minutes: Option<u32>,
    max_profiles: Option<u32>,
    skip_recently_scraped: Option<bool>,
    #[serde(alias = "retention_days")]
    skip_recently_scraped_days: Option<u32>,
    score_profiles: Option<bool>,
    min_score_threshold: Option<RawThreshold>,
}

/// Load and validate a campaign configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_campaign(path: &Path) -> Result<CampaignConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CampaignFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_campaign(&content)
}

/// Parse and validate a campaign configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_campaign(yaml: &str) -> Result<CampaignConfig, ConfigError> {
    let raw: RawCampaignConfig =
        serde_yaml::from_str(yaml).map_err(ConfigError::CampaignFileParse)?;
    normalize(raw)
}

fn normalize(raw: RawCampaignConfig) -> Result<CampaignConfig, ConfigError> {
    let defaults = CampaignConfig::default();

    let config = CampaignConfig {
        name: match raw.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            Some(_) => {
                return Err(ConfigError::Validation(
                    "campaign name must be non-empty".to_string(),
                ))
            }
            None => defaults.name,
        },
        targets: clean_list("targets", &raw.targets, Some('@'))?,
        hashtags: clean_list("hashtags", &raw.hashtags, Some('#'))?,
        post_urls: clean_list("post_urls", &raw.post_urls, None)?,
        niche_keywords: raw
            .niche_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect(),
        max_posts_per_source: raw
            .max_posts_per_source
            .unwrap_or(defaults.max_posts_per_source),
        max_likers_per_post: raw
            .max_likers_per_post
            .unwrap_or(defaults.max_likers_per_post),
        max_comments_per_post: raw
            .max_comments_per_post
            .unwrap_or(defaults.max_comments_per_post),
        enrich_profiles: raw.enrich_profiles.unwrap_or(defaults.enrich_profiles),
        max_profiles_to_enrich: raw
            .max_profiles_to_enrich
            .unwrap_or(defaults.max_profiles_to_enrich),
        comment_sort: raw.comment_sort.unwrap_or(defaults.comment_sort),
        session_duration_minutes: raw
            .session_duration_minutes
            .unwrap_or(defaults.session_duration_minutes),
        max_profiles: raw.max_profiles.unwrap_or(defaults.max_profiles),
        skip_recently_scraped: raw
            .skip_recently_scraped
            .unwrap_or(defaults.skip_recently_scraped),
        recency_days: raw
            .skip_recently_scraped_days
            .unwrap_or(defaults.recency_days),
        score_profiles: raw.score_profiles.unwrap_or(defaults.score_profiles),
        min_score_threshold: match raw.min_score_threshold {
            Some(threshold) => normalize_threshold(threshold)?,
            None => defaults.min_score_threshold,
        },
    };

    validate_campaign(&config)?;
    Ok(config)
}

/// Trim entries, strip the `prefix` marker, and reject blanks and duplicates.
/// Trim entries, strip one optional sigil run, and reject blanks and
/// case-insensitive duplicates.
fn clean_list(
    field: &str,
    values: &[String],
    prefix: Option<char>,
) -> Result<Vec<String>, ConfigError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(values.len());

    for value in values {
        let trimmed = value.trim();
        let cleaned = match prefix {
            Some(prefix) => trimmed.trim_start_matches(prefix).trim(),
            None => trimmed,
        };
        if cleaned.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field} entries must be non-empty"
            )));
        }
        if !seen.insert(cleaned.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate entry in {field}: '{cleaned}'"
            )));
        }
        out.push(cleaned.to_string());
    }

    Ok(out)
}

/// Accept either a 0-100 score or a 0-1 fraction of it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_threshold(raw: RawThreshold) -> Result<u8, ConfigError> {
    let out_of_range = || {
        ConfigError::Validation("min_score_threshold must be within 0-100 or 0-1".to_string())
    };
    match raw {
        RawThreshold::Whole(value) => u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(out_of_range),
        RawThreshold::Fraction(value) if value.is_finite() && value >= 0.0 => {
            let scaled = if value <= 1.0 { value * 100.0 } else { value };
            if scaled > 100.0 {
                return Err(out_of_range());
            }
            Ok(scaled.round() as u8)
        }
        RawThreshold::Fraction(_) => Err(out_of_range()),
    }
}

fn validate_campaign(config: &CampaignConfig) -> Result<(), ConfigError> {
    if config.targets.is_empty() && config.hashtags.is_empty() && config.post_urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one target, hashtag or post URL is required".to_string(),
        ));
    }

    let minimums = [
        ("max_posts_per_source", config.max_posts_per_source),
        ("max_likers_per_post", config.max_likers_per_post),
        ("max_comments_per_post", config.max_comments_per_post),
        ("max_profiles_to_enrich", config.max_profiles_to_enrich),
        ("max_profiles", config.max_profiles),
        ("session_duration_minutes", config.session_duration_minutes),
    ];
    for (field, value) in minimums {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{field} must be at least 1"
            )));
        }
    }

    for url in &config.post_urls {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "post URL '{url}' must be an http(s) URL"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
