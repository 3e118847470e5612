//! Deterministic five-component prospect score.
//!
//! Each component is computed on its own 0-100 scale and capped before
//! weighting. The weighted total is truncated to an integer, so identical
//! input always yields identical output.

use prospect_core::{DiscoveredProfile, ProfileAttributes, ProfileScore, ScoreBreakdown};

use crate::ScoringConfig;

/// Component weights in percent; they sum to 100.
pub const WEIGHT_BUSINESS_SIGNAL: u32 = 25;
pub const WEIGHT_ENGAGEMENT: u32 = 20;
pub const WEIGHT_COMPLETENESS: u32 = 15;
pub const WEIGHT_NICHE_RELEVANCE: u32 = 25;
pub const WEIGHT_FOLLOWER_RATIO: u32 = 15;

const COMPONENT_CAP: u32 = 100;

/// Bio substrings that suggest the account sells or takes business.
pub(crate) const BUSINESS_KEYWORDS: &[&str] = &[
    "dm", "collab", "business", "brand", "shop", "store", "link", "email", "booking", "order",
    "service", "agency", "founder", "ceo",
];

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// External link 40, each business keyword in the bio 10, business account 20.
#[must_use]
pub fn business_signal(attributes: &ProfileAttributes) -> u8 {
    let mut score = 0u32;
    if attributes.external_link.is_some() {
        score += 40;
    }
    let bio = attributes.bio_text().to_lowercase();
    score += 10 * count_u32(BUSINESS_KEYWORDS.iter().filter(|kw| bio.contains(*kw)).count());
    if attributes.is_business {
        score += 20;
    }
    cap(score)
}

/// Commenting is high intent (50); likes add 5 each up to 30; each distinct
/// source adds 10 up to 20.
#[must_use]
pub fn engagement(profile: &DiscoveredProfile) -> u8 {
    let mut score = 0u32;
    if profile.has_commented() {
        score += 50;
    }
    score += (5 * count_u32(profile.like_count())).min(30);
    score += (10 * count_u32(profile.sources.len())).min(20);
    cap(score)
}

#[must_use]
pub fn completeness(attributes: &ProfileAttributes) -> u8 {
    let mut score = 0u32;
    if attributes.bio_text().chars().count() > 20 {
        score += 30;
    }
    if attributes.posts.unwrap_or(0) > 10 {
        score += 30;
    }
    if attributes.followers.unwrap_or(0) > 100 {
        score += 20;
    }
    if !attributes.is_private {
        score += 20;
    }
    cap(score)
}

/// Each niche keyword found in the bio is worth 25; each keyword hit in a
/// comment the person left is worth 10.
#[must_use]
pub fn niche_relevance(profile: &DiscoveredProfile, niche_keywords: &[String]) -> u8 {
    if niche_keywords.is_empty() {
        return 0;
    }
    let keywords: Vec<String> = niche_keywords.iter().map(|k| k.to_lowercase()).collect();

    let bio = profile
        .attributes
        .as_ref()
        .map(|a| a.bio_text().to_lowercase())
        .unwrap_or_default();
    let mut score = 0u32;
    if !bio.is_empty() {
        score += 25 * count_u32(keywords.iter().filter(|k| bio.contains(k.as_str())).count());
    }
    for comment in profile.comment_texts() {
        let comment = comment.to_lowercase();
        score += 10 * count_u32(keywords.iter().filter(|k| comment.contains(k.as_str())).count());
    }
    cap(score)
}

/// Followers-to-following banded: >2 is 100, >1 is 75, >0.5 is 50, else 25.
/// Without a following count the ratio is unknown and scores 50.
#[must_use]
pub fn follower_ratio(attributes: &ProfileAttributes) -> u8 {
    let following = attributes.following.unwrap_or(0);
    if following == 0 {
        return 50;
    }
    let followers = attributes.followers.unwrap_or(0);
    // Integer comparisons avoid float rounding at the band edges.
    if followers > following.saturating_mul(2) {
        100
    } else if followers > following {
        75
    } else if followers.saturating_mul(2) > following {
        50
    } else {
        25
    }
}

// ---------------------------------------------------------------------------
// Total
// ---------------------------------------------------------------------------

/// Score a profile. Profiles that were never enriched are scored against
/// empty attributes.
#[must_use]
pub fn score_profile(profile: &DiscoveredProfile, config: &ScoringConfig) -> ProfileScore {
    let empty = ProfileAttributes::default();
    let attributes = profile.attributes.as_ref().unwrap_or(&empty);

    let breakdown = ScoreBreakdown {
        business_signal: business_signal(attributes),
        engagement: engagement(profile),
        completeness: completeness(attributes),
        niche_relevance: niche_relevance(profile, &config.niche_keywords),
        follower_ratio: follower_ratio(attributes),
    };
    ProfileScore {
        score: weighted_total(&breakdown),
        breakdown,
    }
}

/// Σ component × weight, truncated.
#[must_use]
pub fn weighted_total(breakdown: &ScoreBreakdown) -> u8 {
    let sum = u32::from(breakdown.business_signal) * WEIGHT_BUSINESS_SIGNAL
        + u32::from(breakdown.engagement) * WEIGHT_ENGAGEMENT
        + u32::from(breakdown.completeness) * WEIGHT_COMPLETENESS
        + u32::from(breakdown.niche_relevance) * WEIGHT_NICHE_RELEVANCE
        + u32::from(breakdown.follower_ratio) * WEIGHT_FOLLOWER_RATIO;
    cap(sum / 100)
}

fn cap(score: u32) -> u8 {
    u8::try_from(score.min(COMPONENT_CAP)).unwrap_or(u8::MAX)
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "score_test.rs"]
mod tests;
