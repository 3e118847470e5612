//! Deterministic prospect scoring and persona generation.
//!
//! Everything here is a pure function of the profile and the
//! [`ScoringConfig`]; there is no randomness and no I/O.

pub mod persona;
pub mod score;

use prospect_core::{CampaignConfig, DiscoveredProfile, Persona, ProfileScore};

pub use persona::generate_persona;
pub use score::score_profile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringConfig {
    pub niche_keywords: Vec<String>,
    pub min_score_threshold: u8,
}

impl ScoringConfig {
    #[must_use]
    pub fn from_campaign(config: &CampaignConfig) -> Self {
        Self {
            niche_keywords: config.niche_keywords.clone(),
            min_score_threshold: config.min_score_threshold,
        }
    }

    #[must_use]
    pub fn is_qualified(&self, score: &ProfileScore) -> bool {
        score.score >= self.min_score_threshold
    }
}

/// Score plus, for qualified profiles, a generated persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: ProfileScore,
    pub persona: Option<Persona>,
}

impl Evaluation {
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.persona.is_some()
    }
}

#[must_use]
pub fn evaluate(profile: &DiscoveredProfile, config: &ScoringConfig) -> Evaluation {
    let score = score_profile(profile, config);
    let persona = config
        .is_qualified(&score)
        .then(|| generate_persona(profile));
    Evaluation { score, persona }
}
