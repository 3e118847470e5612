//! In-memory view of the campaign's discovered profiles.
//!
//! One record per username. Re-encountering a username merges into the
//! existing record; a new username is refused once `max_profiles` records
//! exist.

use std::collections::{BTreeMap, HashSet};

use prospect_core::{DiscoveredProfile, Interaction, Persona, ProfileAttributes, ProfileScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    New,
    Merged,
    /// The ledger is full and the username is unknown.
    Rejected,
}

#[derive(Debug)]
pub struct ProfileLedger {
    profiles: BTreeMap<String, DiscoveredProfile>,
    max_profiles: usize,
}

impl ProfileLedger {
    #[must_use]
    pub fn new(max_profiles: usize) -> Self {
        Self {
            profiles: BTreeMap::new(),
            max_profiles,
        }
    }

    /// Start from profiles already stored for a resumed campaign.
    #[must_use]
    pub fn with_profiles(max_profiles: usize, profiles: Vec<DiscoveredProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|p| (p.username.clone(), p))
            .collect();
        Self {
            profiles,
            max_profiles,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.profiles.len() >= self.max_profiles
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.profiles.contains_key(username)
    }

    /// Whether admitting `usernames` would reach the profile limit.
    ///
    /// Known usernames and repeats within `usernames` count once or not at all.
    #[must_use]
    pub fn would_fill<'u>(&self, usernames: impl IntoIterator<Item = &'u str>) -> bool {
        let unknown: HashSet<&str> = usernames
            .into_iter()
            .filter(|username| !self.profiles.contains_key(*username))
            .collect();
        self.profiles.len() + unknown.len() >= self.max_profiles
    }

    #[must_use]
    pub fn get(&self, username: &str) -> Option<&DiscoveredProfile> {
        self.profiles.get(username)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &DiscoveredProfile> {
        self.profiles.values()
    }

    /// Whether a row for `username` may be recorded.
    #[must_use]
    pub fn admission(&self, username: &str) -> Admission {
        if self.contains(username) {
            Admission::Merged
        } else if self.is_full() {
            Admission::Rejected
        } else {
            Admission::New
        }
    }

    /// Merge an interaction for `username`. When `appended` is false the
    /// store already held it and only its source is unioned.
    pub fn record(
        &mut self,
        username: &str,
        interaction: Interaction,
        appended: bool,
        recently_seen: bool,
    ) -> Admission {
        let admission = self.admission(username);
        if admission == Admission::Rejected {
            return admission;
        }
        let profile = self
            .profiles
            .entry(username.to_string())
            .or_insert_with(|| DiscoveredProfile::new(username));
        profile.recently_seen |= recently_seen;
        if appended {
            profile.record(interaction);
        } else {
            profile.sources.insert(interaction.source);
        }
        admission
    }

    pub fn set_attributes(&mut self, username: &str, attributes: ProfileAttributes) {
        if let Some(profile) = self.profiles.get_mut(username) {
            profile.attributes = Some(attributes);
        }
    }

    pub fn set_score(&mut self, username: &str, score: ProfileScore, persona: Option<Persona>) {
        if let Some(profile) = self.profiles.get_mut(username) {
            profile.score = Some(score);
            if persona.is_some() {
                profile.persona = persona;
            }
        }
    }

    /// Profiles the enrichment pass should visit, best first, at most `budget`.
    ///
    /// Commenters come before likers, then higher comment like counts, then
    /// more interactions; ties break on username for a stable order.
    #[must_use]
    pub fn enrichment_candidates(&self, budget: usize) -> Vec<String> {
        let mut candidates: Vec<&DiscoveredProfile> = self
            .profiles
            .values()
            .filter(|p| !p.is_enriched() && !p.recently_seen)
            .collect();
        candidates.sort_by(|a, b| {
            b.has_commented()
                .cmp(&a.has_commented())
                .then_with(|| b.max_comment_likes().cmp(&a.max_comment_likes()))
                .then_with(|| b.interactions.len().cmp(&a.interactions.len()))
                .then_with(|| a.username.cmp(&b.username))
        });
        candidates
            .into_iter()
            .take(budget)
            .map(|p| p.username.clone())
            .collect()
    }

    /// Enriched profiles eligible for scoring.
    #[must_use]
    pub fn scoring_candidates(&self) -> Vec<&DiscoveredProfile> {
        self.profiles
            .values()
            .filter(|p| p.is_enriched() && !p.recently_seen)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_core::SourceKey;

    fn like(tag: &str, post: u32) -> Interaction {
        let source = SourceKey::hashtag(tag);
        let post_ref = source.post_ref(post);
        Interaction::like(source, post_ref)
    }

    fn comment(tag: &str, likes: u32) -> Interaction {
        let source = SourceKey::hashtag(tag);
        let post_ref = source.post_ref(0);
        Interaction::comment(source, post_ref, "nice", likes)
    }

    #[test]
    fn would_fill_counts_only_unknown_usernames() {
        let mut ledger = ProfileLedger::new(3);
        ledger.record("jane", like("food", 0), true, false);

        assert!(!ledger.would_fill(["jane", "bob", "bob"]));
        assert!(ledger.would_fill(["jane", "bob", "cara"]));
        assert!(!ledger.would_fill([]));
    }

    #[test]
    fn reencounter_merges_into_one_record() {
        let mut ledger = ProfileLedger::new(10);
        assert_eq!(ledger.record("jane", like("food", 0), true, false), Admission::New);
        assert_eq!(ledger.record("jane", like("eats", 1), true, false), Admission::Merged);

        assert_eq!(ledger.len(), 1);
        let jane = ledger.get("jane").unwrap();
        assert_eq!(jane.interactions.len(), 2);
        assert_eq!(jane.sources.len(), 2);
    }

    #[test]
    fn already_stored_interaction_only_adds_source() {
        let mut ledger = ProfileLedger::new(10);
        ledger.record("jane", like("food", 0), true, false);
        ledger.record("jane", like("food", 0), false, false);
        assert_eq!(ledger.get("jane").unwrap().interactions.len(), 1);
    }

    #[test]
    fn new_usernames_are_rejected_when_full() {
        let mut ledger = ProfileLedger::new(2);
        ledger.record("a", like("food", 0), true, false);
        ledger.record("b", like("food", 0), true, false);

        assert!(ledger.is_full());
        assert_eq!(ledger.record("c", like("food", 0), true, false), Admission::Rejected);
        assert_eq!(ledger.record("a", like("food", 1), true, false), Admission::Merged);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn enrichment_prefers_commenters_then_comment_likes() {
        let mut ledger = ProfileLedger::new(10);
        ledger.record("liker", like("food", 0), true, false);
        ledger.record("liker", like("food", 1), true, false);
        ledger.record("quiet", comment("food", 1), true, false);
        ledger.record("popular", comment("food", 30), true, false);
        ledger.record("recent", comment("food", 99), true, true);

        assert_eq!(
            ledger.enrichment_candidates(10),
            vec!["popular", "quiet", "liker"]
        );
        assert_eq!(ledger.enrichment_candidates(1), vec!["popular"]);
    }

    #[test]
    fn enriched_profiles_are_not_revisited() {
        let mut ledger = ProfileLedger::new(10);
        ledger.record("jane", like("food", 0), true, false);
        ledger.set_attributes("jane", ProfileAttributes::default());

        assert!(ledger.enrichment_candidates(10).is_empty());
        assert_eq!(ledger.scoring_candidates().len(), 1);
    }
}
