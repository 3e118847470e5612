//! Heuristic persona and opening messages for qualified prospects.

use prospect_core::{
    CommunicationStyle, DiscoveredProfile, MessageStyle, OpeningMessage, Persona,
};

/// Interest label and the bio substrings that signal it, in report order.
pub(crate) const INTEREST_KEYWORDS: &[(&str, &[&str])] = &[
    ("growth", &["growth", "grow", "scale", "scaling"]),
    ("marketing", &["marketing", "marketer", "ads", "advertising"]),
    ("content", &["content", "creator", "influencer", "ugc"]),
    ("ecommerce", &["shop", "store", "ecommerce", "dropship"]),
    ("coaching", &["coach", "mentor", "consulting", "consultant"]),
    ("fitness", &["fitness", "gym", "workout", "health"]),
    ("food", &["food", "chef", "restaurant", "recipe"]),
    ("travel", &["travel", "nomad", "adventure"]),
    ("tech", &["tech", "developer", "startup", "saas"]),
    ("fashion", &["fashion", "style", "clothing", "boutique"]),
];

pub(crate) const PAIN_POINTS: &[(&str, &str)] = &[
    ("growth", "Needs to scale engagement efficiently"),
    ("marketing", "Looking for better ROI on social efforts"),
    ("content", "Wants to grow audience faster"),
    ("ecommerce", "Needs more traffic and sales"),
    ("coaching", "Wants to attract more clients"),
];

const CASUAL_EMOJI: &[&str] = &["😂", "🔥", "💯", "😎"];

pub const APPROACH_ENGAGEMENT: &str = "Reference their engagement - they are active commenters";
pub const APPROACH_MULTI_SOURCE: &str =
    "Mention shared interests - seen in multiple relevant places";
pub const APPROACH_VALUE: &str = "Lead with value proposition";

#[must_use]
pub fn detect_interests(bio: &str) -> Vec<String> {
    let bio = bio.to_lowercase();
    INTEREST_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| bio.contains(kw)))
        .map(|(interest, _)| (*interest).to_string())
        .collect()
}

#[must_use]
pub fn pain_points(interests: &[String]) -> Vec<String> {
    interests
        .iter()
        .filter_map(|interest| {
            PAIN_POINTS
                .iter()
                .find(|(key, _)| key == interest)
                .map(|(_, pain)| (*pain).to_string())
        })
        .collect()
}

/// Business accounts and categorized accounts are addressed professionally;
/// otherwise casual emoji in the bio switch to a casual tone.
#[must_use]
pub fn communication_style(profile: &DiscoveredProfile) -> CommunicationStyle {
    let Some(attributes) = &profile.attributes else {
        return CommunicationStyle::Professional;
    };
    if attributes.is_business || attributes.category.is_some() {
        return CommunicationStyle::Professional;
    }
    if CASUAL_EMOJI.iter().any(|e| attributes.bio_text().contains(e)) {
        CommunicationStyle::Casual
    } else {
        CommunicationStyle::Professional
    }
}

#[must_use]
pub fn best_approach(profile: &DiscoveredProfile) -> &'static str {
    if profile.has_commented() {
        APPROACH_ENGAGEMENT
    } else if profile.sources.len() > 1 {
        APPROACH_MULTI_SOURCE
    } else {
        APPROACH_VALUE
    }
}

/// Persona for a profile that met the qualification threshold.
#[must_use]
pub fn generate_persona(profile: &DiscoveredProfile) -> Persona {
    let bio = profile
        .attributes
        .as_ref()
        .and_then(|a| a.bio.as_deref())
        .filter(|b| !b.trim().is_empty());
    let interests = bio.map(detect_interests).unwrap_or_default();

    let ice_breaker = match (interests.first(), bio) {
        (Some(interest), _) => Some(format!("I noticed you're into {interest} - me too!")),
        (None, Some(_)) => Some("Love your profile! Quick question...".to_string()),
        (None, None) => None,
    };

    Persona {
        pain_points: pain_points(&interests),
        communication_style: communication_style(profile),
        best_approach: best_approach(profile).to_string(),
        ice_breaker,
        opening_messages: opening_messages(interests.first().map(String::as_str), bio),
        interests,
    }
}

// ---------------------------------------------------------------------------
// Opening messages
// ---------------------------------------------------------------------------

#[must_use]
pub fn opening_messages(top_interest: Option<&str>, bio: Option<&str>) -> Vec<OpeningMessage> {
    let mut direct = String::from("Hey! ");
    if let Some(interest) = top_interest {
        direct.push_str(&format!("I see you're into {interest}. "));
    }
    direct.push_str("I built something that might help you grow faster. Mind if I share?");

    let founder = bio.is_some_and(|b| b.to_lowercase().contains("founder"));
    let value_first = format!(
        "Hey {}I've been helping accounts like yours grow 3x faster. \
         Would love to show you how - no strings attached.",
        if founder { "fellow founder! " } else { "there! " }
    );

    let curiosity = "Quick question - how do you currently handle engagement? \
                     I might have something that could save you hours."
        .to_string();

    vec![
        OpeningMessage {
            style: MessageStyle::Direct,
            message: direct,
        },
        OpeningMessage {
            style: MessageStyle::ValueFirst,
            message: value_first,
        },
        OpeningMessage {
            style: MessageStyle::Curiosity,
            message: curiosity,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_core::{Interaction, ProfileAttributes, SourceKey};

    fn enriched(bio: &str) -> DiscoveredProfile {
        let mut profile = DiscoveredProfile::new("jane");
        profile.record(Interaction::like(SourceKey::hashtag("food"), "#food/post/0"));
        profile.attributes = Some(ProfileAttributes {
            bio: Some(bio.to_string()),
            ..ProfileAttributes::default()
        });
        profile
    }

    #[test]
    fn interests_follow_table_order() {
        assert_eq!(
            detect_interests("Fitness coach | online store"),
            vec!["ecommerce", "coaching", "fitness"]
        );
        assert!(detect_interests("just vibes").is_empty());
    }

    #[test]
    fn only_mapped_interests_have_pain_points() {
        let interests = vec!["coaching".to_string(), "travel".to_string()];
        assert_eq!(pain_points(&interests), vec!["Wants to attract more clients"]);
    }

    #[test]
    fn emoji_bio_is_casual_unless_business() {
        let mut profile = enriched("weekend warrior 🔥");
        assert_eq!(communication_style(&profile), CommunicationStyle::Casual);

        if let Some(a) = profile.attributes.as_mut() {
            a.is_business = true;
        }
        assert_eq!(communication_style(&profile), CommunicationStyle::Professional);
    }

    #[test]
    fn commenters_get_engagement_approach() {
        let mut profile = enriched("chef");
        assert_eq!(best_approach(&profile), APPROACH_VALUE);

        profile.record(Interaction::like(SourceKey::hashtag("eats"), "#eats/post/0"));
        assert_eq!(best_approach(&profile), APPROACH_MULTI_SOURCE);

        profile.record(Interaction::comment(
            SourceKey::hashtag("eats"),
            "#eats/post/1",
            "yum",
            0,
        ));
        assert_eq!(best_approach(&profile), APPROACH_ENGAGEMENT);
    }

    #[test]
    fn persona_mentions_first_interest() {
        let persona = generate_persona(&enriched("Founder of a growth agency"));
        assert_eq!(persona.interests, vec!["growth"]);
        assert_eq!(
            persona.ice_breaker.as_deref(),
            Some("I noticed you're into growth - me too!")
        );
        assert_eq!(persona.opening_messages.len(), 3);
        assert!(persona.opening_messages[0]
            .message
            .contains("I see you're into growth."));
        assert!(persona.opening_messages[1]
            .message
            .starts_with("Hey fellow founder!"));
    }

    #[test]
    fn persona_without_bio_has_no_ice_breaker() {
        let mut profile = enriched("");
        profile.attributes = Some(ProfileAttributes::default());
        let persona = generate_persona(&profile);
        assert!(persona.interests.is_empty());
        assert_eq!(persona.ice_breaker, None);
        assert_eq!(persona.opening_messages[1].style, MessageStyle::ValueFirst);
        assert!(persona.opening_messages[1].message.starts_with("Hey there!"));
    }

    #[test]
    fn bio_without_interests_gets_generic_ice_breaker() {
        let persona = generate_persona(&enriched("living my best life"));
        assert_eq!(
            persona.ice_breaker.as_deref(),
            Some("Love your profile! Quick question...")
        );
    }
}
