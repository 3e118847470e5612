use super::*;
use crate::model::SourceType;

#[test]
fn minimal_file_gets_defaults() {
    let cfg = parse_campaign("hashtags: [smallbusiness]\n").unwrap();
    assert_eq!(cfg.name, "discovery");
    assert_eq!(cfg.hashtags, vec!["smallbusiness"]);
    assert_eq!(cfg.max_posts_per_source, 5);
    assert_eq!(cfg.max_likers_per_post, 100);
    assert_eq!(cfg.max_comments_per_post, 200);
    assert!(cfg.enrich_profiles);
    assert_eq!(cfg.max_profiles_to_enrich, 50);
    assert_eq!(cfg.comment_sort, CommentSort::MostRecent);
    assert_eq!(cfg.session_duration_minutes, 60);
    assert_eq!(cfg.max_profiles, 500);
    assert!(cfg.skip_recently_scraped);
    assert_eq!(cfg.recency_days, 7);
    assert!(cfg.score_profiles);
    assert_eq!(cfg.min_score_threshold, 60);
}

#[test]
fn markers_are_stripped() {
    let yaml = "targets: ['@acme', ' bolt ']\nhashtags: ['#growth']\n";
    let cfg = parse_campaign(yaml).unwrap();
    assert_eq!(cfg.targets, vec!["acme", "bolt"]);
    assert_eq!(cfg.hashtags, vec!["growth"]);
}

#[test]
fn aliases_resolve_to_canonical_fields() {
    let yaml = r"
target_accounts: [acme]
post_references: ['https://www.instagram.com/p/abc/']
retention_days: 14
";
    let cfg = parse_campaign(yaml).unwrap();
    assert_eq!(cfg.targets, vec!["acme"]);
    assert_eq!(cfg.post_urls, vec!["https://www.instagram.com/p/abc/"]);
    assert_eq!(cfg.recency_days, 14);
}

#[test]
fn threshold_accepts_fraction() {
    let cfg = parse_campaign("hashtags: [a]\nmin_score_threshold: 0.75\n").unwrap();
    assert_eq!(cfg.min_score_threshold, 75);
}

#[test]
fn threshold_accepts_whole_number() {
    let cfg = parse_campaign("hashtags: [a]\nmin_score_threshold: 40\n").unwrap();
    assert_eq!(cfg.min_score_threshold, 40);
}

#[test]
fn threshold_above_100_is_rejected() {
    let err = parse_campaign("hashtags: [a]\nmin_score_threshold: 140\n").unwrap_err();
    assert!(err.to_string().contains("min_score_threshold"), "{err}");
}

#[test]
fn no_sources_is_rejected() {
    let err = parse_campaign("name: empty\n").unwrap_err();
    assert!(err.to_string().contains("at least one"), "{err}");
}

#[test]
fn duplicate_hashtag_is_rejected() {
    let err = parse_campaign("hashtags: ['#Food', food]\n").unwrap_err();
    assert!(err.to_string().contains("duplicate entry in hashtags"), "{err}");
}

#[test]
fn blank_target_is_rejected() {
    let err = parse_campaign("targets: ['@']\n").unwrap_err();
    assert!(err.to_string().contains("non-empty"), "{err}");
}

#[test]
fn zero_limit_is_rejected() {
    let err = parse_campaign("hashtags: [a]\nmax_likers_per_post: 0\n").unwrap_err();
    assert!(err.to_string().contains("max_likers_per_post"), "{err}");
}

#[test]
fn unknown_field_is_a_parse_error() {
    let err = parse_campaign("hashtags: [a]\nmax_follows: 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::CampaignFileParse(_)));
}

#[test]
fn post_urls_are_trimmed_but_not_stripped() {
    let yaml = "post_urls: ['  https://www.instagram.com/p/abc/  ']\n";
    let cfg = parse_campaign(yaml).unwrap();
    assert_eq!(cfg.post_urls, vec!["https://www.instagram.com/p/abc/"]);
}

#[test]
fn duplicate_post_url_is_rejected() {
    let yaml = "post_urls: ['https://www.instagram.com/p/abc/', ' https://www.instagram.com/p/abc/']\n";
    let err = parse_campaign(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate entry in post_urls"), "{err}");
}

#[test]
fn non_url_post_reference_is_rejected() {
    let err = parse_campaign("post_urls: [abc]\n").unwrap_err();
    assert!(err.to_string().contains("http(s)"), "{err}");
}

#[test]
fn comment_sort_parses_snake_case() {
    let cfg = parse_campaign("hashtags: [a]\ncomment_sort: meta_verified\n").unwrap();
    assert_eq!(cfg.comment_sort, CommentSort::MetaVerified);
    assert_eq!(cfg.comment_sort.label(), "Meta Verified");
}

#[test]
fn sources_are_ordered_targets_hashtags_posts() {
    let yaml = r"
post_urls: ['https://www.instagram.com/p/x/']
hashtags: [food]
targets: [acme]
";
    let cfg = parse_campaign(yaml).unwrap();
    let kinds: Vec<SourceType> = cfg.sources().iter().map(|s| s.source_type).collect();
    assert_eq!(
        kinds,
        vec![SourceType::Target, SourceType::Hashtag, SourceType::PostUrl]
    );
}

#[test]
fn niche_keywords_are_lowercased() {
    let cfg = parse_campaign("hashtags: [a]\nniche_keywords: [' Fitness', Coach]\n").unwrap();
    assert_eq!(cfg.niche_keywords, vec!["fitness", "coach"]);
}

#[test]
fn session_duration_in_seconds() {
    let cfg = parse_campaign("hashtags: [a]\nsession_duration_minutes: 2\n").unwrap();
    assert_eq!(cfg.session_duration(), Duration::from_secs(120));
}

#[test]
fn load_campaign_reports_missing_file() {
    let err = load_campaign(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CampaignFileIo { .. }));
}

#[test]
fn shipped_campaign_file_is_valid() {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join("campaign.yaml");
    let cfg = load_campaign(&path).expect("failed to load campaign.yaml");

    assert_eq!(cfg.targets, vec!["bluebottle"]);
    assert_eq!(cfg.hashtags, vec!["coffeeshop", "smallbusiness"]);
    assert_eq!(cfg.min_score_threshold, 60);
    assert_eq!(cfg.comment_sort, CommentSort::MostRecent);
}
