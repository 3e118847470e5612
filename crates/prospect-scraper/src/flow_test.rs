use std::collections::HashSet;

use prospect_core::{CommentSort, ProfileAttributes, SourceKey};

use crate::list::{open_user_list, ListEnd, ListScraper, UserListKind, MAX_NO_NEW_PASSES};
use crate::navigation::{open_profile, open_source, Route};
use crate::navigator::{NavStop, NextPost, PostNavigator};
use crate::rows::{CommentRowParser, ParsedComment, UserRowParser};
use crate::session::Session;
use crate::testing::{ScriptedComment, ScriptedDevice, ScriptedPost, ScriptedProfile};
use crate::{post, profile, Lookup, ScraperError};

fn names(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn never(_: &[String]) -> bool {
    false
}

async fn first_post(session: &Session, tag: &str) {
    let source = SourceKey::hashtag(tag);
    assert_eq!(
        open_source(session, &source).await.unwrap(),
        Lookup::Found(Route::DeepLink)
    );
    let mut nav = PostNavigator::new(session, source, 1);
    assert!(matches!(nav.next_post().await.unwrap(), NextPost::Post(_)));
}

// ---------------------------------------------------------------------------
// Generic list scraper
// ---------------------------------------------------------------------------

#[tokio::test]
async fn likers_list_returns_every_unique_row_and_terminates() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(12).likers(names("user", 12))]);
    let session = device.session();
    first_post(&session, "food").await;

    assert!(open_user_list(&session, UserListKind::Likers)
        .await
        .unwrap()
        .is_found());
    let mut seen = HashSet::new();
    let harvest = ListScraper::new(&session)
        .scrape(&mut UserRowParser, 100, &mut seen, &never)
        .await
        .unwrap();

    assert_eq!(harvest.rows.len(), 12);
    let unique: HashSet<&String> = harvest.rows.iter().collect();
    assert_eq!(unique.len(), 12);
    assert!(matches!(
        harvest.end,
        ListEnd::NoNewRows | ListEnd::Detector(_)
    ));
    assert!(harvest.passes <= 3 + MAX_NO_NEW_PASSES);
    assert!(!harvest.degraded);
}

#[tokio::test]
async fn list_stops_at_max_count() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(12).likers(names("user", 12))]);
    let session = device.session();
    first_post(&session, "food").await;
    assert!(post::open_likers(&session).await.unwrap().is_found());

    let mut seen = HashSet::new();
    let harvest = ListScraper::new(&session)
        .scrape(&mut UserRowParser, 3, &mut seen, &never)
        .await
        .unwrap();

    assert_eq!(harvest.rows, vec!["user0", "user1", "user2"]);
    assert_eq!(harvest.end, ListEnd::MaxCount);
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn seeded_dedup_scope_skips_known_identities() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(12).likers(names("user", 12))]);
    let session = device.session();
    first_post(&session, "food").await;
    assert!(post::open_likers(&session).await.unwrap().is_found());

    let mut seen: HashSet<String> = ["user0", "user1"].iter().map(|s| (*s).to_string()).collect();
    let harvest = ListScraper::new(&session)
        .scrape(&mut UserRowParser, 100, &mut seen, &never)
        .await
        .unwrap();

    assert_eq!(harvest.rows.len(), 10);
    assert!(!harvest.rows.iter().any(|u| u == "user0" || u == "user1"));
}

#[tokio::test]
async fn stop_predicate_is_checked_before_scrolling() {
    let device = ScriptedDevice::new()
        .with_hashtag("food", vec![ScriptedPost::new(12).likers(names("user", 12))]);
    let session = device.session();
    first_post(&session, "food").await;
    assert!(post::open_likers(&session).await.unwrap().is_found());

    let mut seen = HashSet::new();
    let harvest = ListScraper::new(&session)
        .scrape(&mut UserRowParser, 100, &mut seen, &|rows: &[String]| rows.len() >= 5)
        .await
        .unwrap();

    assert_eq!(harvest.rows.len(), 5);
    assert_eq!(harvest.end, ListEnd::Stopped);
    assert_eq!(device.action_count("scroll:down"), 0);
}

#[tokio::test]
async fn partial_follower_list_is_degraded_not_failed() {
    let device = ScriptedDevice::new().with_profile(
        "acme",
        ScriptedProfile::new(ProfileAttributes::default())
            .followers(names("fan", 7))
            .partial_follow_lists(),
    );
    let session = device.session();
    assert!(open_profile(&session, "acme").await.unwrap().is_found());
    assert!(open_user_list(&session, UserListKind::Followers)
        .await
        .unwrap()
        .is_found());

    let mut seen = HashSet::new();
    let harvest = ListScraper::new(&session)
        .scrape(&mut UserRowParser, 100, &mut seen, &never)
        .await
        .unwrap();

    assert_eq!(harvest.rows.len(), 7);
    assert_eq!(harvest.end, ListEnd::EndOfList);
    assert!(harvest.degraded);
}

#[tokio::test]
async fn comment_thread_expands_replies_and_links_parents() {
    let device = ScriptedDevice::new().with_hashtag(
        "food",
        vec![ScriptedPost::new(40).comments(vec![
            ScriptedComment::new("jane", "Where can I buy?").likes(3),
            ScriptedComment::new("shop", "Link in bio").reply_to("jane"),
            ScriptedComment::new("max", "Love it").likes(12),
        ])],
    );
    let session = device.session();
    first_post(&session, "food").await;

    assert!(post::open_comments(&session).await.unwrap().is_found());
    assert!(post::apply_comment_sort(&session, CommentSort::MostRecent)
        .await
        .unwrap());
    assert_eq!(device.applied_sort().as_deref(), Some("Most recent"));

    let mut seen = HashSet::new();
    let harvest = ListScraper::new(&session)
        .scrape(&mut CommentRowParser::default(), 100, &mut seen, &|_: &[ParsedComment]| false)
        .await
        .unwrap();

    assert_eq!(harvest.rows.len(), 3);
    let jane = &harvest.rows[0];
    assert_eq!(jane.text, "Where can I buy?");
    assert_eq!(jane.like_count, 3);
    let reply = &harvest.rows[1];
    assert!(reply.is_reply);
    assert_eq!(reply.parent_username.as_deref(), Some("jane"));
    assert_eq!(harvest.rows[2].like_count, 12);
    assert_eq!(device.action_count("click:replies:"), 1);
}

#[tokio::test]
async fn for_you_sort_needs_no_gesture() {
    let device = ScriptedDevice::new().with_hashtag(
        "food",
        vec![ScriptedPost::new(1).comments(vec![ScriptedComment::new("jane", "hi")])],
    );
    let session = device.session();
    first_post(&session, "food").await;
    assert!(post::open_comments(&session).await.unwrap().is_found());

    assert!(post::apply_comment_sort(&session, CommentSort::ForYou)
        .await
        .unwrap());
    assert_eq!(device.action_count("click:sort"), 0);
}

#[tokio::test]
async fn hidden_like_counter_is_not_found() {
    let device =
        ScriptedDevice::new().with_hashtag("food", vec![ScriptedPost::new(9).hide_likes()]);
    let session = device.session();
    first_post(&session, "food").await;

    assert_eq!(post::open_likers(&session).await.unwrap(), Lookup::NotFound);
}

// ---------------------------------------------------------------------------
// Post navigator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn grid_navigator_caps_unique_posts() {
    let posts = (1..=4).map(ScriptedPost::new).collect();
    let device = ScriptedDevice::new().with_hashtag("food", posts);
    let session = device.session();
    let source = SourceKey::hashtag("food");
    assert!(open_source(&session, &source).await.unwrap().is_found());

    let mut nav = PostNavigator::new(&session, source, 2);
    let mut refs = Vec::new();
    loop {
        match nav.next_post().await.unwrap() {
            NextPost::Post(current) => refs.push(current.post_ref),
            NextPost::Stop(stop) => {
                assert_eq!(stop, NavStop::Exhausted);
                break;
            }
        }
    }
    assert_eq!(refs, vec!["#food/post/0", "#food/post/1"]);
}

#[tokio::test]
async fn repeated_signature_stops_the_source() {
    let posts = vec![ScriptedPost::new(10); 8];
    let device = ScriptedDevice::new().with_hashtag("food", posts);
    let session = device.session();
    let source = SourceKey::hashtag("food");
    assert!(open_source(&session, &source).await.unwrap().is_found());

    let mut nav = PostNavigator::new(&session, source, 8);
    assert!(matches!(nav.next_post().await.unwrap(), NextPost::Post(_)));
    assert_eq!(
        nav.next_post().await.unwrap(),
        NextPost::Stop(NavStop::Stuck)
    );
    assert_eq!(nav.unique_posts(), 1);
    assert_eq!(device.action_count("click:grid:"), 6);
}

#[tokio::test]
async fn target_feed_is_swiped_after_first_post() {
    let posts = (1..=3).map(ScriptedPost::new).collect();
    let device = ScriptedDevice::new().with_profile(
        "acme",
        ScriptedProfile::new(ProfileAttributes::default()).posts(posts),
    );
    let session = device.session();
    let source = SourceKey::target("acme");
    assert!(open_source(&session, &source).await.unwrap().is_found());

    let mut nav = PostNavigator::new(&session, source, 3);
    let mut likes = Vec::new();
    while let NextPost::Post(current) = nav.next_post().await.unwrap() {
        likes.push(current.signature.likes);
    }
    assert_eq!(likes, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(device.action_count("click:grid:"), 1);
    assert_eq!(device.action_count("scroll:down"), 2);
}

#[tokio::test]
async fn navigator_resumes_at_recorded_position() {
    let posts = (1..=4).map(ScriptedPost::new).collect();
    let device = ScriptedDevice::new().with_hashtag("food", posts);
    let session = device.session();
    let source = SourceKey::hashtag("food");
    assert!(open_source(&session, &source).await.unwrap().is_found());

    let mut nav = PostNavigator::new(&session, source, 4);
    nav.resume_at(2).await.unwrap();
    let NextPost::Post(current) = nav.next_post().await.unwrap() else {
        panic!("expected a post at position 2");
    };
    assert_eq!(current.index, 2);
    assert_eq!(current.signature.likes, Some(3));
}

#[tokio::test]
async fn post_signature_reads_counts_and_video_flag() {
    let url = "https://www.instagram.com/reel/Cx1/";
    let device = ScriptedDevice::new().with_post_url(
        url,
        ScriptedPost::new(1500)
            .video()
            .comments(vec![ScriptedComment::new("jane", "wow")]),
    );
    let session = device.session();
    let source = SourceKey::post_url(url);
    assert!(open_source(&session, &source).await.unwrap().is_found());

    let signature = post::read_signature(&session).await.unwrap();
    assert_eq!(signature.likes, Some(1500));
    assert_eq!(signature.comments, Some(1));
    assert!(signature.is_video);

    let mut nav = PostNavigator::new(&session, source, 5);
    let NextPost::Post(current) = nav.next_post().await.unwrap() else {
        panic!("expected the linked post");
    };
    assert_eq!(current.post_ref, url);
    assert_eq!(
        nav.next_post().await.unwrap(),
        NextPost::Stop(NavStop::NoMorePosts)
    );
}

// ---------------------------------------------------------------------------
// Navigation and profiles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_fallback_is_used_when_deep_links_fail() {
    let device = ScriptedDevice::new()
        .with_profile("acme", ScriptedProfile::default())
        .with_hashtag("food", vec![ScriptedPost::new(1)])
        .without_deep_links();
    let session = device.session();

    let route = open_source(&session, &SourceKey::target("acme")).await.unwrap();
    assert_eq!(route, Lookup::Found(Route::Search));
    assert!(Route::Search.is_degraded());

    let route = open_source(&session, &SourceKey::hashtag("food")).await.unwrap();
    assert_eq!(route, Lookup::Found(Route::Search));
    assert!(device.actions().contains(&"type:#food".to_string()));
}

#[tokio::test]
async fn unknown_sources_are_not_found() {
    let device = ScriptedDevice::new();
    let session = device.session();

    let route = open_source(&session, &SourceKey::target("ghost")).await.unwrap();
    assert_eq!(route, Lookup::NotFound);
    let route = open_source(&session, &SourceKey::post_url("https://www.instagram.com/p/none/"))
        .await
        .unwrap();
    assert_eq!(route, Lookup::NotFound);
}

#[tokio::test]
async fn profile_attributes_are_read_from_header() {
    let attributes = ProfileAttributes {
        bio: Some("Founder @ acme | DM for collabs".to_string()),
        external_link: Some("acme.shop".to_string()),
        followers: Some(1200),
        following: Some(300),
        posts: Some(45),
        is_private: false,
        is_verified: true,
        is_business: true,
        category: Some("Entrepreneur".to_string()),
    };
    let device =
        ScriptedDevice::new().with_profile("acme", ScriptedProfile::new(attributes.clone()));
    let session = device.session();
    assert!(open_profile(&session, "acme").await.unwrap().is_found());

    let read = profile::read_profile(&session, "acme").await.unwrap();
    assert_eq!(read, Lookup::Found(attributes));

    let other = profile::read_profile(&session, "someone_else").await.unwrap();
    assert_eq!(other, Lookup::NotFound);
}

#[tokio::test]
async fn offline_device_is_an_error_not_a_miss() {
    let device = ScriptedDevice::new().with_profile("acme", ScriptedProfile::default());
    let session = device.session();
    device.set_offline(true);

    let err = open_source(&session, &SourceKey::target("acme"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Device(_)));
}
