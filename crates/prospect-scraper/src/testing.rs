//! An in-process [`Device`] that simulates the app's screens.
//!
//! It understands the default [`Selectors`] by role: a query answers with
//! the elements that role would match on the current screen. Elements carry
//! a `node` attribute that clicks resolve against. Lists page through a
//! fixed window and the last page repeats, like the real app at the bottom
//! of a list.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use prospect_core::{CommentSort, ProfileAttributes};

use crate::device::{Bounds, ClickTarget, Device, ScreenInfo, ScrollDirection, UiElement};
use crate::error::ScraperError;
use crate::selectors::Selectors;
use crate::session::{Pacing, Session};

const DEFAULT_PAGE_SIZE: usize = 5;
const TOP_LEVEL_LEFT: i32 = 40;
const REPLY_LEFT: i32 = 140;

// ---------------------------------------------------------------------------
// Scenario building blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedComment {
    pub username: String,
    pub text: String,
    pub likes: u32,
    pub reply_to: Option<String>,
}

impl ScriptedComment {
    #[must_use]
    pub fn new(username: &str, text: &str) -> Self {
        Self {
            username: username.to_string(),
            text: text.to_string(),
            likes: 0,
            reply_to: None,
        }
    }

    #[must_use]
    pub fn likes(mut self, likes: u32) -> Self {
        self.likes = likes;
        self
    }

    #[must_use]
    pub fn reply_to(mut self, parent: &str) -> Self {
        self.reply_to = Some(parent.to_string());
        self
    }

    fn description(&self) -> String {
        let likes = match self.likes {
            0 => String::new(),
            1 => " 1 like".to_string(),
            n => format!(" {n} likes"),
        };
        format!("{} {}{likes} Reply", self.username, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedPost {
    pub likes: u64,
    /// Shown comment counter; defaults to the number of scripted comments.
    pub comment_total: Option<u64>,
    pub is_video: bool,
    pub likes_hidden: bool,
    pub likers: Vec<String>,
    pub comments: Vec<ScriptedComment>,
}

impl ScriptedPost {
    #[must_use]
    pub fn new(likes: u64) -> Self {
        Self {
            likes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn likers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.likers = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn comments(mut self, comments: Vec<ScriptedComment>) -> Self {
        self.comments = comments;
        self
    }

    #[must_use]
    pub fn video(mut self) -> Self {
        self.is_video = true;
        self
    }

    #[must_use]
    pub fn hide_likes(mut self) -> Self {
        self.likes_hidden = true;
        self
    }

    fn shown_comment_total(&self) -> u64 {
        self.comment_total
            .unwrap_or_else(|| u64::try_from(self.comments.len()).unwrap_or(u64::MAX))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedProfile {
    pub attributes: ProfileAttributes,
    pub posts: Vec<ScriptedPost>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    /// Follow lists end with a "see all suggestions" marker.
    pub partial_follow_lists: bool,
}

impl ScriptedProfile {
    #[must_use]
    pub fn new(attributes: ProfileAttributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn posts(mut self, posts: Vec<ScriptedPost>) -> Self {
        self.posts = posts;
        self
    }

    #[must_use]
    pub fn followers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.followers = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn following<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.following = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn partial_follow_lists(mut self) -> Self {
        self.partial_follow_lists = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Simulated screens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Feed {
    Profile(String),
    Hashtag(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PostLoc {
    feed: Feed,
    index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Home,
    Profile(String),
    Hashtag(String),
    Post(PostLoc),
    Likers {
        post: PostLoc,
        offset: usize,
    },
    Comments {
        post: PostLoc,
        offset: usize,
        expanded: BTreeSet<String>,
    },
    FollowList {
        username: String,
        following: bool,
        offset: usize,
    },
    Search {
        query: String,
    },
}

#[derive(Debug)]
struct World {
    roles: HashMap<String, &'static str>,
    sort_selectors: HashMap<String, String>,
    profiles: HashMap<String, ScriptedProfile>,
    hashtags: HashMap<String, Vec<ScriptedPost>>,
    post_urls: HashMap<String, ScriptedPost>,
    deep_links: bool,
    offline: bool,
    page_size: usize,
    screen: Screen,
    stack: Vec<Screen>,
    sort_menu_open: bool,
    applied_sort: Option<String>,
    actions: Vec<String>,
}

fn element(node: &str, text: impl Into<String>) -> UiElement {
    element_at(node, text, TOP_LEVEL_LEFT)
}

fn element_at(node: &str, text: impl Into<String>, left: i32) -> UiElement {
    let mut attributes = BTreeMap::new();
    attributes.insert("node".to_string(), node.to_string());
    UiElement {
        text: text.into(),
        bounds: Bounds {
            left,
            top: 200,
            right: 1040,
            bottom: 320,
        },
        attributes,
    }
}

fn window<T>(items: &[T], offset: usize, size: usize) -> &[T] {
    let start = offset.min(items.len());
    let end = (start + size).min(items.len());
    &items[start..end]
}

impl World {
    fn new() -> Self {
        let selectors = Selectors::default();
        let mut roles = HashMap::new();
        for (role, chain) in selectors.roles() {
            for selector in chain.iter() {
                roles.insert(selector.to_string(), role);
            }
        }
        let sort_selectors = [
            CommentSort::ForYou,
            CommentSort::MostRecent,
            CommentSort::MetaVerified,
        ]
        .into_iter()
        .map(|sort| (Selectors::sort_option(sort.label()), sort.label().to_string()))
        .collect();

        Self {
            roles,
            sort_selectors,
            profiles: HashMap::new(),
            hashtags: HashMap::new(),
            post_urls: HashMap::new(),
            deep_links: true,
            offline: false,
            page_size: DEFAULT_PAGE_SIZE,
            screen: Screen::Home,
            stack: Vec::new(),
            sort_menu_open: false,
            applied_sort: None,
            actions: Vec::new(),
        }
    }

    fn post(&self, loc: &PostLoc) -> Option<&ScriptedPost> {
        match &loc.feed {
            Feed::Profile(user) => self.profiles.get(user)?.posts.get(loc.index),
            Feed::Hashtag(tag) => self.hashtags.get(tag)?.get(loc.index),
            Feed::Url(url) => self.post_urls.get(url).filter(|_| loc.index == 0),
        }
    }

    fn feed_len(&self, feed: &Feed) -> usize {
        match feed {
            Feed::Profile(user) => self.profiles.get(user).map_or(0, |p| p.posts.len()),
            Feed::Hashtag(tag) => self.hashtags.get(tag).map_or(0, Vec::len),
            Feed::Url(url) => usize::from(self.post_urls.contains_key(url)),
        }
    }

    fn navigate(&mut self, next: Screen) {
        let previous = std::mem::replace(&mut self.screen, next);
        self.stack.push(previous);
    }

    // -- queries -----------------------------------------------------------

    fn query(&self, selector: &str) -> Vec<UiElement> {
        if let Some(label) = self.sort_selectors.get(selector) {
            return if self.sort_menu_open && matches!(self.screen, Screen::Comments { .. }) {
                vec![element(&format!("sort:{label}"), label.clone())]
            } else {
                Vec::new()
            };
        }
        let Some(role) = self.roles.get(selector).copied() else {
            return Vec::new();
        };

        match &self.screen {
            Screen::Home => self.render_chrome(role),
            Screen::Profile(username) => self
                .render_profile(username, role)
                .unwrap_or_else(|| self.render_chrome(role)),
            Screen::Hashtag(tag) => self.render_hashtag(tag, role),
            Screen::Post(loc) => self.render_post(loc, role),
            Screen::Likers { post, offset } => self.render_likers(post, *offset, role),
            Screen::Comments {
                post,
                offset,
                expanded,
            } => self.render_comments(post, *offset, expanded, role),
            Screen::FollowList {
                username,
                following,
                offset,
            } => self.render_follow_list(username, *following, *offset, role),
            Screen::Search { query } => self.render_search(query, role),
        }
    }

    fn render_chrome(&self, role: &str) -> Vec<UiElement> {
        match role {
            "search_tab" => vec![element("search_tab", "")],
            _ => Vec::new(),
        }
    }

    fn render_profile(&self, username: &str, role: &str) -> Option<Vec<UiElement>> {
        let profile = self.profiles.get(username)?;
        let a = &profile.attributes;
        let text = |node: &str, value: Option<String>| value.map(|v| vec![element(node, v)]);
        let flag = |node: &str, on: bool, label: &str| on.then(|| vec![element(node, label)]);
        let count = |node: &str, value: Option<u64>| text(node, value.map(|n| n.to_string()));

        let rendered = match role {
            "profile_header" => Some(vec![element("profile_header", "")]),
            "profile_username" => Some(vec![element("profile_username", username)]),
            "profile_bio" => text("profile_bio", a.bio.clone()),
            "profile_link" => text("profile_link", a.external_link.clone()),
            "profile_followers" => count("profile_followers", a.followers),
            "profile_following" => count("profile_following", a.following),
            "profile_posts" => count("profile_posts", a.posts),
            "profile_private" => flag("profile_private", a.is_private, "This account is private"),
            "profile_verified" => flag("profile_verified", a.is_verified, "Verified"),
            "profile_category" => text("profile_category", a.category.clone()),
            "profile_business" => flag("profile_business", a.is_business, "Contact"),
            "followers_button" => Some(vec![element("followers", "followers")]),
            "following_button" => Some(vec![element("following", "following")]),
            "grid_post" if !a.is_private => Some(
                (0..profile.posts.len())
                    .map(|i| element(&format!("grid:{i}"), ""))
                    .collect(),
            ),
            "search_tab" => Some(self.render_chrome(role)),
            _ => None,
        };
        Some(rendered.unwrap_or_default())
    }

    fn render_hashtag(&self, tag: &str, role: &str) -> Vec<UiElement> {
        let Some(posts) = self.hashtags.get(tag) else {
            return self.render_chrome(role);
        };
        match role {
            "hashtag_header" => vec![element("hashtag_header", format!("{} posts", posts.len()))],
            "grid_post" => (0..posts.len())
                .map(|i| element(&format!("grid:{i}"), ""))
                .collect(),
            _ => self.render_chrome(role),
        }
    }

    fn render_post(&self, loc: &PostLoc, role: &str) -> Vec<UiElement> {
        let Some(post) = self.post(loc) else {
            return Vec::new();
        };
        match role {
            "post_view" => vec![element("post_view", "author")],
            "like_count" if !post.likes_hidden => {
                vec![element("like_count", format!("{} likes", post.likes))]
            }
            "comment_count" if post.shown_comment_total() > 0 => vec![element(
                "comment_count",
                format!("View all {} comments", post.shown_comment_total()),
            )],
            "video_indicator" if post.is_video => vec![element("video_indicator", "")],
            "comment_button" => vec![element("comment_button", "")],
            _ => self.render_chrome(role),
        }
    }

    fn render_likers(&self, loc: &PostLoc, offset: usize, role: &str) -> Vec<UiElement> {
        let Some(post) = self.post(loc) else {
            return Vec::new();
        };
        match role {
            "likers_list_indicator" => vec![element("likers_title", "Likes")],
            "user_row" => window(&post.likers, offset, self.page_size)
                .iter()
                .map(|name| element("row", name.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn render_comments(
        &self,
        loc: &PostLoc,
        offset: usize,
        expanded: &BTreeSet<String>,
        role: &str,
    ) -> Vec<UiElement> {
        let Some(post) = self.post(loc) else {
            return Vec::new();
        };
        match role {
            "comments_view_indicator" => vec![element("comments_title", "Comments")],
            "comment_sort_button" if !self.sort_menu_open => vec![element("sort_button", "")],
            "view_replies" => post
                .comments
                .iter()
                .filter(|c| c.reply_to.is_none() && !expanded.contains(&c.username))
                .filter_map(|top| {
                    let hidden = post
                        .comments
                        .iter()
                        .filter(|c| c.reply_to.as_deref() == Some(top.username.as_str()))
                        .count();
                    (hidden > 0).then(|| {
                        element(
                            &format!("replies:{}", top.username),
                            format!("View {hidden} more replies"),
                        )
                    })
                })
                .collect(),
            "comment_row" => {
                let rows = thread_rows(post, expanded);
                window(&rows, offset, self.page_size)
                    .iter()
                    .map(|c| {
                        let left = if c.reply_to.is_some() {
                            REPLY_LEFT
                        } else {
                            TOP_LEVEL_LEFT
                        };
                        let mut row = element_at("comment", c.username.clone(), left);
                        row.attributes
                            .insert("content-desc".to_string(), c.description());
                        row
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn render_follow_list(
        &self,
        username: &str,
        following: bool,
        offset: usize,
        role: &str,
    ) -> Vec<UiElement> {
        let Some(profile) = self.profiles.get(username) else {
            return Vec::new();
        };
        let list = if following {
            &profile.following
        } else {
            &profile.followers
        };
        match role {
            "user_row" => window(list, offset, self.page_size)
                .iter()
                .map(|name| element("row", name.clone()))
                .collect(),
            "end_of_list"
                if profile.partial_follow_lists && offset + self.page_size >= list.len() =>
            {
                vec![element("see_all", "See all suggestions")]
            }
            _ => Vec::new(),
        }
    }

    fn render_search(&self, query: &str, role: &str) -> Vec<UiElement> {
        match role {
            "search_input" => vec![element("search_input", query)],
            "search_result" if !query.is_empty() => {
                let hit = match query.strip_prefix('#') {
                    Some(tag) => self.hashtags.contains_key(tag),
                    None => self.profiles.contains_key(query),
                };
                if hit {
                    vec![element(&format!("search:{query}"), query)]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    // -- gestures ----------------------------------------------------------

    fn click(&mut self, node: &str) {
        let screen = self.screen.clone();
        match (node, screen) {
            ("search_tab", _) => self.navigate(Screen::Search {
                query: String::new(),
            }),
            ("like_count", Screen::Post(post)) => {
                self.navigate(Screen::Likers { post, offset: 0 });
            }
            ("comment_button" | "comment_count", Screen::Post(post)) => {
                self.sort_menu_open = false;
                self.navigate(Screen::Comments {
                    post,
                    offset: 0,
                    expanded: BTreeSet::new(),
                });
            }
            ("sort_button", Screen::Comments { .. }) => self.sort_menu_open = true,
            ("followers", Screen::Profile(username)) => self.navigate(Screen::FollowList {
                username,
                following: false,
                offset: 0,
            }),
            ("following", Screen::Profile(username)) => self.navigate(Screen::FollowList {
                username,
                following: true,
                offset: 0,
            }),
            (node, screen) => self.click_indexed(node, screen),
        }
    }

    fn click_indexed(&mut self, node: &str, screen: Screen) {
        if let Some(label) = node.strip_prefix("sort:") {
            self.applied_sort = Some(label.to_string());
            self.sort_menu_open = false;
        } else if let Some(parent) = node.strip_prefix("replies:") {
            if let Screen::Comments { expanded, .. } = &mut self.screen {
                expanded.insert(parent.to_string());
            }
        } else if let Some(name) = node.strip_prefix("search:") {
            match name.strip_prefix('#') {
                Some(tag) => self.navigate(Screen::Hashtag(tag.to_string())),
                None => self.navigate(Screen::Profile(name.to_string())),
            }
        } else if let Some(index) = node.strip_prefix("grid:").and_then(|i| i.parse().ok()) {
            let feed = match screen {
                Screen::Profile(username) => Feed::Profile(username),
                Screen::Hashtag(tag) => Feed::Hashtag(tag),
                _ => return,
            };
            self.navigate(Screen::Post(PostLoc { feed, index }));
        }
    }

    fn scroll_down(&mut self) {
        let page = self.page_size;
        let next = match &self.screen {
            Screen::Post(loc) => {
                if loc.index + 1 < self.feed_len(&loc.feed) {
                    Screen::Post(PostLoc {
                        feed: loc.feed.clone(),
                        index: loc.index + 1,
                    })
                } else {
                    return;
                }
            }
            Screen::Likers { post, offset } => {
                let len = self.post(post).map_or(0, |p| p.likers.len());
                Screen::Likers {
                    post: post.clone(),
                    offset: advance(*offset, page, len),
                }
            }
            Screen::Comments {
                post,
                offset,
                expanded,
            } => {
                let len = self
                    .post(post)
                    .map_or(0, |p| thread_rows(p, expanded).len());
                Screen::Comments {
                    post: post.clone(),
                    offset: advance(*offset, page, len),
                    expanded: expanded.clone(),
                }
            }
            Screen::FollowList {
                username,
                following,
                offset,
            } => {
                let len = self.profiles.get(username).map_or(0, |p| {
                    if *following {
                        p.following.len()
                    } else {
                        p.followers.len()
                    }
                });
                Screen::FollowList {
                    username: username.clone(),
                    following: *following,
                    offset: advance(*offset, page, len),
                }
            }
            _ => return,
        };
        self.screen = next;
    }

    fn back(&mut self) {
        if self.sort_menu_open {
            self.sort_menu_open = false;
            return;
        }
        self.screen = self.stack.pop().unwrap_or(Screen::Home);
    }

    fn open_uri(&mut self, uri: &str) {
        self.stack.clear();
        self.sort_menu_open = false;
        self.screen = if let Some(username) = uri.strip_prefix("instagram://user?username=") {
            if self.deep_links && self.profiles.contains_key(username) {
                Screen::Profile(username.to_string())
            } else {
                Screen::Home
            }
        } else if let Some(tag) = uri.strip_prefix("instagram://tag?name=") {
            if self.deep_links && self.hashtags.contains_key(tag) {
                Screen::Hashtag(tag.to_string())
            } else {
                Screen::Home
            }
        } else if self.post_urls.contains_key(uri) {
            Screen::Post(PostLoc {
                feed: Feed::Url(uri.to_string()),
                index: 0,
            })
        } else {
            Screen::Home
        };
    }
}

fn thread_rows<'a>(post: &'a ScriptedPost, expanded: &BTreeSet<String>) -> Vec<&'a ScriptedComment> {
    let mut rows = Vec::new();
    for top in post.comments.iter().filter(|c| c.reply_to.is_none()) {
        rows.push(top);
        if expanded.contains(&top.username) {
            rows.extend(
                post.comments
                    .iter()
                    .filter(|c| c.reply_to.as_deref() == Some(top.username.as_str())),
            );
        }
    }
    rows
}

fn advance(offset: usize, page: usize, len: usize) -> usize {
    (offset + page).min(len.saturating_sub(page)).max(offset)
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Scripted app surface; clones share the same world.
#[derive(Debug, Clone)]
pub struct ScriptedDevice {
    world: Arc<Mutex<World>>,
}

impl Default for ScriptedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDevice {
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: Arc::new(Mutex::new(World::new())),
        }
    }

    #[must_use]
    pub fn with_profile(self, username: &str, profile: ScriptedProfile) -> Self {
        self.world().profiles.insert(username.to_string(), profile);
        self
    }

    #[must_use]
    pub fn with_hashtag(self, tag: &str, posts: Vec<ScriptedPost>) -> Self {
        self.world().hashtags.insert(tag.to_string(), posts);
        self
    }

    #[must_use]
    pub fn with_post_url(self, url: &str, post: ScriptedPost) -> Self {
        self.world().post_urls.insert(url.to_string(), post);
        self
    }

    /// `instagram://` links stop working; only search reaches sources.
    #[must_use]
    pub fn without_deep_links(self) -> Self {
        self.world().deep_links = false;
        self
    }

    #[must_use]
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.world().page_size = page_size.max(1);
        self
    }

    /// Make every call fail as if the bridge went away.
    pub fn set_offline(&self, offline: bool) {
        self.world().offline = offline;
    }

    /// Gestures performed so far, e.g. `open:…`, `click:grid:0`, `scroll:down`.
    #[must_use]
    pub fn actions(&self) -> Vec<String> {
        self.world().actions.clone()
    }

    #[must_use]
    pub fn action_count(&self, prefix: &str) -> usize {
        self.world()
            .actions
            .iter()
            .filter(|a| a.starts_with(prefix))
            .count()
    }

    /// Label of the last comment sort option clicked.
    #[must_use]
    pub fn applied_sort(&self) -> Option<String> {
        self.world().applied_sort.clone()
    }

    /// A zero-pacing, fixed-seed session over a clone of this device.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            Box::new(self.clone()),
            Selectors::default(),
            Pacing::instant(),
            Some(7),
        )
    }

    fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn online(&self) -> Result<MutexGuard<'_, World>, ScraperError> {
        let world = self.world();
        if world.offline {
            return Err(ScraperError::Device("scripted device offline".to_string()));
        }
        Ok(world)
    }
}

#[async_trait]
impl Device for ScriptedDevice {
    async fn query_visible(&self, selector: &str) -> Result<Vec<UiElement>, ScraperError> {
        Ok(self.online()?.query(selector))
    }

    async fn click(&self, target: &ClickTarget) -> Result<(), ScraperError> {
        let mut world = self.online()?;
        match target {
            ClickTarget::Element { element } => {
                let node = element.attr("node").unwrap_or("").to_string();
                world.actions.push(format!("click:{node}"));
                world.click(&node);
            }
            ClickTarget::Point { x, y } => world.actions.push(format!("tap:{x},{y}")),
        }
        Ok(())
    }

    async fn scroll(&self, direction: ScrollDirection) -> Result<(), ScraperError> {
        let mut world = self.online()?;
        match direction {
            ScrollDirection::Down => {
                world.actions.push("scroll:down".to_string());
                world.scroll_down();
            }
            ScrollDirection::Up => world.actions.push("scroll:up".to_string()),
        }
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), ScraperError> {
        let mut world = self.online()?;
        world.actions.push(format!("type:{text}"));
        if let Screen::Search { query } = &mut world.screen {
            *query = text.to_string();
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool, ScraperError> {
        Ok(!self.online()?.query(selector).is_empty())
    }

    async fn screen_info(&self) -> Result<ScreenInfo, ScraperError> {
        let _world = self.online()?;
        Ok(ScreenInfo {
            width: 1080,
            height: 2400,
        })
    }

    async fn press_back(&self) -> Result<(), ScraperError> {
        let mut world = self.online()?;
        world.actions.push("back".to_string());
        world.back();
        Ok(())
    }

    async fn open_uri(&self, uri: &str) -> Result<(), ScraperError> {
        let mut world = self.online()?;
        world.actions.push(format!("open:{uri}"));
        world.open_uri(uri);
        Ok(())
    }
}
