//! UI query strings for the target app, grouped into fallback chains.
//!
//! Every chain is tried in order; the first selector that yields elements
//! wins. The strings themselves are swappable data: the engine only ever
//! refers to a chain by role.

/// Ordered fallbacks for one UI role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain(Vec<String>);

impl SelectorChain {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(selectors.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The selector worth a full bounded wait; the rest are instant probes.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn chain(selectors: &[&str]) -> SelectorChain {
    SelectorChain::new(selectors.iter().copied())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    // post screen
    pub post_view: SelectorChain,
    pub like_count: SelectorChain,
    pub comment_count: SelectorChain,
    pub video_indicator: SelectorChain,

    // scrollable lists
    pub likers_list_indicator: SelectorChain,
    pub user_row: SelectorChain,
    pub load_more: SelectorChain,
    pub end_of_list: SelectorChain,
    pub followers_button: SelectorChain,
    pub following_button: SelectorChain,

    // comment sheet
    pub comment_button: SelectorChain,
    pub comments_view_indicator: SelectorChain,
    pub comment_row: SelectorChain,
    pub comment_sort_button: SelectorChain,
    pub view_replies: SelectorChain,

    // profile header
    pub profile_header: SelectorChain,
    pub profile_username: SelectorChain,
    pub profile_bio: SelectorChain,
    pub profile_link: SelectorChain,
    pub profile_followers: SelectorChain,
    pub profile_following: SelectorChain,
    pub profile_posts: SelectorChain,
    pub profile_private: SelectorChain,
    pub profile_verified: SelectorChain,
    pub profile_category: SelectorChain,
    pub profile_business: SelectorChain,

    // navigation
    pub grid_post: SelectorChain,
    pub hashtag_header: SelectorChain,
    pub search_tab: SelectorChain,
    pub search_input: SelectorChain,
    pub search_result: SelectorChain,
}

impl Selectors {
    /// Entry of the comment sort menu carrying `label`.
    #[must_use]
    pub fn sort_option(label: &str) -> String {
        format!(r#"//*[@content-desc="{label}"]"#)
    }

    /// Every chain with its role name, in declaration order.
    #[must_use]
    pub fn roles(&self) -> Vec<(&'static str, &SelectorChain)> {
        vec![
            ("post_view", &self.post_view),
            ("like_count", &self.like_count),
            ("comment_count", &self.comment_count),
            ("video_indicator", &self.video_indicator),
            ("likers_list_indicator", &self.likers_list_indicator),
            ("user_row", &self.user_row),
            ("load_more", &self.load_more),
            ("end_of_list", &self.end_of_list),
            ("followers_button", &self.followers_button),
            ("following_button", &self.following_button),
            ("comment_button", &self.comment_button),
            ("comments_view_indicator", &self.comments_view_indicator),
            ("comment_row", &self.comment_row),
            ("comment_sort_button", &self.comment_sort_button),
            ("view_replies", &self.view_replies),
            ("profile_header", &self.profile_header),
            ("profile_username", &self.profile_username),
            ("profile_bio", &self.profile_bio),
            ("profile_link", &self.profile_link),
            ("profile_followers", &self.profile_followers),
            ("profile_following", &self.profile_following),
            ("profile_posts", &self.profile_posts),
            ("profile_private", &self.profile_private),
            ("profile_verified", &self.profile_verified),
            ("profile_category", &self.profile_category),
            ("profile_business", &self.profile_business),
            ("grid_post", &self.grid_post),
            ("hashtag_header", &self.hashtag_header),
            ("search_tab", &self.search_tab),
            ("search_input", &self.search_input),
            ("search_result", &self.search_result),
        ]
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            post_view: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_feed_photo_profile_name"]"#,
                r#"//*[@resource-id="com.instagram.android:id/clips_author_username"]"#,
            ]),
            like_count: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_feed_textview_likes"]"#,
                r#"//*[@resource-id="com.instagram.android:id/like_count"]"#,
                r#"//android.widget.TextView[contains(@text, "others")]"#,
            ]),
            comment_count: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_feed_view_all_comments_text"]"#,
                r#"//android.widget.TextView[starts-with(@text, "View all")]"#,
            ]),
            video_indicator: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/clips_video_container"]"#,
                r#"//*[contains(@content-desc, "Reel by")]"#,
            ]),

            likers_list_indicator: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/action_bar_title" and @text="Likes"]"#,
                r#"//*[@text="Likes"]"#,
            ]),
            user_row: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/follow_list_username"]"#,
                r#"//*[@resource-id="com.instagram.android:id/row_user_primary_name"]"#,
            ]),
            load_more: chain(&[r#"//*[@text="See more"]"#, r#"//*[@text="Voir plus"]"#]),
            end_of_list: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/see_all_button"]"#,
                r#"//*[contains(@text, "See all suggestions")]"#,
                r#"//*[contains(@text, "caught up")]"#,
                r#"//*[contains(@text, "No more")]"#,
            ]),
            followers_button: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_profile_header_followers_container"]"#,
            ]),
            following_button: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_profile_header_following_container"]"#,
            ]),

            comment_button: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_feed_button_comment"]"#,
                r#"//*[@content-desc="Comment"]"#,
            ]),
            comments_view_indicator: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/layout_comment_thread_edittext"]"#,
                r#"//*[@text="Comments"]"#,
            ]),
            comment_row: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_comment_textview_comment"]"#,
            ]),
            comment_sort_button: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/comment_sort_button"]"#,
                r#"//*[contains(@content-desc, "Sort comments")]"#,
            ]),
            view_replies: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_comment_view_replies_text"]"#,
                r#"//*[starts-with(@text, "View") and contains(@text, "repl")]"#,
            ]),

            profile_header: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/profile_header_container"]"#,
                r#"//*[@resource-id="com.instagram.android:id/row_profile_header"]"#,
            ]),
            profile_username: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/action_bar_title"]"#,
                r#"//*[@resource-id="com.instagram.android:id/action_bar_large_title_auto_size"]"#,
            ]),
            profile_bio: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/profile_header_bio_text"]"#,
            ]),
            profile_link: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/profile_header_website"]"#,
                r#"//*[contains(@resource-id, "profile_links_view")]"#,
            ]),
            profile_followers: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_profile_header_textview_followers_count"]"#,
            ]),
            profile_following: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_profile_header_textview_following_count"]"#,
            ]),
            profile_posts: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_profile_header_textview_post_count"]"#,
            ]),
            profile_private: chain(&[
                r#"//*[contains(@text, "This account is private")]"#,
                r#"//*[contains(@text, "Ce compte est privé")]"#,
            ]),
            profile_verified: chain(&[r#"//*[@content-desc="Verified"]"#]),
            profile_category: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/profile_header_business_category"]"#,
            ]),
            profile_business: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/profile_header_actions_contact"]"#,
                r#"//android.widget.Button[@text="Contact"]"#,
                r#"//android.widget.Button[@text="Email"]"#,
            ]),

            grid_post: chain(&[r#"//*[@resource-id="com.instagram.android:id/image_button"]"#]),
            hashtag_header: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/hashtag_header_container"]"#,
                r#"//*[contains(@text, " posts") and @resource-id="com.instagram.android:id/subtitle"]"#,
            ]),
            search_tab: chain(&[
                r#"//*[@content-desc="Search and explore"]"#,
                r#"//*[@resource-id="com.instagram.android:id/search_tab"]"#,
            ]),
            search_input: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/action_bar_search_edit_text"]"#,
            ]),
            search_result: chain(&[
                r#"//*[@resource-id="com.instagram.android:id/row_search_user_username"]"#,
                r#"//*[@resource-id="com.instagram.android:id/row_hashtag_textview_tag_name"]"#,
            ]),
        }
    }
}
