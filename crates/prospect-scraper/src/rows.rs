//! Row parsers plugged into the generic list scraper.

use std::sync::LazyLock;

use regex::Regex;

use crate::counts::parse_count;
use crate::device::UiElement;
use crate::list::RowParser;
use crate::selectors::{SelectorChain, Selectors};

const MAX_USERNAME_LEN: usize = 30;

/// Rows indented further than this from the left edge are replies.
pub const REPLY_INDENT_PX: i32 = 80;

/// UI labels that share the username slot of a row.
const NON_USERNAME_LABELS: &[&str] = &[
    "reply",
    "see translation",
    "for you",
    "view",
    "likes",
    "like",
    "hide replies",
    "follow",
    "following",
];

static COMMENT_LIKES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\b(\d[\d.,]*\s*[km]?)\s+likes?\b").expect("valid comment likes regex")
});

/// Whether `candidate` can be an account handle rather than UI chrome.
#[must_use]
pub fn is_plausible_username(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.chars().count() > MAX_USERNAME_LEN {
        return false;
    }
    if candidate.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if !candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return false;
    }
    let lower = candidate.to_ascii_lowercase();
    !NON_USERNAME_LABELS.contains(&lower.as_str())
}

fn username_of(element: &UiElement) -> Option<String> {
    let raw = element.label().trim();
    let name = raw.strip_prefix('@').unwrap_or(raw);
    is_plausible_username(name).then(|| name.to_string())
}

// ---------------------------------------------------------------------------
// People lists (likers, followers, following)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct UserRowParser;

impl RowParser for UserRowParser {
    type Row = String;

    fn row_selector<'a>(&self, selectors: &'a Selectors) -> &'a SelectorChain {
        &selectors.user_row
    }

    fn parse(&mut self, element: &UiElement) -> Option<String> {
        username_of(element)
    }

    fn key(&self, row: &String) -> String {
        row.clone()
    }
}

// ---------------------------------------------------------------------------
// Comment threads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComment {
    pub username: String,
    pub text: String,
    pub like_count: u32,
    pub is_reply: bool,
    pub parent_username: Option<String>,
}

/// Reads comment rows: the row text is the author, the accessibility
/// description carries `author body [N likes] [Reply]`.
///
/// Keeps the last top-level author so replies can be linked to it.
#[derive(Debug, Default)]
pub struct CommentRowParser {
    last_top_level: Option<String>,
}

impl RowParser for CommentRowParser {
    type Row = ParsedComment;

    fn row_selector<'a>(&self, selectors: &'a Selectors) -> &'a SelectorChain {
        &selectors.comment_row
    }

    fn parse(&mut self, element: &UiElement) -> Option<ParsedComment> {
        let username = username_of(element)?;
        let description = element.attr("content-desc").unwrap_or("").trim();
        let body = description
            .strip_prefix(username.as_str())
            .unwrap_or(description)
            .trim();
        let (text, like_count) = split_like_count(body);

        let is_reply = element.bounds.left > REPLY_INDENT_PX;
        let parent_username = if is_reply {
            self.last_top_level.clone()
        } else {
            self.last_top_level = Some(username.clone());
            None
        };

        Some(ParsedComment {
            username,
            text,
            like_count,
            is_reply,
            parent_username,
        })
    }

    /// One comment per author per thread.
    fn key(&self, row: &ParsedComment) -> String {
        row.username.clone()
    }

    fn expands_replies(&self) -> bool {
        true
    }
}

fn split_like_count(body: &str) -> (String, u32) {
    let body = body.strip_suffix("Reply").unwrap_or(body).trim_end();
    let Some(captures) = COMMENT_LIKES_RE.captures(body) else {
        return (body.to_string(), 0);
    };
    let likes = captures
        .get(1)
        .and_then(|m| parse_count(m.as_str()))
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX));
    let text = COMMENT_LIKES_RE.replace(body, "").trim().to_string();
    (text, likes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Bounds;

    fn row(text: &str, description: &str, left: i32) -> UiElement {
        let mut element = UiElement {
            text: text.to_string(),
            bounds: Bounds {
                left,
                top: 0,
                right: 1080,
                bottom: 120,
            },
            ..UiElement::default()
        };
        element
            .attributes
            .insert("content-desc".to_string(), description.to_string());
        element
    }

    #[test]
    fn username_hygiene() {
        assert!(is_plausible_username("jane.doe_42"));
        assert!(!is_plausible_username("Reply"));
        assert!(!is_plausible_username("See translation"));
        assert!(!is_plausible_username("likes"));
        assert!(!is_plausible_username("123456"));
        assert!(!is_plausible_username("has space"));
        assert!(!is_plausible_username(&"a".repeat(31)));
        assert!(!is_plausible_username(""));
    }

    #[test]
    fn user_rows_strip_at_sign_and_skip_labels() {
        let mut parser = UserRowParser;
        assert_eq!(parser.parse(&row("@jane", "", 40)), Some("jane".to_string()));
        assert_eq!(parser.parse(&row("View", "", 40)), None);
    }

    #[test]
    fn comment_body_and_likes_come_from_description() {
        let mut parser = CommentRowParser::default();
        let parsed = parser
            .parse(&row("jane", "jane Love this shop! 12 likes Reply", 40))
            .unwrap();
        assert_eq!(parsed.username, "jane");
        assert_eq!(parsed.text, "Love this shop!");
        assert_eq!(parsed.like_count, 12);
        assert!(!parsed.is_reply);
        assert_eq!(parsed.parent_username, None);
    }

    #[test]
    fn comment_without_likes() {
        let mut parser = CommentRowParser::default();
        let parsed = parser.parse(&row("bob", "bob first!", 40)).unwrap();
        assert_eq!(parsed.text, "first!");
        assert_eq!(parsed.like_count, 0);
    }

    #[test]
    fn indented_rows_are_replies_to_last_top_level() {
        let mut parser = CommentRowParser::default();
        parser.parse(&row("jane", "jane question?", 40)).unwrap();
        let reply = parser.parse(&row("shop", "shop answer 1 like", 160)).unwrap();
        assert!(reply.is_reply);
        assert_eq!(reply.parent_username.as_deref(), Some("jane"));
        assert_eq!(reply.like_count, 1);

        parser.parse(&row("max", "max next", 40)).unwrap();
        let second = parser.parse(&row("jane", "jane thanks", 160)).unwrap();
        assert_eq!(second.parent_username.as_deref(), Some("max"));
    }
}
