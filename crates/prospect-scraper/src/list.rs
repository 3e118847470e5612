//! The one scroll-and-read loop behind every people list and comment thread.

use std::collections::HashSet;

use crate::device::{ScrollDirection, UiElement};
use crate::error::{Lookup, ScraperError};
use crate::post;
use crate::profile::{self, FollowList};
use crate::selectors::{SelectorChain, Selectors};
use crate::session::Session;
use crate::termination::{EndReason, ScrollEndDetector, DEFAULT_REPEATS_TO_END};

/// Consecutive reads without a single new row before giving up.
pub const MAX_NO_NEW_PASSES: u32 = 5;

/// What counts as a row and how to read it; the only per-list difference.
pub trait RowParser {
    type Row;

    fn row_selector<'a>(&self, selectors: &'a Selectors) -> &'a SelectorChain;

    /// `None` for elements that look like rows but carry no usable identity.
    fn parse(&mut self, element: &UiElement) -> Option<Self::Row>;

    /// Dedup key of a parsed row.
    fn key(&self, row: &Self::Row) -> String;

    /// Whether collapsed reply threads are opened before each read.
    fn expands_replies(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
    MaxCount,
    NoNewRows,
    Detector(EndReason),
    /// The app showed an explicit end marker; the list may be partial.
    EndOfList,
    /// The caller's budget predicate fired.
    Stopped,
}

impl std::fmt::Display for ListEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListEnd::MaxCount => write!(f, "max count reached"),
            ListEnd::NoNewRows => write!(f, "no new rows"),
            ListEnd::Detector(reason) => write!(f, "scroll end ({reason})"),
            ListEnd::EndOfList => write!(f, "end of accessible list"),
            ListEnd::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHarvest<R> {
    /// Rows new to the dedup scope, in reading order.
    pub rows: Vec<R>,
    pub end: ListEnd,
    /// The list was cut short by the app itself; recall is reduced.
    pub degraded: bool,
    pub passes: u32,
}

/// Which people list to open from the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserListKind {
    /// Likers of the open post.
    Likers,
    /// Followers of the open profile.
    Followers,
    /// Accounts the open profile follows.
    Following,
}

/// Open the list of `kind` from the screen that owns it.
///
/// # Errors
///
/// Returns [`ScraperError`] if the device cannot be queried or clicked.
pub async fn open_user_list(session: &Session, kind: UserListKind) -> Result<Lookup<()>, ScraperError> {
    match kind {
        UserListKind::Likers => post::open_likers(session).await,
        UserListKind::Followers => profile::open_follow_list(session, FollowList::Followers).await,
        UserListKind::Following => profile::open_follow_list(session, FollowList::Following).await,
    }
}

pub struct ListScraper<'s> {
    session: &'s Session,
    repeats_to_end: u32,
}

impl<'s> ListScraper<'s> {
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            repeats_to_end: DEFAULT_REPEATS_TO_END,
        }
    }

    #[must_use]
    pub fn with_repeats_to_end(mut self, repeats_to_end: u32) -> Self {
        self.repeats_to_end = repeats_to_end;
        self
    }

    /// Read the open list until one of the termination rules fires.
    ///
    /// A row is emitted only if its key was not yet in `seen`; emitted keys
    /// are added to `seen`, so callers can seed it with identities recorded
    /// earlier. `stop` is asked before every scroll with the rows emitted so
    /// far.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried or scrolled.
    pub async fn scrape<P: RowParser>(
        &self,
        parser: &mut P,
        max_count: usize,
        seen: &mut HashSet<String>,
        stop: &(dyn Fn(&[P::Row]) -> bool + Sync),
    ) -> Result<ListHarvest<P::Row>, ScraperError> {
        let session = self.session;
        let selectors = session.selectors();
        let mut detector = ScrollEndDetector::new(self.repeats_to_end);
        let mut rows = Vec::new();
        let mut no_new = 0u32;
        let mut passes = 0u32;
        let mut degraded = false;

        let end = loop {
            if rows.len() >= max_count {
                break ListEnd::MaxCount;
            }
            if stop(&rows) {
                break ListEnd::Stopped;
            }
            if parser.expands_replies() {
                post::expand_replies(session).await?;
            }

            passes += 1;
            let elements = session.query_chain(parser.row_selector(selectors)).await?;
            let mut page_keys = Vec::with_capacity(elements.len());
            let mut fresh = 0usize;
            for element in &elements {
                let Some(row) = parser.parse(element) else {
                    continue;
                };
                let key = parser.key(&row);
                page_keys.push(key.clone());
                if rows.len() < max_count && seen.insert(key) {
                    rows.push(row);
                    fresh += 1;
                }
            }
            detector.notify_page(&page_keys);
            tracing::debug!(pass = passes, visible = page_keys.len(), fresh, total = rows.len(), "list pass");

            if fresh == 0 {
                no_new += 1;
            } else {
                no_new = 0;
            }

            if rows.len() >= max_count {
                break ListEnd::MaxCount;
            }
            if no_new >= MAX_NO_NEW_PASSES {
                break ListEnd::NoNewRows;
            }
            if let Some(reason) = detector.is_end() {
                break ListEnd::Detector(reason);
            }
            if session.find_first(&selectors.end_of_list).await?.is_found() {
                degraded = true;
                tracing::warn!(
                    degraded = true,
                    harvested = rows.len(),
                    "end of accessible list reached, list may be partial"
                );
                break ListEnd::EndOfList;
            }
            if stop(&rows) {
                break ListEnd::Stopped;
            }

            match session.find_first(&selectors.load_more).await? {
                Lookup::Found(button) => {
                    tracing::debug!("clicking load more");
                    session.click(button).await?;
                }
                Lookup::NotFound => session.scroll(ScrollDirection::Down).await?,
            }
        };

        tracing::debug!(end = %end, rows = rows.len(), passes, pages = detector.pages(), "list finished");
        Ok(ListHarvest {
            rows,
            end,
            degraded,
            passes,
        })
    }
}
