pub mod counts;
pub mod device;
pub mod error;
pub mod http;
pub mod list;
pub mod navigation;
pub mod navigator;
pub mod post;
pub mod profile;
pub(crate) mod retry;
pub mod rows;
pub mod selectors;
pub mod session;
pub mod termination;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use counts::parse_count;
pub use device::{Bounds, ClickTarget, Device, ScreenInfo, ScrollDirection, UiElement};
pub use error::{Lookup, ScraperError};
pub use http::HttpDevice;
pub use list::{open_user_list, ListEnd, ListHarvest, ListScraper, RowParser, UserListKind};
pub use navigation::{open_source, Route};
pub use navigator::{CurrentPost, FeedMode, NavStop, NextPost, PostNavigator};
pub use post::PostSignature;
pub use profile::read_profile;
pub use rows::{CommentRowParser, ParsedComment, UserRowParser};
pub use selectors::{SelectorChain, Selectors};
pub use session::{Pacing, Session};
pub use termination::{EndReason, ScrollEndDetector};

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_tests;
