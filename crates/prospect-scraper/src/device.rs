use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// Screen rectangle in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    #[must_use]
    pub fn center(&self) -> (i32, i32) {
        ((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }
}

/// One node returned by a visibility query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiElement {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bounds: Bounds,
    /// Raw node attributes such as `content-desc` or `resource-id`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl UiElement {
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Visible text, falling back to the accessibility description.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.text.trim().is_empty() {
            self.attr("content-desc").unwrap_or("")
        } else {
            &self.text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ClickTarget {
    Element { element: UiElement },
    Point { x: i32, y: i32 },
}

impl From<UiElement> for ClickTarget {
    fn from(element: UiElement) -> Self {
        ClickTarget::Element { element }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
}

/// The device automation surface the engine drives.
///
/// Every call is a blocking round-trip to a single shared UI. An empty query
/// result is a normal answer; implementations only return `Err` when the
/// surface itself could not be reached or rejected the request.
#[async_trait]
pub trait Device: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried.
    async fn query_visible(&self, selector: &str) -> Result<Vec<UiElement>, ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the gesture cannot be sent.
    async fn click(&self, target: &ClickTarget) -> Result<(), ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the gesture cannot be sent.
    async fn scroll(&self, direction: ScrollDirection) -> Result<(), ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the input cannot be sent.
    async fn type_text(&self, text: &str) -> Result<(), ScraperError>;

    /// Poll until `selector` matches or `timeout` elapses; `false` on timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried.
    async fn screen_info(&self) -> Result<ScreenInfo, ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the key event cannot be sent.
    async fn press_back(&self) -> Result<(), ScraperError>;

    /// Open an app deep link or URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the intent cannot be sent.
    async fn open_uri(&self, uri: &str) -> Result<(), ScraperError>;
}
