use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::device::{ClickTarget, Device, ScreenInfo, ScrollDirection, UiElement};
use crate::error::ScraperError;
use crate::retry::{retry_with_backoff, Replay};

/// [`Device`] backed by a UI-automation bridge speaking JSON over HTTP.
///
/// Endpoints (all relative to the base URL):
/// `POST /query`, `POST /click`, `POST /scroll`, `POST /type`, `POST /wait`,
/// `POST /back`, `POST /open`, `GET /screen`.
///
/// Busy responses (503) are retried with exponential backoff up to
/// `max_retries` additional attempts. Network failures are retried only for
/// `/query`, `/wait`, `/open` and `/screen`; a gesture that timed out may
/// already have run on the device.
pub struct HttpDevice {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

#[derive(Debug, Serialize)]
struct SelectorRequest<'a> {
    selector: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    elements: Vec<UiElement>,
}

#[derive(Debug, Serialize)]
struct WaitRequest<'a> {
    selector: &'a str,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct WaitResponse {
    found: bool,
}

#[derive(Debug, Serialize)]
struct ScrollRequest {
    direction: ScrollDirection,
}

#[derive(Debug, Serialize)]
struct TypeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenRequest<'a> {
    uri: &'a str,
}

impl HttpDevice {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    async fn post<B, T>(&self, endpoint: &str, replay: Replay, body: &B) -> Result<T, ScraperError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{endpoint}", self.base_url);
        retry_with_backoff(replay, self.max_retries, self.backoff_base_secs, || {
            let request = self.client.post(&url).json(body);
            async move { decode(endpoint, request.send().await?).await }
        })
        .await
    }

    async fn post_unit<B>(
        &self,
        endpoint: &str,
        replay: Replay,
        body: &B,
    ) -> Result<(), ScraperError>
    where
        B: Serialize + Sync,
    {
        let _: serde_json::Value = self.post(endpoint, replay, body).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ScraperError> {
    let status = response.status();
    if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
        return Err(ScraperError::BridgeBusy {
            endpoint: endpoint.to_owned(),
        });
    }
    if !status.is_success() {
        return Err(ScraperError::BridgeStatus {
            status: status.as_u16(),
            endpoint: endpoint.to_owned(),
        });
    }

    let body = response.text().await?;
    let body = if body.trim().is_empty() { "null" } else { &body };
    serde_json::from_str::<T>(body).map_err(|e| ScraperError::Deserialize {
        context: format!("bridge response from {endpoint}"),
        source: e,
    })
}

#[async_trait]
impl Device for HttpDevice {
    async fn query_visible(&self, selector: &str) -> Result<Vec<UiElement>, ScraperError> {
        let response: QueryResponse = self
            .post("/query", Replay::Safe, &SelectorRequest { selector })
            .await?;
        Ok(response.elements)
    }

    async fn click(&self, target: &ClickTarget) -> Result<(), ScraperError> {
        self.post_unit("/click", Replay::Gesture, target).await
    }

    async fn scroll(&self, direction: ScrollDirection) -> Result<(), ScraperError> {
        self.post_unit("/scroll", Replay::Gesture, &ScrollRequest { direction }).await
    }

    async fn type_text(&self, text: &str) -> Result<(), ScraperError> {
        self.post_unit("/type", Replay::Gesture, &TypeRequest { text }).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, ScraperError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let response: WaitResponse = self
            .post("/wait", Replay::Safe, &WaitRequest { selector, timeout_ms })
            .await?;
        Ok(response.found)
    }

    async fn screen_info(&self) -> Result<ScreenInfo, ScraperError> {
        let url = format!("{}/screen", self.base_url);
        retry_with_backoff(Replay::Safe, self.max_retries, self.backoff_base_secs, || {
            let request = self.client.get(&url);
            async move { decode("/screen", request.send().await?).await }
        })
        .await
    }

    async fn press_back(&self) -> Result<(), ScraperError> {
        self.post_unit("/back", Replay::Gesture, &serde_json::json!({})).await
    }

    async fn open_uri(&self, uri: &str) -> Result<(), ScraperError> {
        self.post_unit("/open", Replay::Safe, &OpenRequest { uri }).await
    }
}
