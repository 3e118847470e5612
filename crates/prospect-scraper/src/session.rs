//! The shared automation context handed to every scraping component.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use prospect_core::AppConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::device::{ClickTarget, Device, ScrollDirection, UiElement};
use crate::error::{Lookup, ScraperError};
use crate::selectors::{SelectorChain, Selectors};

/// Timing knobs for settling after gestures and polling for elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Base pause after every gesture before the next read.
    pub settle: Duration,
    /// Upper bound of random extra pause added to `settle`.
    pub jitter: Duration,
    /// Bounded wait for an element that should appear after navigation.
    pub wait_timeout: Duration,
}

impl Pacing {
    /// No pauses at all; for scripted devices.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            settle: Duration::ZERO,
            jitter: Duration::ZERO,
            wait_timeout: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.settle_ms),
            jitter: Duration::from_millis(config.settle_ms / 3),
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
        }
    }
}

/// One device, one selector set, one random source.
///
/// Every call is sequential: the next gesture is only issued after the
/// previous one returned and the screen had time to settle.
pub struct Session {
    device: Box<dyn Device>,
    selectors: Selectors,
    pacing: Pacing,
    rng: Mutex<StdRng>,
}

impl Session {
    /// Builds a session. A fixed `seed` makes settle jitter reproducible.
    #[must_use]
    pub fn new(
        device: Box<dyn Device>,
        selectors: Selectors,
        pacing: Pacing,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            device,
            selectors,
            pacing,
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn device(&self) -> &dyn Device {
        self.device.as_ref()
    }

    #[must_use]
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Pause for the settle time plus random jitter.
    pub async fn settle(&self) {
        let delay = self.pacing.settle + self.jitter();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.pacing.jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::from_millis(rng.random_range(0..=max_ms))
    }

    /// First element matched by the first selector of `chain` that matches
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried.
    pub async fn find_first(&self, chain: &SelectorChain) -> Result<Lookup<UiElement>, ScraperError> {
        Ok(self.query_chain(chain).await?.into_iter().next().into())
    }

    /// All elements from the first selector of `chain` that matches anything.
    /// Empty when no selector matched.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried.
    pub async fn query_chain(&self, chain: &SelectorChain) -> Result<Vec<UiElement>, ScraperError> {
        for selector in chain.iter() {
            let elements = self.device.query_visible(selector).await?;
            if !elements.is_empty() {
                return Ok(elements);
            }
        }
        Ok(Vec::new())
    }

    /// Bounded wait for any selector of `chain`.
    ///
    /// Only the primary selector is polled for the full timeout; fallbacks
    /// are probed once afterwards. A timeout is `false`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried.
    pub async fn wait_chain(&self, chain: &SelectorChain) -> Result<bool, ScraperError> {
        let Some(primary) = chain.primary() else {
            return Ok(false);
        };
        if self.device.wait_for(primary, self.pacing.wait_timeout).await? {
            return Ok(true);
        }
        for selector in chain.iter().skip(1) {
            if !self.device.query_visible(selector).await?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Click the first match of `chain`; `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the device cannot be queried or clicked.
    pub async fn click_first(&self, chain: &SelectorChain) -> Result<bool, ScraperError> {
        match self.find_first(chain).await? {
            Lookup::Found(element) => {
                self.click(element).await?;
                Ok(true)
            }
            Lookup::NotFound => Ok(false),
        }
    }

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the gesture cannot be sent.
    pub async fn click(&self, element: UiElement) -> Result<(), ScraperError> {
        self.device.click(&ClickTarget::from(element)).await?;
        self.settle().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the gesture cannot be sent.
    pub async fn scroll(&self, direction: ScrollDirection) -> Result<(), ScraperError> {
        self.device.scroll(direction).await?;
        self.settle().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the key event cannot be sent.
    pub async fn back(&self) -> Result<(), ScraperError> {
        self.device.press_back().await?;
        self.settle().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the input cannot be sent.
    pub async fn type_text(&self, text: &str) -> Result<(), ScraperError> {
        self.device.type_text(text).await?;
        self.settle().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ScraperError`] if the intent cannot be sent.
    pub async fn open_uri(&self, uri: &str) -> Result<(), ScraperError> {
        self.device.open_uri(uri).await?;
        self.settle().await;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}
