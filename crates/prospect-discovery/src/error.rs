use prospect_core::{Phase, SourceKey, StoreError};
use prospect_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("illegal phase transition for {key}: {from} -> {to}")]
    IllegalTransition {
        key: SourceKey,
        from: Phase,
        to: Phase,
    },

    #[error("post index for {key} would move backwards: {from} -> {to}")]
    IndexRegressed { key: SourceKey, from: u32, to: u32 },

    #[error("progress write failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error("device failure: {0}")]
    Scraper(#[from] ScraperError),
}

impl DiscoveryError {
    /// Fatal errors end the run and stop the campaign; everything else only
    /// abandons the current source or profile.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Store(_) | DiscoveryError::Progress(ProgressError::Store(_))
        )
    }
}
