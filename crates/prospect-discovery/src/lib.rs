//! Resumable prospect discovery engine.
//!
//! [`Discovery::run`] drives every configured source through the progress
//! state machine, records likers and commenters, then enriches and scores
//! the resulting profiles. All durable state goes through
//! [`prospect_core::ProspectStore`]; all UI access goes through
//! [`prospect_scraper::Session`].

pub mod budget;
pub mod context;
pub mod enrichment;
pub mod error;
pub mod events;
pub mod ledger;
pub mod orchestrator;
pub mod progress;
pub mod recency;
pub mod source;

pub use budget::{RunBudget, StopReason};
pub use error::{DiscoveryError, ProgressError};
pub use events::{CollectingSink, DiscoveryEvent, EventSink, RunCounts, TracingSink};
pub use ledger::{Admission, ProfileLedger};
pub use orchestrator::{Discovery, RunResult};
pub use progress::ProgressTracker;
pub use recency::RecencyCache;
pub use source::SourceOutcome;
