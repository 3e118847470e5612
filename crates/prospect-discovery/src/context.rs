//! Mutable state shared by every step of one run.

use prospect_core::{CampaignConfig, Interaction, ProfilePatch, ProspectStore, StoreError};
use prospect_scraper::Session;

use crate::budget::{RunBudget, StopReason};
use crate::events::{DiscoveryEvent, EventSink, RunCounts};
use crate::ledger::{Admission, ProfileLedger};
use crate::recency::RecencyCache;

pub struct RunContext<'a> {
    pub store: &'a dyn ProspectStore,
    pub session: &'a Session,
    pub config: &'a CampaignConfig,
    pub events: &'a dyn EventSink,
    pub campaign_id: i64,
    pub budget: RunBudget,
    pub ledger: ProfileLedger,
    pub recency: RecencyCache,
    pub counts: RunCounts,
}

impl std::fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("campaign_id", &self.campaign_id)
            .field("budget", &self.budget)
            .field("profiles", &self.ledger.len())
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}

impl RunContext<'_> {
    /// Checked before each source, post and list.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.budget.check(self.ledger.len())
    }

    /// Persist one observed interaction and merge it into the ledger.
    ///
    /// The profile row is upserted first, then the interaction appended;
    /// an interaction already stored for the same post is not duplicated.
    /// Unknown usernames are refused once the profile limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either write fails.
    pub async fn record(
        &mut self,
        username: &str,
        interaction: Interaction,
    ) -> Result<Admission, StoreError> {
        let admission = self.ledger.admission(username);
        if admission == Admission::Rejected {
            tracing::debug!(username, "profile limit reached, not recording");
            return Ok(admission);
        }

        let recently_seen = self.recency.contains(username);
        let patch = ProfilePatch {
            recently_seen,
            ..ProfilePatch::source(interaction.source.clone())
        };
        self.store
            .upsert_profile(self.campaign_id, username, &patch)
            .await?;
        let appended = self
            .store
            .append_interaction(self.campaign_id, username, &interaction)
            .await?;

        let source = interaction.source.clone();
        let kind = interaction.kind;
        self.ledger
            .record(username, interaction, appended, recently_seen);
        if appended {
            self.counts.interactions_recorded += 1;
        }
        if recently_seen && self.recency.mark_skipped(username) {
            self.counts.skipped_recent += 1;
        }
        self.counts.profiles_discovered = u32::try_from(self.ledger.len()).unwrap_or(u32::MAX);

        self.events.emit(&DiscoveryEvent::ProfileDiscovered {
            username: username.to_string(),
            source,
            kind,
            new_profile: admission == Admission::New,
        });
        Ok(admission)
    }
}
