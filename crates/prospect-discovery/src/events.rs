//! Progress and telemetry events emitted while a run is in flight.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use prospect_core::{InteractionKind, Phase, SourceKey};
use serde::Serialize;

/// Final counts of a run, reported whether or not a budget cut it short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    /// Distinct profiles recorded for the campaign.
    pub profiles_discovered: u32,
    /// Interactions newly appended during this run.
    pub interactions_recorded: u32,
    pub likers_scraped: u32,
    pub comments_scraped: u32,
    pub profiles_enriched: u32,
    pub profiles_scored: u32,
    pub qualified: u32,
    /// Profiles excluded from enrichment because they were seen recently.
    pub skipped_recent: u32,
    pub sources_completed: u32,
    pub sources_failed: u32,
    /// Sources abandoned because the feed kept showing the same post.
    pub sources_stuck: u32,
    /// Degraded-data conditions (partial lists, search fallback routes).
    pub degraded: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiscoveryEvent {
    ProfileDiscovered {
        username: String,
        source: SourceKey,
        kind: InteractionKind,
        /// First time this username was seen in the campaign.
        new_profile: bool,
    },
    PhaseCompleted {
        source: SourceKey,
        post_index: u32,
        phase: Phase,
        scraped: u32,
    },
    /// The feed repeated one post until navigation gave up on the source.
    SourceStuck {
        source: SourceKey,
        unique_posts: u32,
    },
    Summary {
        profiles_scraped: u32,
        comments_scraped: u32,
        qualified_count: u32,
        duration_secs: f64,
    },
}

impl DiscoveryEvent {
    #[must_use]
    pub fn summary(counts: &RunCounts, duration: Duration) -> Self {
        DiscoveryEvent::Summary {
            profiles_scraped: counts.profiles_discovered,
            comments_scraped: counts.comments_scraped,
            qualified_count: counts.qualified,
            duration_secs: duration.as_secs_f64(),
        }
    }
}

/// Receiver for [`DiscoveryEvent`]s; the reporting layer lives behind this.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &DiscoveryEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &DiscoveryEvent) {
        match event {
            DiscoveryEvent::ProfileDiscovered {
                username,
                source,
                kind,
                new_profile,
            } => tracing::debug!(
                username = %username,
                source = %source,
                kind = %kind,
                new_profile,
                "prospect discovered"
            ),
            DiscoveryEvent::PhaseCompleted {
                source,
                post_index,
                phase,
                scraped,
            } => tracing::info!(
                source = %source,
                post_index,
                phase = %phase,
                scraped,
                "phase completed"
            ),
            DiscoveryEvent::SourceStuck {
                source,
                unique_posts,
            } => tracing::warn!(
                source = %source,
                unique_posts,
                degraded = true,
                "duplicate posts detected, source halted"
            ),
            DiscoveryEvent::Summary {
                profiles_scraped,
                comments_scraped,
                qualified_count,
                duration_secs,
            } => tracing::info!(
                profiles_scraped,
                comments_scraped,
                qualified_count,
                duration_secs,
                "discovery run summary"
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<DiscoveryEvent>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DiscoveryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &DiscoveryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_event_serializes_with_tag() {
        let counts = RunCounts {
            profiles_discovered: 7,
            comments_scraped: 3,
            qualified: 2,
            ..RunCounts::default()
        };
        let event = DiscoveryEvent::summary(&counts, Duration::from_millis(1500));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "summary");
        assert_eq!(json["profiles_scraped"], 7);
        assert_eq!(json["qualified_count"], 2);
        assert_eq!(json["duration_secs"], 1.5);
    }

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        let source = SourceKey::hashtag("food");
        sink.emit(&DiscoveryEvent::PhaseCompleted {
            source: source.clone(),
            post_index: 0,
            phase: Phase::Likers,
            scraped: 4,
        });
        sink.emit(&DiscoveryEvent::summary(&RunCounts::default(), Duration::ZERO));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DiscoveryEvent::PhaseCompleted { .. }));
    }
}
