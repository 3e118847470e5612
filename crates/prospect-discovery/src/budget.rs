//! Global run budget: wall-clock session limit and profile volume limit.
//!
//! Checked only at loop boundaries (before each source, post, scroll and
//! enrichment visit), never mid-gesture.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    SessionTime,
    MaxProfiles,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::SessionTime => write!(f, "session time budget reached"),
            StopReason::MaxProfiles => write!(f, "maximum discovered profiles reached"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunBudget {
    started: Instant,
    session: Duration,
    max_profiles: usize,
}

impl RunBudget {
    #[must_use]
    pub fn new(session: Duration, max_profiles: u32) -> Self {
        Self {
            started: Instant::now(),
            session,
            max_profiles: usize::try_from(max_profiles).unwrap_or(usize::MAX),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.session
    }

    #[must_use]
    pub fn max_profiles(&self) -> usize {
        self.max_profiles
    }

    /// Why the run must stop now, given how many profiles are known.
    #[must_use]
    pub fn check(&self, discovered: usize) -> Option<StopReason> {
        if self.expired() {
            Some(StopReason::SessionTime)
        } else if discovered >= self.max_profiles {
            Some(StopReason::MaxProfiles)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn session_budget_expires_with_time() {
        let budget = RunBudget::new(Duration::from_secs(60), 10);
        assert_eq!(budget.check(0), None);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(budget.expired());
        assert_eq!(budget.check(0), Some(StopReason::SessionTime));
    }

    #[test]
    fn profile_limit_is_inclusive() {
        let budget = RunBudget::new(Duration::from_secs(3600), 3);
        assert_eq!(budget.check(2), None);
        assert_eq!(budget.check(3), Some(StopReason::MaxProfiles));
    }
}
