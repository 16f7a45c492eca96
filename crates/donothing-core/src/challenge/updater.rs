//! Post-log freeze activation.
//!
//! Runs after every log create/edit. It is the only code path allowed to
//! write `freeze_until`, and it refuses to do so when a freeze already
//! covers today or when the bad run is too old to matter.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::freeze::FreezeTriggerDetector;
use super::model::{ChallengeState, DayLog};
use super::progression::whole_days;
use super::rules::ChallengeRules;
use crate::error::Result;
use crate::storage::ChallengeRepository;

/// Outcome of one post-log evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum FreezeDecision {
    /// No qualifying run of bad days.
    NotTriggered,
    /// A freeze already covers today; left untouched.
    AlreadyFrozen { until: NaiveDate },
    /// The run exists but its newest day is too far in the past.
    Stale { latest_bad: NaiveDate, days_ago: i64 },
    /// A new freeze was written.
    Started { until: NaiveDate },
}

impl FreezeDecision {
    pub fn started(&self) -> bool {
        matches!(self, FreezeDecision::Started { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateUpdater {
    rules: ChallengeRules,
    detector: FreezeTriggerDetector,
}

impl StateUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ChallengeRules) -> Self {
        Self {
            rules,
            detector: FreezeTriggerDetector::with_rules(rules),
        }
    }

    /// Decide what should happen, without touching `state`.
    pub fn evaluate(
        &self,
        state: &ChallengeState,
        logs: &[DayLog],
        now: NaiveDateTime,
    ) -> FreezeDecision {
        if !self.detector.should_trigger_freeze(logs, now) {
            return FreezeDecision::NotTriggered;
        }

        let today = now.date();
        if let Some(until) = state.freeze_until.filter(|_| state.is_frozen_on(today)) {
            return FreezeDecision::AlreadyFrozen { until };
        }

        if let Some(latest) = self.detector.latest_bad(logs) {
            let days_ago = whole_days(latest.date, today);
            if days_ago > i64::from(self.rules.recency_days) {
                return FreezeDecision::Stale {
                    latest_bad: latest.date,
                    days_ago,
                };
            }
        }

        let until = today
            .checked_add_days(Days::new(u64::from(self.rules.freeze_days)))
            .unwrap_or(NaiveDate::MAX);
        FreezeDecision::Started { until }
    }

    /// Evaluate and, when a freeze starts, write it into `state`.
    ///
    /// Calling this again with the same inputs returns `AlreadyFrozen` and
    /// leaves `freeze_until` unchanged.
    pub fn apply_post_log_mutation(
        &self,
        state: &mut ChallengeState,
        logs: &[DayLog],
        now: NaiveDateTime,
    ) -> FreezeDecision {
        let decision = self.evaluate(state, logs, now);
        match decision {
            FreezeDecision::Started { until } => {
                state.freeze_until = Some(until);
                tracing::info!(%until, "three bad days in a row, freezing growth");
            }
            FreezeDecision::AlreadyFrozen { until } => {
                tracing::debug!(%until, "freeze already active, not extending");
            }
            FreezeDecision::Stale {
                latest_bad,
                days_ago,
            } => {
                tracing::debug!(%latest_bad, days_ago, "bad run too old to freeze");
            }
            FreezeDecision::NotTriggered => {}
        }
        decision
    }

    /// Load state and logs from `repo`, evaluate, and persist a new freeze.
    ///
    /// Without a stored challenge record nothing happens.
    ///
    /// # Errors
    /// Propagates repository read/write failures.
    pub fn apply_with_repository<R: ChallengeRepository>(
        &self,
        repo: &mut R,
        now: NaiveDateTime,
    ) -> Result<FreezeDecision> {
        let Some(mut state) = repo.state()? else {
            return Ok(FreezeDecision::NotTriggered);
        };
        let logs = repo.logs()?;

        let decision = self.apply_post_log_mutation(&mut state, &logs, now);
        if decision.started() {
            repo.save_state(&state)?;
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::model::LogRating;
    use crate::storage::MemoryRepository;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    }

    fn now(offset: u64) -> NaiveDateTime {
        day(offset).and_hms_opt(20, 15, 0).unwrap()
    }

    fn bad(offset: u64) -> DayLog {
        DayLog::completed(day(offset), 5).with_rating(Some(LogRating::Bad))
    }

    fn bad_run(last: u64) -> Vec<DayLog> {
        vec![bad(last - 2), bad(last - 1), bad(last)]
    }

    #[test]
    fn bad_run_starts_freeze_for_fourteen_days() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState::started_on(day(0));
        let decision = updater.apply_post_log_mutation(&mut state, &bad_run(5), now(5));
        assert_eq!(decision, FreezeDecision::Started { until: day(19) });
        assert_eq!(state.freeze_until, Some(day(19)));
    }

    #[test]
    fn second_call_is_idempotent() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState::started_on(day(0));
        let logs = bad_run(5);

        updater.apply_post_log_mutation(&mut state, &logs, now(5));
        let after_first = state;
        let decision = updater.apply_post_log_mutation(&mut state, &logs, now(5));

        assert_eq!(state, after_first);
        assert_eq!(decision, FreezeDecision::AlreadyFrozen { until: day(19) });
    }

    #[test]
    fn later_call_during_freeze_does_not_extend() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState::started_on(day(0));
        let mut logs = bad_run(5);
        updater.apply_post_log_mutation(&mut state, &logs, now(5));

        logs.push(bad(6));
        let decision = updater.apply_post_log_mutation(&mut state, &logs, now(6));
        assert!(matches!(decision, FreezeDecision::AlreadyFrozen { .. }));
        assert_eq!(state.freeze_until, Some(day(19)));
    }

    #[test]
    fn stale_run_is_ignored() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState::started_on(day(0));
        let decision = updater.apply_post_log_mutation(&mut state, &bad_run(5), now(15));
        assert_eq!(
            decision,
            FreezeDecision::Stale {
                latest_bad: day(5),
                days_ago: 10
            }
        );
        assert_eq!(state.freeze_until, None);
    }

    #[test]
    fn run_exactly_at_recency_limit_still_freezes() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState::started_on(day(0));
        let decision = updater.apply_post_log_mutation(&mut state, &bad_run(5), now(12));
        assert_eq!(decision, FreezeDecision::Started { until: day(26) });
    }

    #[test]
    fn expired_freeze_can_be_replaced_by_new_one() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState {
            start_date: Some(day(0)),
            freeze_until: Some(day(20)),
        };
        let decision = updater.apply_post_log_mutation(&mut state, &bad_run(22), now(22));
        assert_eq!(decision, FreezeDecision::Started { until: day(36) });
    }

    #[test]
    fn freeze_ending_today_counts_as_expired() {
        let updater = StateUpdater::new();
        let state = ChallengeState {
            start_date: Some(day(0)),
            freeze_until: Some(day(8)),
        };
        let decision = updater.evaluate(&state, &bad_run(8), now(8));
        assert!(decision.started());
    }

    #[test]
    fn no_trigger_leaves_state_alone() {
        let updater = StateUpdater::new();
        let mut state = ChallengeState::started_on(day(0));
        let logs = vec![bad(3), bad(5), bad(6)];
        let decision = updater.apply_post_log_mutation(&mut state, &logs, now(6));
        assert_eq!(decision, FreezeDecision::NotTriggered);
        assert_eq!(state.freeze_until, None);
    }

    #[test]
    fn repository_variant_persists_freeze_once() {
        let mut repo = MemoryRepository::new();
        repo.save_state(&ChallengeState::started_on(day(0))).unwrap();
        for log in bad_run(4) {
            repo.upsert_log(&log).unwrap();
        }

        let updater = StateUpdater::new();
        let first = updater.apply_with_repository(&mut repo, now(4)).unwrap();
        let second = updater.apply_with_repository(&mut repo, now(4)).unwrap();

        assert_eq!(first, FreezeDecision::Started { until: day(18) });
        assert_eq!(second, FreezeDecision::AlreadyFrozen { until: day(18) });
        assert_eq!(repo.state().unwrap().unwrap().freeze_until, Some(day(18)));
    }

    #[test]
    fn repository_without_state_is_noop() {
        let mut repo = MemoryRepository::new();
        for log in bad_run(4) {
            repo.upsert_log(&log).unwrap();
        }
        let decision = StateUpdater::new()
            .apply_with_repository(&mut repo, now(4))
            .unwrap();
        assert_eq!(decision, FreezeDecision::NotTriggered);
        assert!(repo.state().unwrap().is_none());
    }
}
