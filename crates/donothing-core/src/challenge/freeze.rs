//! Detection of a run of bad-rated days.

use chrono::NaiveDateTime;

use super::model::DayLog;
use super::progression::whole_days;
use super::rules::ChallengeRules;

/// Decides whether the log history warrants a new freeze.
///
/// Only bad-rated logs are considered. The newest `bad_streak` of them
/// (three by default) must sit on consecutive calendar days; logs with
/// other ratings in between do not break or extend the run.
#[derive(Debug, Clone, Default)]
pub struct FreezeTriggerDetector {
    rules: ChallengeRules,
}

impl FreezeTriggerDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ChallengeRules) -> Self {
        Self { rules }
    }

    /// `now` does not take part in the decision; recency is judged by
    /// [`StateUpdater`](super::StateUpdater).
    pub fn should_trigger_freeze(&self, logs: &[DayLog], _now: NaiveDateTime) -> bool {
        let run = self.rules.bad_streak.max(2) as usize;

        let mut bad: Vec<&DayLog> = logs.iter().filter(|log| log.is_bad()).collect();
        if bad.len() < run {
            return false;
        }

        bad.sort_by(|a, b| b.date.cmp(&a.date));
        bad[..run]
            .windows(2)
            .all(|pair| whole_days(pair[1].date, pair[0].date) == 1)
    }

    /// Newest bad-rated log, if any.
    pub fn latest_bad<'a>(&self, logs: &'a [DayLog]) -> Option<&'a DayLog> {
        logs.iter().filter(|log| log.is_bad()).max_by_key(|log| log.date)
    }
}
