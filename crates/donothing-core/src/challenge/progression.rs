//! Day/week/target derivation.
//!
//! The calculator is a pure function of the current date, the stored
//! challenge dates and the log history. It is called on every render and
//! keeps no state between calls.
//!
//! ## Phases
//!
//! ```text
//! NotStarted -> Active -> Frozen -> Active -> ... -> Completed
//! ```
//!
//! `Frozen -> Active` and `Active -> Completed` are never stored; they fall
//! out of comparing today's date with `freeze_until` and the program length.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::model::{ChallengeState, DayLog, LogStatus};
use super::rules::ChallengeRules;

/// Where the challenge stands on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengePhase {
    NotStarted,
    Active { week: u32 },
    /// Growth is held at `pinned_week` until `until` (exclusive).
    Frozen { until: NaiveDate, pinned_week: u32 },
    /// The program length has elapsed.
    Completed { succeeded: bool },
}

impl ChallengePhase {
    /// Whether moving from `self` to `next` between two consecutive
    /// evaluations is a legal transition.
    pub fn can_transition_to(&self, next: &ChallengePhase) -> bool {
        use ChallengePhase::*;
        match (self, next) {
            (a, b) if a == b => true,
            (NotStarted, Active { .. }) => true,
            (Active { week: from }, Active { week: to }) => to >= from,
            (Active { .. }, Frozen { .. }) => true,
            (Frozen { .. }, Active { .. }) => true,
            (Frozen { .. }, Frozen { .. }) => true,
            (Active { .. } | Frozen { .. }, Completed { .. }) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengePhase::NotStarted => "not_started",
            ChallengePhase::Active { .. } => "active",
            ChallengePhase::Frozen { .. } => "frozen",
            ChallengePhase::Completed { .. } => "completed",
        }
    }
}

/// Snapshot of the challenge for one day. Recomputed on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub day_index: u32,
    pub week_index: u32,
    pub target_minutes: u32,
    pub is_frozen: bool,
    /// True only when the program has ended *and* the success threshold was met.
    pub is_completed: bool,
    pub freeze_until: Option<NaiveDate>,
    pub is_started: bool,
    pub phase: ChallengePhase,
}

impl ChallengeInfo {
    fn initial(rules: &ChallengeRules, is_started: bool) -> Self {
        Self {
            day_index: 1,
            week_index: 1,
            target_minutes: rules.initial_minutes,
            is_frozen: false,
            is_completed: false,
            freeze_until: None,
            is_started,
            phase: if is_started {
                ChallengePhase::Active { week: 1 }
            } else {
                ChallengePhase::NotStarted
            },
        }
    }

    /// Whether the program length has elapsed, successful or not.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, ChallengePhase::Completed { .. })
    }

    /// Human-readable position, e.g. `Day 8/84 • Week 2/12`.
    pub fn period_label(&self, rules: &ChallengeRules) -> String {
        if !self.is_started {
            return "Challenge not started".to_string();
        }
        format!(
            "Day {}/{} • Week {}/{}",
            self.day_index,
            rules.challenge_days,
            self.week_index,
            rules.total_weeks()
        )
    }
}

/// Whole calendar days from `from` to `to` (negative if `to` is earlier).
pub(crate) fn whole_days(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Derives [`ChallengeInfo`] from dates and history.
#[derive(Debug, Clone, Default)]
pub struct ProgressionCalculator {
    rules: ChallengeRules,
}

impl ProgressionCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ChallengeRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ChallengeRules {
        &self.rules
    }

    /// Convenience wrapper taking the stored record, if any.
    pub fn compute_for_state(
        &self,
        now: NaiveDateTime,
        state: Option<&ChallengeState>,
        logs: &[DayLog],
    ) -> ChallengeInfo {
        let (start, freeze_until) = state
            .map(|s| (s.start_date, s.freeze_until))
            .unwrap_or((None, None));
        self.compute(now, start, freeze_until, logs)
    }

    /// Compute the snapshot for `now`. Total: every input yields a value.
    pub fn compute(
        &self,
        now: NaiveDateTime,
        start_date: Option<NaiveDate>,
        freeze_until: Option<NaiveDate>,
        logs: &[DayLog],
    ) -> ChallengeInfo {
        let rules = &self.rules;
        let Some(start) = start_date else {
            return ChallengeInfo::initial(rules, false);
        };

        let today = now.date();
        let day_index = whole_days(start, today) + 1;

        if day_index > i64::from(rules.challenge_days) {
            let completed_days = logs
                .iter()
                .filter(|log| log.status == LogStatus::Completed)
                .count();
            let succeeded = completed_days >= rules.success_threshold() as usize;
            return ChallengeInfo {
                day_index: rules.challenge_days,
                week_index: rules.total_weeks(),
                target_minutes: rules.max_minutes,
                is_frozen: false,
                is_completed: succeeded,
                freeze_until,
                is_started: true,
                phase: ChallengePhase::Completed { succeeded },
            };
        }

        if day_index < 1 {
            return ChallengeInfo::initial(rules, true);
        }

        // Pinned to the freeze onset while frozen, shifted by the freeze
        // length once the window has passed.
        let freeze_days = i64::from(rules.freeze_days);
        let (frozen_until, effective_day) = match freeze_until {
            Some(until) if today < until => {
                let freeze_start = until
                    .checked_sub_days(Days::new(u64::from(rules.freeze_days)))
                    .unwrap_or(until);
                (Some(until), (whole_days(start, freeze_start) + 1).max(1))
            }
            Some(_) => (None, day_index - freeze_days),
            None => (None, day_index),
        };

        let week_index = self.week_for_effective_day(effective_day);
        let phase = match frozen_until {
            Some(until) => ChallengePhase::Frozen {
                until,
                pinned_week: week_index,
            },
            None => ChallengePhase::Active { week: week_index },
        };

        ChallengeInfo {
            day_index: day_index as u32,
            week_index,
            target_minutes: rules.target_for_week(week_index),
            is_frozen: frozen_until.is_some(),
            is_completed: false,
            freeze_until,
            is_started: true,
            phase,
        }
    }

    /// `clamp(ceil(day / week_days), 1, total_weeks)`.
    fn week_for_effective_day(&self, effective_day: i64) -> u32 {
        let week_days = i64::from(self.rules.week_days.max(1));
        let day = effective_day.max(1);
        let week = (day + week_days - 1) / week_days;
        week.clamp(1, i64::from(self.rules.total_weeks())) as u32
    }

    /// Target the calculator would report on `date`, given the stored state.
    ///
    /// Used to stamp retroactive logs with the target of their own day. A
    /// freeze window whose onset is after `date` did not exist yet on that
    /// day and is ignored.
    pub fn target_on(
        &self,
        date: NaiveDate,
        state: Option<&ChallengeState>,
        logs: &[DayLog],
    ) -> u32 {
        let state = state.map(|state| {
            let mut state = *state;
            if let Some(until) = state.freeze_until {
                let onset = until
                    .checked_sub_days(Days::new(u64::from(self.rules.freeze_days)))
                    .unwrap_or(until);
                if date < onset {
                    state.freeze_until = None;
                }
            }
            state
        });
        let at = date.and_time(chrono::NaiveTime::MIN);
        self.compute_for_state(at, state.as_ref(), logs).target_minutes
    }
}
