//! Tunable constants of the 12-week program.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest program `validate` accepts, ten years.
const MAX_CHALLENGE_DAYS: u32 = 3650;

/// Named constants that shape the progression and the freeze rule.
///
/// Defaults describe the standard challenge: 5 minutes on day one, +5 per
/// week up to 60, 84 days long, a 14-day freeze after three bad days in a
/// row, and success at 80% completed days.
///
/// A stored freeze keeps only its end date, so its onset is derived from
/// `freeze_days`. Changing `freeze_days` while a freeze is recorded would
/// move that onset; see `ChallengeService::check_rules_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRules {
    #[serde(default = "default_initial_minutes")]
    pub initial_minutes: u32,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
    /// Minutes added per week of growth
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
    #[serde(default = "default_challenge_days")]
    pub challenge_days: u32,
    #[serde(default = "default_week_days")]
    pub week_days: u32,
    #[serde(default = "default_freeze_days")]
    pub freeze_days: u32,
    /// Newest bad log must be at most this many days old to start a freeze
    #[serde(default = "default_recency_days")]
    pub recency_days: u32,
    /// Consecutive bad-rated days needed to start a freeze
    #[serde(default = "default_bad_streak")]
    pub bad_streak: u32,
    #[serde(default = "default_success_percent")]
    pub success_percent: u32,
}

fn default_initial_minutes() -> u32 {
    5
}
fn default_max_minutes() -> u32 {
    60
}
fn default_step_minutes() -> u32 {
    5
}
fn default_challenge_days() -> u32 {
    84
}
fn default_week_days() -> u32 {
    7
}
fn default_freeze_days() -> u32 {
    14
}
fn default_recency_days() -> u32 {
    7
}
fn default_bad_streak() -> u32 {
    3
}
fn default_success_percent() -> u32 {
    80
}

impl Default for ChallengeRules {
    fn default() -> Self {
        Self {
            initial_minutes: default_initial_minutes(),
            max_minutes: default_max_minutes(),
            step_minutes: default_step_minutes(),
            challenge_days: default_challenge_days(),
            week_days: default_week_days(),
            freeze_days: default_freeze_days(),
            recency_days: default_recency_days(),
            bad_streak: default_bad_streak(),
            success_percent: default_success_percent(),
        }
    }
}

impl ChallengeRules {
    /// Number of weeks in the program (12 by default).
    pub fn total_weeks(&self) -> u32 {
        (self.challenge_days / self.week_days.max(1)).max(1)
    }

    /// Target minutes for a 1-based week, capped at `max_minutes`.
    pub fn target_for_week(&self, week: u32) -> u32 {
        let grown = self
            .initial_minutes
            .saturating_add(self.step_minutes.saturating_mul(week.saturating_sub(1)));
        grown.min(self.max_minutes)
    }

    /// Completed days required to count the challenge as a success.
    ///
    /// `ceil(challenge_days * success_percent / 100)`, i.e. 68 of 84.
    pub fn success_threshold(&self) -> u32 {
        let needed = (u64::from(self.challenge_days) * u64::from(self.success_percent)).div_ceil(100);
        u32::try_from(needed).unwrap_or(u32::MAX)
    }

    /// Check that the rules describe a usable program.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("rules.{key}"),
            message: message.to_string(),
        };

        if self.initial_minutes == 0 {
            return Err(invalid("initial_minutes", "must be greater than zero"));
        }
        if self.max_minutes < self.initial_minutes {
            return Err(invalid("max_minutes", "must be at least initial_minutes"));
        }
        if self.step_minutes == 0 {
            return Err(invalid("step_minutes", "must be greater than zero"));
        }
        if self.week_days == 0 {
            return Err(invalid("week_days", "must be greater than zero"));
        }
        if self.challenge_days > MAX_CHALLENGE_DAYS {
            return Err(invalid(
                "challenge_days",
                &format!("must be at most {MAX_CHALLENGE_DAYS}"),
            ));
        }
        if self.challenge_days == 0 || self.challenge_days % self.week_days != 0 {
            return Err(invalid(
                "challenge_days",
                "must be a positive multiple of week_days",
            ));
        }
        if self.bad_streak < 2 {
            return Err(invalid("bad_streak", "must be at least 2"));
        }
        if !(1..=100).contains(&self.success_percent) {
            return Err(invalid("success_percent", "must be between 1 and 100"));
        }
        Ok(())
    }
}
