//! Application flows around the engine.
//!
//! Every flow that writes a log ends by running the [`StateUpdater`], so a
//! freeze can only start as a consequence of a saved or edited day.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::{
    normalize_note, ChallengeInfo, ChallengeRules, ChallengeState, DayLog, FreezeDecision,
    LogRating, LogStatus, ProgressionCalculator, StateUpdater,
};
use crate::error::{ConfigError, Result, ValidationError};
use crate::storage::ChallengeRepository;

/// Fields a user may change when editing (or back-filling) a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEdit {
    pub status: LogStatus,
    /// Ignored unless `status` is `Completed`.
    pub completed_minutes: u32,
    pub rating: Option<LogRating>,
    pub note: Option<String>,
}

/// Result of saving a log: the stored record and what the freeze check did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOutcome {
    pub log: DayLog,
    pub freeze: FreezeDecision,
}

/// Aggregate counts over the log history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSummary {
    pub logged_days: u32,
    pub completed_days: u32,
    pub missed_days: u32,
    pub failed_days: u32,
    pub good_days: u32,
    pub hard_days: u32,
    pub bad_days: u32,
    pub total_minutes: u64,
    pub success_threshold: u32,
    /// Completed days still needed to reach the threshold.
    pub days_to_success: u32,
}

/// Full dump of the challenge, suitable for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeExport {
    pub exported_at: chrono::DateTime<Utc>,
    pub state: Option<ChallengeState>,
    pub info: ChallengeInfo,
    pub summary: ChallengeSummary,
    pub logs: Vec<DayLog>,
}

/// Owns a repository and runs the challenge flows against it.
pub struct ChallengeService<R: ChallengeRepository> {
    repo: R,
    calculator: ProgressionCalculator,
    updater: StateUpdater,
}

impl<R: ChallengeRepository> ChallengeService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_rules(repo, ChallengeRules::default())
    }

    pub fn with_rules(repo: R, rules: ChallengeRules) -> Self {
        Self {
            repo,
            calculator: ProgressionCalculator::with_rules(rules),
            updater: StateUpdater::with_rules(rules),
        }
    }

    pub fn rules(&self) -> &ChallengeRules {
        self.calculator.rules()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Snapshot for `now`.
    ///
    /// A failed read is logged and treated as "no state / no logs", which
    /// yields the not-started snapshot.
    pub fn info(&self, now: NaiveDateTime) -> ChallengeInfo {
        let state = self.repo.state().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read challenge state");
            None
        });
        let logs = self.repo.logs().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read day logs");
            Vec::new()
        });
        self.calculator.compute_for_state(now, state.as_ref(), &logs)
    }

    /// Record a session that ran to the end of today's target.
    ///
    /// The first saved session starts the challenge.
    ///
    /// # Errors
    /// Returns `ValidationError::AlreadyCompleted` if today's log is already
    /// completed, or a repository failure.
    pub fn complete_session(
        &mut self,
        now: NaiveDateTime,
        rating: Option<LogRating>,
        note: Option<&str>,
    ) -> Result<LogOutcome> {
        let (started, target) = self.prepare_today(now)?;
        let log = DayLog::completed(now.date(), target)
            .with_rating(rating)
            .with_note(note);
        self.save_and_check(log, now, started)
    }

    /// Record a session stopped before the target was reached.
    ///
    /// # Errors
    /// Returns `ValidationError::AlreadyCompleted` if today's log is already
    /// completed, `ValidationError::InvalidValue` if `completed_minutes` is not
    /// below today's target, or a repository failure.
    pub fn stop_session_early(
        &mut self,
        now: NaiveDateTime,
        completed_minutes: u32,
        rating: Option<LogRating>,
        note: Option<&str>,
    ) -> Result<LogOutcome> {
        let (started, target) = self.prepare_today(now)?;
        if completed_minutes >= target {
            return Err(ValidationError::InvalidValue {
                field: "completed_minutes".into(),
                message: format!(
                    "an early stop must be shorter than today's {target} minute target"
                ),
            }
            .into());
        }
        let mut log = DayLog::new(now.date(), target)
            .with_rating(rating)
            .with_note(note);
        log.status = LogStatus::Failed;
        log.completed_minutes = completed_minutes;
        self.save_and_check(log, now, started)
    }

    /// Edit the log for `date`, creating it if the day has none.
    ///
    /// New logs are stamped with the target the challenge had on `date`.
    ///
    /// # Errors
    /// Returns `ValidationError::FutureDate` for days after today, or a
    /// repository failure.
    pub fn edit_log(&mut self, now: NaiveDateTime, date: NaiveDate, edit: LogEdit) -> Result<LogOutcome> {
        let today = now.date();
        if date > today {
            return Err(ValidationError::FutureDate { date, today }.into());
        }

        let mut log = match self.repo.log_for(date)? {
            Some(existing) => existing,
            None => {
                let state = self.repo.state()?;
                let logs = self.repo.logs()?;
                let target = self.calculator.target_on(date, state.as_ref(), &logs);
                DayLog::new(date, target)
            }
        };

        log.status = edit.status;
        log.completed_minutes = if edit.status == LogStatus::Completed {
            edit.completed_minutes
        } else {
            0
        };
        log.rating = edit.rating;
        log.note = normalize_note(edit.note.as_deref());

        self.save_and_check(log, now, None)
    }

    /// # Errors
    /// Propagates repository failures.
    pub fn log_for(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        self.repo.log_for(date)
    }

    /// All logs, newest first.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub fn logs(&self) -> Result<Vec<DayLog>> {
        self.repo.logs()
    }

    /// # Errors
    /// Propagates repository failures.
    pub fn summary(&self) -> Result<ChallengeSummary> {
        let logs = self.repo.logs()?;
        Ok(summarize(&logs, self.rules()))
    }

    /// # Errors
    /// Propagates repository failures.
    pub fn export(&self, now: NaiveDateTime) -> Result<ChallengeExport> {
        let state = self.repo.state()?;
        let logs = self.repo.logs()?;
        Ok(ChallengeExport {
            exported_at: Utc::now(),
            info: self.calculator.compute_for_state(now, state.as_ref(), &logs),
            summary: summarize(&logs, self.rules()),
            state,
            logs,
        })
    }

    /// Check that switching to `rules` keeps the stored history meaningful.
    ///
    /// A recorded freeze stores only its end date, so `freeze_days` cannot
    /// change until the challenge is reset.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for `rules.freeze_days`, or a
    /// repository failure.
    pub fn check_rules_change(&self, rules: &ChallengeRules) -> Result<()> {
        if rules.freeze_days == self.rules().freeze_days {
            return Ok(());
        }
        if let Some(until) = self.repo.state()?.and_then(|state| state.freeze_until) {
            return Err(ConfigError::InvalidValue {
                key: "rules.freeze_days".into(),
                message: format!(
                    "a freeze ending {until} is recorded; reset the challenge before changing it"
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Delete all history and leave an empty, not-started record.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub fn reset(&mut self) -> Result<()> {
        self.repo.atomically(|repo| {
            repo.clear()?;
            repo.save_state(&ChallengeState::default())
        })?;
        tracing::info!("challenge history cleared");
        Ok(())
    }

    /// Today's target, plus the record to write if this session starts
    /// the challenge. A completed day only changes through [`Self::edit_log`].
    fn prepare_today(&self, now: NaiveDateTime) -> Result<(Option<ChallengeState>, u32)> {
        let today = now.date();
        if let Some(existing) = self.repo.log_for(today)? {
            if existing.status == LogStatus::Completed {
                return Err(ValidationError::AlreadyCompleted { date: today }.into());
            }
        }

        let mut state = self.repo.state()?.unwrap_or_default();
        let started = if state.start_date.is_none() {
            state.start_date = Some(now.date());
            Some(state)
        } else {
            None
        };
        let logs = self.repo.logs()?;
        let target = self
            .calculator
            .compute_for_state(now, Some(&state), &logs)
            .target_minutes;
        Ok((started, target))
    }

    fn save_and_check(
        &mut self,
        log: DayLog,
        now: NaiveDateTime,
        started: Option<ChallengeState>,
    ) -> Result<LogOutcome> {
        let updater = &self.updater;
        let freeze = self.repo.atomically(|repo| {
            if let Some(state) = &started {
                repo.save_state(state)?;
            }
            repo.upsert_log(&log)?;
            updater.apply_with_repository(repo, now)
        })?;
        if started.is_some() {
            tracing::info!(start = %now.date(), "challenge started");
        }
        tracing::debug!(date = %log.date, status = log.status.as_str(), ?freeze, "log saved");
        Ok(LogOutcome { log, freeze })
    }
}

fn summarize(logs: &[DayLog], rules: &ChallengeRules) -> ChallengeSummary {
    let mut summary = ChallengeSummary {
        success_threshold: rules.success_threshold(),
        ..Default::default()
    };

    for log in logs {
        summary.logged_days += 1;
        summary.total_minutes += u64::from(log.completed_minutes);
        match log.status {
            LogStatus::Completed => summary.completed_days += 1,
            LogStatus::Missed => summary.missed_days += 1,
            LogStatus::Failed => summary.failed_days += 1,
        }
        match log.rating {
            Some(LogRating::Good) => summary.good_days += 1,
            Some(LogRating::Hard) => summary.hard_days += 1,
            Some(LogRating::Bad) => summary.bad_days += 1,
            None => {}
        }
    }

    summary.days_to_success = summary
        .success_threshold
        .saturating_sub(summary.completed_days);
    summary
}
