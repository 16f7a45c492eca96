//! Persisted records: the challenge singleton and the per-day logs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum length of a day note, in characters.
pub const NOTE_MAX_CHARS: usize = 120;

/// Singleton record describing the running challenge.
///
/// `start_date` is written once, on the first saved session. `freeze_until`
/// is written only by [`StateUpdater`](super::StateUpdater) and is never
/// cleared; resumption is derived from the date comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeState {
    pub start_date: Option<NaiveDate>,
    pub freeze_until: Option<NaiveDate>,
}

impl ChallengeState {
    pub fn started_on(start_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            freeze_until: None,
        }
    }

    /// Whether `today` falls inside the stored freeze window.
    pub fn is_frozen_on(&self, today: NaiveDate) -> bool {
        self.freeze_until.is_some_and(|until| today < until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Completed,
    Missed,
    Failed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Completed => "completed",
            LogStatus::Missed => "missed",
            LogStatus::Failed => "failed",
        }
    }

    /// Parse a stored status. Unknown values read as `Missed`.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "completed" => LogStatus::Completed,
            "failed" => LogStatus::Failed,
            _ => LogStatus::Missed,
        }
    }
}

impl std::str::FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "completed" => Ok(LogStatus::Completed),
            "missed" => Ok(LogStatus::Missed),
            "failed" => Ok(LogStatus::Failed),
            other => Err(format!(
                "unknown status '{other}' (expected completed, missed or failed)"
            )),
        }
    }
}

/// How the session felt, as reported by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRating {
    Good,
    Hard,
    Bad,
}

impl LogRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogRating::Good => "good",
            LogRating::Hard => "hard",
            LogRating::Bad => "bad",
        }
    }

    /// Parse a stored rating. Unknown values read as no rating.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::str::FromStr for LogRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "good" => Ok(LogRating::Good),
            "hard" => Ok(LogRating::Hard),
            "bad" => Ok(LogRating::Bad),
            other => Err(format!(
                "unknown rating '{other}' (expected good, hard or bad)"
            )),
        }
    }
}

/// One calendar day of the challenge. Keyed by `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLog {
    pub date: NaiveDate,
    pub target_minutes: u32,
    pub completed_minutes: u32,
    pub status: LogStatus,
    pub rating: Option<LogRating>,
    pub note: Option<String>,
}

impl DayLog {
    /// A missed day with nothing recorded yet.
    pub fn new(date: NaiveDate, target_minutes: u32) -> Self {
        Self {
            date,
            target_minutes,
            completed_minutes: 0,
            status: LogStatus::Missed,
            rating: None,
            note: None,
        }
    }

    /// A fully completed session.
    pub fn completed(date: NaiveDate, target_minutes: u32) -> Self {
        Self {
            completed_minutes: target_minutes,
            status: LogStatus::Completed,
            ..Self::new(date, target_minutes)
        }
    }

    pub fn with_rating(mut self, rating: Option<LogRating>) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.set_note(note);
        self
    }

    /// Store a note, treating blank input as no note and truncating to
    /// [`NOTE_MAX_CHARS`] characters.
    pub fn set_note(&mut self, note: Option<&str>) {
        self.note = normalize_note(note);
    }

    pub fn is_bad(&self) -> bool {
        self.rating == Some(LogRating::Bad)
    }
}

/// Blank notes become `None`; long notes are cut at a char boundary.
pub fn normalize_note(note: Option<&str>) -> Option<String> {
    let note = note?;
    if note.trim().is_empty() {
        return None;
    }
    Some(note.chars().take(NOTE_MAX_CHARS).collect())
}
