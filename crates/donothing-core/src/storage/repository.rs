//! Storage seam between the engine and whatever keeps the records.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::challenge::{ChallengeState, DayLog};
use crate::error::Result;

/// Access to the challenge record and the day logs.
///
/// Writers take `&mut self`, so one repository handle serializes all
/// state updates made through it.
pub trait ChallengeRepository {
    /// The singleton challenge record, or `None` before the first session.
    fn state(&self) -> Result<Option<ChallengeState>>;

    /// Create or replace the singleton challenge record.
    fn save_state(&mut self, state: &ChallengeState) -> Result<()>;

    /// All logs, newest first.
    fn logs(&self) -> Result<Vec<DayLog>>;

    fn log_for(&self, date: NaiveDate) -> Result<Option<DayLog>>;

    /// Insert or replace the log for `log.date`.
    fn upsert_log(&mut self, log: &DayLog) -> Result<()>;

    /// Delete every log and the challenge record.
    fn clear(&mut self) -> Result<()>;

    /// Run a read-modify-write sequence as one unit.
    ///
    /// Stores shared between processes override this with a real
    /// transaction; the default just calls `f`.
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
        Self: Sized,
    {
        f(self)
    }
}

/// Repository kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Option<ChallengeState>,
    logs: BTreeMap<NaiveDate, DayLog>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeRepository for MemoryRepository {
    fn state(&self) -> Result<Option<ChallengeState>> {
        Ok(self.state)
    }

    fn save_state(&mut self, state: &ChallengeState) -> Result<()> {
        self.state = Some(*state);
        Ok(())
    }

    fn logs(&self) -> Result<Vec<DayLog>> {
        Ok(self.logs.values().rev().cloned().collect())
    }

    fn log_for(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        Ok(self.logs.get(&date).cloned())
    }

    fn upsert_log(&mut self, log: &DayLog) -> Result<()> {
        self.logs.insert(log.date, log.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.state = None;
        self.logs.clear();
        Ok(())
    }
}
