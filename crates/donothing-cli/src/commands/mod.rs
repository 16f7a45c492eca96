pub mod config;
pub mod export;
pub mod log;
pub mod reset;
pub mod session;
pub mod stats;
pub mod status;

use chrono::NaiveDateTime;
use donothing_core::{ChallengeService, Config, Database, DayLog, LogOutcome};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Local wall-clock time; the challenge counts calendar days where the user lives.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Service over the on-disk database, using the configured rules.
///
/// An unreadable config falls back to the default rules with a warning.
pub fn open_service() -> Result<ChallengeService<Database>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok(ChallengeService::with_rules(db, config.rules))
}

pub fn print_log_line(log: &DayLog) {
    let rating = log.rating.map(|r| r.as_str()).unwrap_or("-");
    let note = log.note.as_deref().unwrap_or("");
    println!(
        "{}  {:<9}  {:>2}/{:<2} min  {:<4}  {}",
        log.date,
        log.status.as_str(),
        log.completed_minutes,
        log.target_minutes,
        rating,
        note
    );
}

pub fn print_outcome(outcome: &LogOutcome) -> CliResult {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    if let donothing_core::FreezeDecision::Started { until } = outcome.freeze {
        tracing::warn!(%until, "three bad days in a row, progression frozen");
    }
    Ok(())
}
