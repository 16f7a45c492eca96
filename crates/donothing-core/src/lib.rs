//! # Do Nothing Core Library
//!
//! Business logic for the Do Nothing challenge: an 84-day program in which a
//! daily session of deliberately doing nothing grows from 5 to 60 minutes.
//! Three bad-rated days in a row hold growth for 14 days.
//!
//! ## Architecture
//!
//! - **Progression engine**: pure functions deriving day, week and target
//!   from dates and history, plus the freeze trigger and its guarded writer
//! - **Storage**: SQLite-backed repository and TOML-based configuration
//! - **Service**: session, edit, summary and export flows on top of a
//!   [`ChallengeRepository`]
//!
//! ## Key Components
//!
//! - [`ProgressionCalculator`]: today's [`ChallengeInfo`]
//! - [`FreezeTriggerDetector`]: detects a run of bad days
//! - [`StateUpdater`]: the only writer of the freeze window
//! - [`Database`]: challenge persistence
//! - [`Config`]: application configuration management

pub mod challenge;
pub mod error;
pub mod service;
pub mod storage;

pub use challenge::{
    ChallengeInfo, ChallengePhase, ChallengeRules, ChallengeState, DayLog, FreezeDecision,
    FreezeTriggerDetector, LogRating, LogStatus, ProgressionCalculator, StateUpdater,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use service::{ChallengeExport, ChallengeService, ChallengeSummary, LogEdit, LogOutcome};
pub use storage::{ChallengeRepository, Config, Database, MemoryRepository};
