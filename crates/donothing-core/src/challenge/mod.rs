mod freeze;
mod model;
mod progression;
mod rules;
mod updater;

pub use freeze::FreezeTriggerDetector;
pub use model::{normalize_note, ChallengeState, DayLog, LogRating, LogStatus, NOTE_MAX_CHARS};
pub use progression::{ChallengeInfo, ChallengePhase, ProgressionCalculator};
pub use rules::ChallengeRules;
pub use updater::{FreezeDecision, StateUpdater};
