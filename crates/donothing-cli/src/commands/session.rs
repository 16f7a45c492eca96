use clap::Subcommand;
use donothing_core::LogRating;

use super::{now, open_service, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Record a session that reached today's target
    Complete {
        /// How it felt: good, hard or bad
        #[arg(long)]
        rating: Option<LogRating>,
        /// Short note (up to 120 characters)
        #[arg(long)]
        note: Option<String>,
    },
    /// Record a session stopped before the target
    Stop {
        /// Minutes actually sat
        #[arg(long)]
        minutes: u32,
        /// How it felt: good, hard or bad
        #[arg(long)]
        rating: Option<LogRating>,
        /// Short note (up to 120 characters)
        #[arg(long)]
        note: Option<String>,
    },
}

pub fn run(action: SessionAction) -> CliResult {
    let mut service = open_service()?;

    let outcome = match action {
        SessionAction::Complete { rating, note } => {
            service.complete_session(now(), rating, note.as_deref())?
        }
        SessionAction::Stop {
            minutes,
            rating,
            note,
        } => service.stop_session_early(now(), minutes, rating, note.as_deref())?,
    };

    print_outcome(&outcome)
}
