//! Day log commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use donothing_core::{LogEdit, LogRating, LogStatus};

use super::{now, open_service, print_log_line, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Create or replace the log for a past day (or today)
    Edit {
        /// Day to edit (YYYY-MM-DD)
        date: NaiveDate,
        /// completed, missed or failed
        #[arg(long)]
        status: LogStatus,
        /// Minutes sat; only kept for completed days
        #[arg(long, default_value = "0")]
        minutes: u32,
        /// good, hard or bad
        #[arg(long)]
        rating: Option<LogRating>,
        /// Short note (up to 120 characters)
        #[arg(long)]
        note: Option<String>,
    },
    /// Show one day as JSON
    Show {
        /// Day to show (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// List all logs, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogAction) -> CliResult {
    let mut service = open_service()?;

    match action {
        LogAction::Edit {
            date,
            status,
            minutes,
            rating,
            note,
        } => {
            let edit = LogEdit {
                status,
                completed_minutes: minutes,
                rating,
                note,
            };
            let outcome = service.edit_log(now(), date, edit)?;
            print_outcome(&outcome)?;
        }
        LogAction::Show { date } => match service.log_for(date)? {
            Some(log) => println!("{}", serde_json::to_string_pretty(&log)?),
            None => return Err(format!("no log for {date}").into()),
        },
        LogAction::List { json } => {
            let logs = service.logs()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&logs)?);
            } else if logs.is_empty() {
                println!("No logs yet.");
            } else {
                for log in &logs {
                    print_log_line(log);
                }
            }
        }
    }
    Ok(())
}
