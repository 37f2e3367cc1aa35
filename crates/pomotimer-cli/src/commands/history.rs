use chrono::{DateTime, Utc};
use clap::Subcommand;
use pomotimer_core::{
    format_minutes_seconds, CoreError, HistoryEntry, HistoryRepository, NewHistoryEntry, Result,
};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List logged sessions, oldest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one session as JSON
    Show {
        id: String,
    },
    /// Log a session manually
    Add {
        /// Start time (RFC 3339)
        #[arg(long)]
        start: String,
        /// End time (RFC 3339)
        #[arg(long)]
        end: String,
    },
    /// Remove a session by id
    Remove {
        id: String,
    },
    /// Remove every session
    Clear,
    /// Totals over all sessions and today
    Summary,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map_err(|e| CoreError::Custom(format!("invalid timestamp '{value}': {e}")))?;
    Ok(parsed.with_timezone(&Utc))
}

fn print_entry(entry: &HistoryEntry) {
    println!(
        "{}  {}  {}",
        entry.id,
        entry.start.format("%Y-%m-%d %H:%M"),
        format_minutes_seconds(entry.duration)
    );
}

pub fn run(action: HistoryAction) -> Result<()> {
    let mut repo = HistoryRepository::open_default()?;

    match action {
        HistoryAction::List { json } => {
            let history = repo.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("no sessions logged");
            } else {
                history.iter().for_each(print_entry);
            }
        }
        HistoryAction::Show { id } => match repo.get(&id) {
            Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
            None => return Err(CoreError::Custom(format!("no session with id {id}"))),
        },
        HistoryAction::Add { start, end } => {
            let start = parse_time(&start)?;
            let end = parse_time(&end)?;
            if end < start {
                return Err(CoreError::Custom("end must not be before start".into()));
            }
            let entry = repo
                .append(NewHistoryEntry::new(start, end))
                .ok_or_else(|| CoreError::Custom("session was not saved".into()))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        HistoryAction::Remove { id } => {
            if !repo.remove_by_id(&id) {
                return Err(CoreError::Custom(format!("no session with id {id}")));
            }
            println!("removed {id}");
        }
        HistoryAction::Clear => {
            if !repo.clear() {
                return Err(CoreError::Custom("history was not cleared".into()));
            }
            println!("history cleared");
        }
        HistoryAction::Summary => {
            let summary = repo.summary(Utc::now());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
