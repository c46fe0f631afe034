//! Terminal rendering for status events and outcomes.
//!
//! Human mode colours each line by severity. `--json` mode prints one JSON
//! object per line so callers can stream it.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use gitloader_core::{CloneOutcome, Severity, StatusEvent, SyncOutcome, SyncPhase};

#[derive(Debug, Clone, Copy)]
pub enum Format {
    Human,
    Json,
}

impl Format {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Human
        }
    }
}

pub fn event(format: Format, event: &StatusEvent) {
    match format {
        Format::Human => println!("{}", paint_event(event)),
        Format::Json => print_json_line(event),
    }
}

/// Print the terminal result of a sync. Failure details go to stderr.
pub fn sync_outcome(format: Format, outcome: &SyncOutcome) -> Result<()> {
    match format {
        Format::Json => print_json_line_checked(outcome),
        Format::Human => {
            match outcome {
                SyncOutcome::Pushed { commit_message } => {
                    println!("{} {}", "commit:".bright_black(), commit_message);
                }
                SyncOutcome::NoChanges => {}
                SyncOutcome::Failed { kind, detail } => {
                    eprintln!("{} {}", kind.headline().red().bold(), detail.trim());
                }
            }
            Ok(())
        }
    }
}

pub fn clone_outcome(format: Format, outcome: &CloneOutcome) -> Result<()> {
    match format {
        Format::Json => print_json_line_checked(outcome),
        Format::Human => {
            match outcome {
                CloneOutcome::Succeeded { destination } => println!(
                    "{} {}",
                    "Clone successful!".green().bold(),
                    destination.display()
                ),
                CloneOutcome::Failed { detail } => {
                    eprintln!("{} {}", "Clone failed:".red().bold(), detail.trim());
                }
            }
            Ok(())
        }
    }
}

fn paint_event(event: &StatusEvent) -> String {
    let text = event.message.as_str();
    match (event.severity, event.phase) {
        (Severity::Error, _) => text.red().bold().to_string(),
        (Severity::Success, _) => text.green().bold().to_string(),
        (Severity::Info, SyncPhase::NoChange) => text.blue().to_string(),
        (Severity::Info, _) => text.yellow().to_string(),
    }
}

fn print_json_line<T: Serialize>(value: &T) {
    if let Err(err) = print_json_line_checked(value) {
        tracing::warn!(error = %err, "dropping unserializable status line");
    }
}

fn print_json_line_checked<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string(value).context("failed to serialize JSON output")?
    );
    Ok(())
}
