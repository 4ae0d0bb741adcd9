use chrono::NaiveDate;

use crate::clockify::{ClockifyCli, SinkEntries, SinkEntry};
use crate::error::Result;
use crate::model::Outcome;
use crate::report::{Format, RunReport, print_report, trace};
use crate::resolve::{Prompt, StdinPrompt};

/// CLI entry: preflight check, fetch the date range, delete.
pub fn run(
    start: NaiveDate,
    end: NaiveDate,
    dry_run: bool,
    interactive: bool,
    format: Format,
) -> Result<()> {
    ClockifyCli::check_available()?;

    trace(format, &format!("Fetching entries from {start} to {end}..."));
    let entries = ClockifyCli.entries(start, end)?;

    let mut prompt = StdinPrompt { format };
    let report = delete_entries(&entries, &ClockifyCli, &mut prompt, dry_run, interactive, format);
    print_report(&report, "Deletion", "deleted", format)?;

    if !dry_run && !interactive && report.succeeded > 0 {
        trace(
            format,
            "Warning: all entries in the date range have been permanently deleted!",
        );
    }
    Ok(())
}

/// Delete loop with the same accounting and partial-failure semantics as the
/// migration engine: one bad entry never stops the run.
pub fn delete_entries<S: SinkEntries, P: Prompt>(
    entries: &[SinkEntry],
    sink: &S,
    prompt: &mut P,
    dry_run: bool,
    interactive: bool,
    format: Format,
) -> RunReport {
    let mut report = RunReport::new(dry_run);
    if entries.is_empty() {
        trace(format, "No entries found to delete.");
        return report;
    }

    trace(
        format,
        &format!("Found {} entries in the specified date range:", entries.len()),
    );

    for entry in entries {
        let outcome = handle_entry(entry, sink, prompt, dry_run, interactive, format);
        report.record(&outcome);
    }
    report
}

fn handle_entry<S: SinkEntries, P: Prompt>(
    entry: &SinkEntry,
    sink: &S,
    prompt: &mut P,
    dry_run: bool,
    interactive: bool,
    format: Format,
) -> Outcome {
    let Some(id) = entry.id.as_deref() else {
        trace(format, "Skipping entry without an id");
        return Outcome::Skipped("entry without an id".into());
    };

    let summary = entry.summary();

    if dry_run {
        trace(format, &format!("Would delete: {summary}"));
        return Outcome::Migrated;
    }

    if interactive {
        trace(format, &format!("Entry: {summary}"));
        let confirmed = prompt
            .ask("Delete this entry? (y/N): ")
            .is_some_and(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes"));
        if !confirmed {
            trace(format, "Skipped.");
            return Outcome::Skipped("declined by operator".into());
        }
    }

    trace(format, &format!("Deleting: {summary}"));
    match sink.delete_entry(id) {
        Ok(()) => {
            trace(format, "  Success: entry deleted");
            Outcome::Migrated
        }
        Err(e) => {
            trace(format, &format!("  Error deleting entry {id}: {e}"));
            Outcome::Failed(e.to_string())
        }
    }
}
