use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::model::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
}

/// Per-interval trace line. In json mode these go to stderr so stdout stays
/// a single parseable report object.
pub fn trace(format: Format, line: &str) {
    match format {
        Format::Json => eprintln!("{line}"),
        Format::Pretty => println!("{line}"),
    }
}

/// Authoritative success/skip accounting for one run. The operator should
/// trust this over scrollback.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub succeeded: usize,
    pub skipped: usize,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Migrated => self.succeeded += 1,
            Outcome::Skipped(_) | Outcome::Failed(_) => self.skipped += 1,
        }
    }

    /// The success verb must not imply an action that did not occur, so
    /// dry-run always reads "processed".
    fn success_verb<'a>(&self, verb: &'a str) -> &'a str {
        if self.dry_run { "processed" } else { verb }
    }
}

pub fn print_report(report: &RunReport, heading: &str, verb: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            println!();
            println!("{}", format!("{heading} summary:").bold());
            println!(
                "  Successfully {}: {}",
                report.success_verb(verb),
                report.succeeded
            );
            println!("  Skipped: {}", report.skipped);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcomes_count_as_skipped() {
        let mut report = RunReport::new(false);
        report.record(&Outcome::Migrated);
        report.record(&Outcome::Skipped("open interval".into()));
        report.record(&Outcome::Failed("sink said no".into()));
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn dry_run_reports_processed() {
        let report = RunReport::new(true);
        assert_eq!(report.success_verb("migrated"), "processed");
    }

    #[test]
    fn live_run_keeps_action_verb() {
        let report = RunReport::new(false);
        assert_eq!(report.success_verb("migrated"), "migrated");
        assert_eq!(report.success_verb("deleted"), "deleted");
    }

    #[test]
    fn json_report_carries_counts_and_mode() {
        let mut report = RunReport::new(true);
        report.record(&Outcome::Migrated);
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"dry_run":true,"succeeded":1,"skipped":0}"#);
    }
}
