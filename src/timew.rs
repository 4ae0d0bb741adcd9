use std::process::Command;

use chrono::{Days, NaiveDate};

use crate::error::{MigrateError, Result};
use crate::model::Interval;

/// Optional date bounds for the export. Both ends are inclusive of the named
/// day from the operator's point of view.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Source-store export seam. The engine and CLI only depend on this, so tests
/// substitute an in-memory sequence.
pub trait SourceExport {
    fn export(&self, range: DateRange) -> Result<Vec<Interval>>;
}

/// Real exporter shelling out to `timew export`.
pub struct TimewCli;

impl TimewCli {
    /// Health check run before any migration work.
    pub fn check_available() -> Result<()> {
        let ok = Command::new("timew")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if ok {
            Ok(())
        } else {
            Err(MigrateError::ToolMissing {
                tool: "timewarrior (timew)".into(),
                hint: "install it from https://github.com/GothenburgBitFactory/timewarrior".into(),
            })
        }
    }
}

/// `timew` treats its `to` bound as exclusive, so the inclusive `--end` day
/// is advanced by one before being handed over.
fn export_args(range: DateRange) -> Vec<String> {
    let mut args = vec!["export".to_string()];
    if let Some(start) = range.start {
        args.push("from".into());
        args.push(start.to_string());
    }
    if let Some(end) = range.end {
        let exclusive = end.checked_add_days(Days::new(1)).unwrap_or(end);
        args.push("to".into());
        args.push(exclusive.to_string());
    }
    args
}

impl SourceExport for TimewCli {
    fn export(&self, range: DateRange) -> Result<Vec<Interval>> {
        let output = Command::new("timew")
            .args(export_args(range))
            .output()
            .map_err(|e| MigrateError::SourceExport(e.to_string()))?;
        if !output.status.success() {
            return Err(MigrateError::SourceExport(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout).map_err(|e| MigrateError::SourceParse(e.to_string()))
    }
}
