use std::process::Command;

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use serde::Deserialize;

use crate::error::{MigrateError, Result};
use crate::model::{CatalogEntry, parse_timestamp};

/// One fully-resolved entry about to be written to the sink. Timestamps keep
/// whatever offset the source carried.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub client: String,
    pub project: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// `YYYY-MM-DDTHH:MM:SS±HHMM`, the form `clockify-cli manual` accepts.
pub fn sink_timestamp(ts: DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

impl EntryDraft {
    fn args(&self) -> Vec<String> {
        vec![
            "manual".into(),
            "--client".into(),
            self.client.clone(),
            "--project".into(),
            self.project.clone(),
            "--description".into(),
            self.description.clone(),
            "--when".into(),
            sink_timestamp(self.start),
            "--when-to".into(),
            sink_timestamp(self.end),
        ]
    }
}

/// Sink-write seam. Dry-run correctness is asserted against this boundary:
/// under dry-run the engine must never call it.
pub trait SinkWriter {
    fn create_entry(&self, draft: &EntryDraft) -> Result<String>;
}

/// Sink catalog seam used by interactive resolution.
pub trait SinkCatalog {
    fn clients(&self) -> Result<Vec<CatalogEntry>>;
    fn projects(&self, client_id: &str) -> Result<Vec<CatalogEntry>>;
}

/// Sink entry listing/deletion seam used by the `delete` subcommand.
pub trait SinkEntries {
    fn entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<SinkEntry>>;
    fn delete_entry(&self, id: &str) -> Result<()>;
}

/// An existing sink entry as returned by `clockify-cli report --json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub time_interval: Option<TimeInterval>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeInterval {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl SinkEntry {
    /// One-line display used by `delete` trace output.
    pub fn summary(&self) -> String {
        let interval = self.time_interval.as_ref();
        let start = display_time(interval.and_then(|i| i.start.as_deref()), "Unknown");
        let end = display_time(interval.and_then(|i| i.end.as_deref()), "Ongoing");
        let duration = interval
            .and_then(|i| i.duration.as_deref())
            .unwrap_or("Unknown");
        let project = self
            .project
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("No project");
        let description = self.description.as_deref().unwrap_or("No description");
        format!("{start} - {end} ({duration}) | {project} | {description}")
    }
}

fn display_time(raw: Option<&str>, fallback: &str) -> String {
    match raw {
        None => fallback.to_string(),
        Some(s) => match parse_timestamp(s) {
            Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Err(_) => s.to_string(),
        },
    }
}

/// Real sink shelling out to `clockify-cli`.
pub struct ClockifyCli;

impl ClockifyCli {
    /// Health check run before any migration or deletion work.
    pub fn check_available() -> Result<()> {
        let ok = Command::new("clockify-cli")
            .arg("version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if ok {
            Ok(())
        } else {
            Err(MigrateError::ToolMissing {
                tool: "clockify-cli".into(),
                hint: "install it from https://github.com/lucassabreu/clockify-cli".into(),
            })
        }
    }

    fn run(action: &str, args: &[String]) -> Result<String> {
        let output = Command::new("clockify-cli")
            .args(args)
            .output()
            .map_err(|e| MigrateError::Sink {
                action: action.into(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(MigrateError::Sink {
                action: action.into(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parse_catalog(action: &str, raw: &str) -> Result<Vec<CatalogEntry>> {
        serde_json::from_str(raw).map_err(|e| MigrateError::Sink {
            action: action.into(),
            message: format!("unparsable output: {e}"),
        })
    }
}

/// `clockify-cli report` treats its end bound as exclusive, so the inclusive
/// `--end` day is advanced by one before being handed over.
fn report_args(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let exclusive = end.checked_add_days(Days::new(1)).unwrap_or(end);
    vec![
        "report".into(),
        start.to_string(),
        exclusive.to_string(),
        "--json".into(),
    ]
}

impl SinkWriter for ClockifyCli {
    fn create_entry(&self, draft: &EntryDraft) -> Result<String> {
        Self::run("manual", &draft.args()).map(|out| out.trim().to_string())
    }
}

impl SinkCatalog for ClockifyCli {
    fn clients(&self) -> Result<Vec<CatalogEntry>> {
        let args: Vec<String> = vec![
            "client".into(),
            "list".into(),
            "--not-archived".into(),
            "--json".into(),
        ];
        let raw = Self::run("client list", &args)?;
        Self::parse_catalog("client list", &raw)
    }

    fn projects(&self, client_id: &str) -> Result<Vec<CatalogEntry>> {
        let args: Vec<String> = vec![
            "project".into(),
            "list".into(),
            "--clients".into(),
            client_id.into(),
            "--json".into(),
        ];
        let raw = Self::run("project list", &args)?;
        Self::parse_catalog("project list", &raw)
    }
}

impl SinkEntries for ClockifyCli {
    fn entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<SinkEntry>> {
        let raw = Self::run("report", &report_args(start, end))?;
        serde_json::from_str(&raw).map_err(|e| MigrateError::Sink {
            action: "report".into(),
            message: format!("unparsable output: {e}"),
        })
    }

    fn delete_entry(&self, id: &str) -> Result<()> {
        let args: Vec<String> = vec!["delete".into(), id.into(), "-i=0".into()];
        Self::run("delete", &args).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_timestamp_preserves_offset() {
        let ts = parse_timestamp("2024-03-01T09:30:00+02:00").unwrap();
        assert_eq!(sink_timestamp(ts), "2024-03-01T09:30:00+0200");
    }

    #[test]
    fn sink_timestamp_utc_offset() {
        let ts = parse_timestamp("20240301T093000Z").unwrap();
        assert_eq!(sink_timestamp(ts), "2024-03-01T09:30:00+0000");
    }

    #[test]
    fn entry_draft_builds_manual_command() {
        let draft = EntryDraft {
            client: "Acme".into(),
            project: "Backend".into(),
            description: "feature-x".into(),
            start: parse_timestamp("2024-03-01T08:00:00Z").unwrap(),
            end: parse_timestamp("2024-03-01T09:30:00Z").unwrap(),
        };
        assert_eq!(
            draft.args(),
            vec![
                "manual",
                "--client",
                "Acme",
                "--project",
                "Backend",
                "--description",
                "feature-x",
                "--when",
                "2024-03-01T08:00:00+0000",
                "--when-to",
                "2024-03-01T09:30:00+0000",
            ]
        );
    }

    #[test]
    fn report_end_bound_is_inclusive() {
        let args = report_args("2024-03-01".parse().unwrap(), "2024-03-05".parse().unwrap());
        assert_eq!(args, vec!["report", "2024-03-01", "2024-03-06", "--json"]);
    }

    #[test]
    fn sink_entry_summary_with_full_fields() {
        let entry: SinkEntry = serde_json::from_str(
            r#"{
                "id": "e1",
                "description": "standup",
                "project": {"name": "Backend"},
                "timeInterval": {
                    "start": "2024-03-01T08:00:00Z",
                    "end": "2024-03-01T08:15:00Z",
                    "duration": "PT15M"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            entry.summary(),
            "2024-03-01 08:00:00 - 2024-03-01 08:15:00 (PT15M) | Backend | standup"
        );
    }

    #[test]
    fn sink_entry_summary_with_missing_fields() {
        let entry: SinkEntry = serde_json::from_str(r#"{"id": "e2"}"#).unwrap();
        assert_eq!(
            entry.summary(),
            "Unknown - Ongoing (Unknown) | No project | No description"
        );
    }
}
