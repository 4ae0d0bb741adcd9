use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MigrateError, Result};

/// One recorded time-tracking entry from the timewarrior export.
/// An interval with no `end` is still running and is never migratable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Interval {
    #[serde(deserialize_with = "de_timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub end: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Interval {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Elapsed hours for the trace line; `None` while the interval is open.
    pub fn hours(&self) -> Option<f64> {
        self.end
            .map(|end| (end - self.start).num_seconds() as f64 / 3600.0)
    }

    /// `start - end` shown in skip/success messages; open intervals read "ongoing".
    pub fn range_label(&self) -> String {
        let end = self
            .end
            .map(|e| e.to_rfc3339())
            .unwrap_or_else(|| "ongoing".to_string());
        format!("{} - {}", self.start.to_rfc3339(), end)
    }
}

/// Parse a source timestamp. Accepts RFC 3339 (with `Z` meaning UTC) and
/// timewarrior's compact `YYYYMMDDTHHMMSSZ` form. The offset is kept as
/// provided; no timezone conversion happens anywhere downstream.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    if let Some(compact) = s.strip_suffix('Z')
        && let Ok(naive) = chrono::NaiveDateTime::parse_from_str(compact, "%Y%m%dT%H%M%S")
    {
        return Ok(naive.and_utc().fixed_offset());
    }
    Err(MigrateError::Timestamp(s.to_string()))
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn de_opt_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Which tag selects the client/project pair, and what becomes the entry
/// description.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum Policy {
    /// tags[0] classifies; the remaining tags joined by spaces become the
    /// description (or tags[0] itself when it is the only tag).
    #[default]
    FirstTag,
    /// tags[0] is the description verbatim; tags[1] classifies.
    SecondTag,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstTag => write!(f, "first-tag"),
            Self::SecondTag => write!(f, "second-tag"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub description: String,
    pub classifier: String,
}

impl Policy {
    pub fn min_tags(&self) -> usize {
        match self {
            Self::FirstTag => 1,
            Self::SecondTag => 2,
        }
    }

    /// Pure tag-selection step. `None` when the interval carries fewer tags
    /// than the policy requires.
    pub fn classify(&self, tags: &[String]) -> Option<Classification> {
        if tags.len() < self.min_tags() {
            return None;
        }
        match self {
            Self::FirstTag => Some(Classification {
                description: if tags.len() > 1 {
                    tags[1..].join(" ")
                } else {
                    tags[0].clone()
                },
                classifier: tags[0].clone(),
            }),
            Self::SecondTag => Some(Classification {
                description: tags[0].clone(),
                classifier: tags[1].clone(),
            }),
        }
    }
}

/// A client or project row from the sink catalog. The 1-based ordinal shown
/// to the operator maps straight onto the sequence index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

/// Result of handling one interval (or one sink entry, for `delete`).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Migrated,
    Skipped(String),
    Failed(String),
}
