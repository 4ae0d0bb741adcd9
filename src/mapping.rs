use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{MigrateError, Result};

/// Written verbatim on first use, then the run aborts so the operator can
/// fill in real mappings.
const TEMPLATE: &str = "\
# Timewarrior tag to Clockify client/project mapping
# Format: tag=client/project
# Example:
# development=MyClient/WebApp
# meetings=Internal/Meetings
";

/// The sink-side pair a classifier tag resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub client: String,
    pub project: String,
}

/// File-backed tag -> client/project associations. Loaded once per run and
/// read-only afterwards; interactive resolution may append new lines but
/// never rewrites existing ones.
#[derive(Debug)]
pub struct MappingStore {
    path: PathBuf,
    entries: HashMap<String, Target>,
}

impl MappingStore {
    /// Default location under the user's configuration directory. Always
    /// overridable with `--config`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timew2clockify")
            .join("mapping.conf")
    }

    /// Load the mapping file, or bootstrap a commented template and fail so
    /// the operator edits it before anything is migrated.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, TEMPLATE)?;
            return Err(MigrateError::MappingCreated(path.to_path_buf()));
        }

        let mut entries = HashMap::new();
        for line in fs::read_to_string(path)?.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((tag, target)) = line.split_once('=') else {
                eprintln!("warning: ignoring invalid mapping line: {line}");
                continue;
            };
            let (client, project) = target.split_once('/').unwrap_or((target, ""));
            // duplicate tags: last line wins
            entries.insert(
                tag.trim().to_string(),
                Target {
                    client: client.trim().to_string(),
                    project: project.trim().to_string(),
                },
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn get(&self, tag: &str) -> Option<&Target> {
        self.entries.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `tag=client/project` line. Existing bytes are left intact.
    pub fn append(&self, tag: &str, client: &str, project: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{tag}={client}/{project}")?;
        Ok(())
    }
}
