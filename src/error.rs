use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("{tool} not found or not working properly ({hint})")]
    ToolMissing { tool: String, hint: String },

    #[error(
        "created example mapping file at {0}; edit it to define your tag mappings and run again"
    )]
    MappingCreated(PathBuf),

    #[error(
        "no valid mappings found in {0}; add at least one line in the format tag=client/project"
    )]
    NoMappings(PathBuf),

    #[error("timewarrior export failed: {0}")]
    SourceExport(String),

    #[error("could not parse timewarrior export: {0}")]
    SourceParse(String),

    #[error("invalid timestamp {0:?}")]
    Timestamp(String),

    #[error("clockify-cli {action} failed: {message}")]
    Sink { action: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolMissing { .. } => "tool_missing",
            Self::MappingCreated(_) => "mapping_created",
            Self::NoMappings(_) => "no_mappings",
            Self::SourceExport(_) => "source_export",
            Self::SourceParse(_) => "source_parse",
            Self::Timestamp(_) => "timestamp",
            Self::Sink { .. } => "sink",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
