//! Configuration errors
//!
//! Simulation code never fails at runtime; only loading and validating
//! author-time data (status templates, scenarios) can.

use std::path::PathBuf;
use thiserror::Error;

use super::status::StatusKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing status definitions: {0:?}")]
    MissingStatuses(Vec<StatusKind>),

    #[error("invalid status {kind:?}: {reason}")]
    InvalidStatus { kind: StatusKind, reason: String },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}
