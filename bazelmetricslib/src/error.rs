//! Error types for bazelmetricslib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a scan or a report write.
///
/// Per-file problems during a walk never surface here: unreadable entries
/// and manifests are skipped and logged instead.
#[derive(Error, Debug)]
pub enum BazelMetricsError {
    /// Repository root does not exist
    #[error("repository path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The repository root could not be enumerated
    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// A manifest rule pattern failed to compile
    #[error("invalid rule pattern for '{rule}': {source}")]
    Pattern { rule: String, source: regex::Error },

    /// The report could not be serialized
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The report could not be written
    #[error("failed to write report to '{path}': {source}")]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An external command could not be started
    #[error("failed to run '{command}': {source}")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
