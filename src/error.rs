// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the whole run. Per-file problems are not errors:
/// they travel through the totals as [`crate::stats::SkipReason`] values.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("path '{0}' does not exist")]
    PathNotFound(PathBuf),

    #[error("failed to load language definitions from '{path}': {details}")]
    RegistryLoad { path: PathBuf, details: String },

    #[error("invalid exclude pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("thread pool creation failed: {0}")]
    ThreadPool(String),

    #[error("failed to write report: {0}")]
    ReportWrite(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
