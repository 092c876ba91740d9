//! Error types for the fallible edges of the crate
//!
//! The engine itself is total; only parsing, persistence and report
//! writing can fail.

use thiserror::Error;

/// Unknown sharing model tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sharing model '{0}' (expected sliding, progressive, flat or roi_tiered)")]
pub struct ModelParseError(pub String);

/// Failures of a record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("report I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
