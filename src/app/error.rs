// src/app/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between fetching the schedule and opening the sheet.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Transport failure, timeout or non-2xx status.
    #[error("request failed: {0}")]
    Network(String),

    /// Body was not JSON, or not the schedule shape we expect.
    #[error("failed to parse schedule: {0}")]
    Parse(String),

    /// The schedule parsed but lists no showing dates.
    #[error("schedule has no showing dates")]
    NoData,

    #[error("cannot build document: {0}")]
    DocumentBuild(String),

    #[error("cannot open {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}
