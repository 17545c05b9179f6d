//! Error types for schedcal.

use thiserror::Error;

/// Errors that can occur while loading, picking or exporting a schedule.
#[derive(Error, Debug)]
pub enum SchedError {
    /// The markup does not have the expected day tables, rows or cells,
    /// or a date/time label does not parse.
    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),

    #[error("Could not fetch schedule: {0}")]
    Fetch(String),

    /// The calendar service rejected a call (auth, quota, network).
    #[error("Calendar service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        SchedError::MalformedSchedule(msg.into())
    }
}

/// Result type alias for schedcal operations.
pub type SchedResult<T> = Result<T, SchedError>;
