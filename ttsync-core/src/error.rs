//! Error types for ttsync.

use thiserror::Error;

/// Errors that can occur while reconciling a timetable with a calendar.
#[derive(Error, Debug)]
pub enum TtSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote event (or its recurrence) could not be turned back into a series.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    /// An upstream collaborator handed over a collection that breaks the
    /// one-series-per-group guarantee. Results of the run cannot be trusted.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Remote calendar error: {0}")]
    Remote(String),

    #[error("Timetable error: {0}")]
    Timetable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ttsync operations.
pub type TtSyncResult<T> = Result<T, TtSyncError>;
