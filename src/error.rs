//! Error types for the detector.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration rejected at startup
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// One input record could not be turned into an event
    #[error("malformed event on line {line}: {reason}")]
    MalformedEvent { line: usize, reason: String },

    #[error("malformed label on line {line}: {reason}")]
    MalformedLabel { line: usize, reason: String },

    /// Event earlier than the day currently open for its user
    #[error("out-of-order event for user {user_id}: {day} precedes open day {current_day}")]
    OutOfOrder {
        user_id: String,
        day: NaiveDate,
        current_day: NaiveDate,
    },

    /// Both compared profiles have zero total actions
    #[error("dissimilarity limit is zero: compared profiles carry no actions")]
    EmptyProfile,
}

impl DetectorError {
    /// Per-record failures: skip the record, keep the stream going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DetectorError::MalformedEvent { .. } | DetectorError::OutOfOrder { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;
