//! Event sources: NDJSON event log reader and ground-truth labels.
//! Shared event type consumed by the detector.

mod events;
mod labels;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

pub use events::{parse_timestamp, EventReader, SourceStats};
pub use labels::GroundTruth;

/// One categorical action performed by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: String,
    pub action: String,
    /// Offset as written in the source
    pub ts: DateTime<FixedOffset>,
}

impl Event {
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        ts: impl Into<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
            ts: ts.into(),
        }
    }

    /// Calendar day in the timestamp's own offset, not converted to UTC
    pub fn day(&self) -> NaiveDate {
        self.ts.date_naive()
    }
}
