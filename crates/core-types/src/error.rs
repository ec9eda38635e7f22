use chrono::{DateTime, Utc};
use thiserror::Error;

/// Input validation failures. These are fatal and are reported before any
/// processing starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Bar {index} at {timestamp} violates the OHLC invariant: {reason}")]
    InvalidBar {
        index: usize,
        timestamp: DateTime<Utc>,
        reason: String,
    },

    #[error("Duplicate bar timestamp {0}")]
    DuplicateTimestamp(DateTime<Utc>),
}
