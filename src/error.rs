//! Error types for the chart pipeline.
//!
//! Nothing in the repaint path returns these: a repaint that cannot happen is
//! skipped and retried on the next tick. Errors only surface at construction
//! boundaries and at the human input boundary (timestamp parsing).

use thiserror::Error;

use crate::time::{TimeRange, Timestamp};

/// Invalid bounds passed to [`TimeRange::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    /// The start is after the end.
    #[error("time range start {start} is after its end {end}")]
    Reversed {
        /// Requested start.
        start: Timestamp,
        /// Requested end.
        end: Timestamp,
    },
    /// One of the bounds is negative.
    #[error("time range bounds must not be negative ({start}, {end})")]
    Negative {
        /// Requested start.
        start: Timestamp,
        /// Requested end.
        end: Timestamp,
    },
}

/// Failure to turn a human-entered string into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampParseError {
    /// The string does not follow the expected format.
    #[error("unparseable timestamp {0:?}")]
    Unparseable(String),
    /// The string is a valid timestamp, but outside the project range.
    #[error("timestamp {timestamp} is outside of {range}")]
    OutOfRange {
        /// Parsed timestamp.
        timestamp: Timestamp,
        /// Range the timestamp was checked against.
        range: TimeRange,
    },
}

/// Errors raised while setting up chart widgets.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The background render worker could not be started.
    #[error("failed to spawn render worker for {provider}")]
    WorkerSpawn {
        /// Provider the worker was meant to serve.
        provider: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
