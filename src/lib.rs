//! # datesieve
//!
//! Thin out timestamped items with grandfather-father-son retention quotas.
//!
//! Given a set of timestamps and a policy such as "keep the newest item of
//! each of the last 7 days, 4 weeks and 12 months", datesieve decides which
//! items to keep. It never deletes anything itself: callers get the kept
//! (and, if they ask, the dropped) items back and act on them.
//!
//! ## Features
//!
//! - Seven granularities: seconds, minutes, hours, days, weeks, months, years
//! - Explicit week numbering (ISO 8601 or `%W`-compatible)
//! - Batch entry points that sort for you ([`sieve_by`], [`partition_by`])
//! - Order-checked streaming in constant memory ([`StreamSieve`])
//! - A line-oriented CLI with strict or fuzzy date parsing
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use datesieve::{RetentionPolicy, sieve_by};
//!
//! let snapshots: Vec<_> = (1..=30)
//!     .map(|d| NaiveDate::from_ymd_opt(2018, 9, d).unwrap().and_hms_opt(22, 0, 0).unwrap())
//!     .collect();
//!
//! let policy = RetentionPolicy::new().with_days(3).with_weeks(2);
//! let kept = sieve_by(snapshots, |ts| *ts, &policy);
//!
//! // Sep 30, 29, 28 for the days, plus the newest of the week before.
//! assert_eq!(kept.len(), 4);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod input;
pub mod observability;
pub mod sieve;

// Re-exports for convenience
pub use config::DatesieveConfig;
pub use input::{DateParser, DatedLine, LineReader};
pub use sieve::{
    Admission, Bucket, Granularity, Partition, RetentionPolicy, Sieve, SieveReport, SlotKey,
    StreamSieve, WeekNumbering, partition_by, sieve_by, try_sieve_by,
};

/// Error type for datesieve operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidConfiguration` | Negative capacities, unknown names, malformed config file |
/// | `InvalidKeyExtraction` | A caller-supplied key function fails for an item |
/// | `OutOfOrder` | A stream receives a timestamp newer than its predecessor |
/// | `UnparseableTimestamp` | An input line carries no recognizable timestamp |
/// | `OperationFailed` | I/O errors, log file or subscriber setup failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The retention policy or configuration is invalid.
    ///
    /// Raised when:
    /// - A capacity is negative
    /// - A granularity or week-numbering name is unknown
    /// - A config file cannot be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A key function could not produce a timestamp.
    #[error("cannot extract timestamp from item {index}: {cause}")]
    InvalidKeyExtraction {
        /// Position of the item in the input.
        index: usize,
        /// The key function's error message.
        cause: String,
    },

    /// Streaming input was not newest first.
    #[error("input is not in descending order: {current} follows {previous}")]
    OutOfOrder {
        /// The timestamp accepted before.
        previous: String,
        /// The newer timestamp that was rejected.
        current: String,
    },

    /// An input line could not be parsed.
    #[error("line {line_number}: cannot parse timestamp from {line:?}: {cause}")]
    UnparseableTimestamp {
        /// One-based line number.
        line_number: usize,
        /// The offending line, without its line terminator.
        line: String,
        /// Why parsing failed.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Reading input or writing output fails
    /// - The config file cannot be read
    /// - The log file cannot be opened or the subscriber is already set
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for datesieve operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfiguration("days must be non-negative".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: days must be non-negative"
        );

        let err = Error::InvalidKeyExtraction {
            index: 3,
            cause: "premature end of input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot extract timestamp from item 3: premature end of input"
        );

        let err = Error::UnparseableTimestamp {
            line_number: 7,
            line: "hello".to_string(),
            cause: "no date found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 7: cannot parse timestamp from \"hello\": no date found"
        );

        let err = Error::OperationFailed {
            operation: "read_input".to_string(),
            cause: "broken pipe".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'read_input' failed: broken pipe");
    }
}
