//! Order-checked streaming entry point.

use super::{Admission, Granularity, RetentionPolicy, Sieve};
use crate::{Error, Result};
use chrono::{Datelike, Timelike};
use std::collections::BTreeMap;
use std::fmt;

/// Counters for one sieve run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SieveReport {
    /// Items offered to the sieve.
    pub checked: usize,
    /// Items kept.
    pub kept: usize,
    /// Items dropped.
    pub dropped: usize,
    /// Kept items per admitting granularity. An item admitted by several
    /// granularities counts once for each.
    pub by_granularity: BTreeMap<Granularity, usize>,
    /// Wall time of the run in milliseconds, when measured by the caller.
    pub duration_ms: u64,
}

impl SieveReport {
    /// Records the outcome for one item.
    pub fn record(&mut self, admission: Admission) {
        self.checked += 1;
        if admission.is_kept() {
            self.kept += 1;
        } else {
            self.dropped += 1;
        }
        for granularity in admission.granularities() {
            *self.by_granularity.entry(granularity).or_insert(0) += 1;
        }
    }

    /// Returns a one-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.checked == 0 {
            return format!("No items to sieve ({}ms)", self.duration_ms);
        }
        let breakdown: Vec<String> = self
            .by_granularity
            .iter()
            .map(|(g, count)| format!("{g}: {count}"))
            .collect();
        let breakdown = if breakdown.is_empty() {
            String::new()
        } else {
            format!(" ({})", breakdown.join(", "))
        };
        format!(
            "Kept {} of {} items{}, dropped {} in {}ms",
            self.kept, self.checked, breakdown, self.dropped, self.duration_ms
        )
    }
}

/// A [`Sieve`] fed one item at a time, newest first.
///
/// Unlike [`Sieve::add`], [`StreamSieve::push`] rejects a timestamp newer
/// than its predecessor instead of silently keeping the wrong representative.
/// Memory stays bounded by the policy's total capacity no matter how long the
/// stream is.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use datesieve::{Error, RetentionPolicy, StreamSieve};
///
/// let ts = |d| NaiveDate::from_ymd_opt(2018, 10, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut stream = StreamSieve::new(&RetentionPolicy::new().with_days(7));
///
/// assert!(stream.push(ts(10))?);
/// assert!(stream.push(ts(9))?);
/// assert!(matches!(stream.push(ts(11)), Err(Error::OutOfOrder { .. })));
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StreamSieve<T> {
    sieve: Sieve,
    last: Option<T>,
    check_order: bool,
    report: SieveReport,
}

impl<T> StreamSieve<T>
where
    T: Datelike + Timelike + Ord + fmt::Display,
{
    /// Creates an order-checked stream.
    #[must_use]
    pub fn new(policy: &RetentionPolicy) -> Self {
        Self {
            sieve: Sieve::new(policy),
            last: None,
            check_order: true,
            report: SieveReport::default(),
        }
    }

    /// Creates a stream that accepts any order, like [`Sieve::add`].
    #[must_use]
    pub fn unchecked(policy: &RetentionPolicy) -> Self {
        Self {
            check_order: false,
            ..Self::new(policy)
        }
    }

    /// Offers the next timestamp and returns `true` if it is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfOrder`] if `ts` is newer than the previous
    /// timestamp; the sieve is left untouched.
    pub fn push(&mut self, ts: T) -> Result<bool> {
        self.push_admission(ts).map(Admission::is_kept)
    }

    /// Offers the next timestamp and reports which granularities kept it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfOrder`] if `ts` is newer than the previous
    /// timestamp; the sieve is left untouched.
    pub fn push_admission(&mut self, ts: T) -> Result<Admission> {
        if self.check_order {
            if let Some(previous) = self.last.as_ref().filter(|previous| ts > **previous) {
                return Err(Error::OutOfOrder {
                    previous: previous.to_string(),
                    current: ts.to_string(),
                });
            }
        }
        let admission = self.sieve.admit(&ts);
        self.report.record(admission);
        self.last = Some(ts);
        Ok(admission)
    }

    /// Counters so far.
    #[must_use]
    pub const fn report(&self) -> &SieveReport {
        &self.report
    }

    /// Underlying sieve.
    #[must_use]
    pub const fn sieve(&self) -> &Sieve {
        &self.sieve
    }

    /// Consumes the stream and returns its counters.
    #[must_use]
    pub fn into_report(self) -> SieveReport {
        self.report
    }
}
