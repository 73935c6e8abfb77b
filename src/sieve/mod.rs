//! The retention sieve.
//!
//! A [`Sieve`] holds one [`Bucket`] per [`Granularity`]. Every timestamp
//! offered to the sieve is offered to every bucket; it is kept if at least one
//! bucket still had room for its slot. Fed newest first, this keeps the most
//! recent item of each of the last N minutes, hours, days, weeks, months and
//! years: the grandfather-father-son rotation scheme.
//!
//! # Entry points
//!
//! | Entry point | Input order | Use |
//! |-------------|-------------|-----|
//! | [`Sieve::add`] | caller's responsibility | building block, any order accepted |
//! | [`StreamSieve::push`] | checked, newest first | unbounded streams, constant memory |
//! | [`sieve_by`] / [`try_sieve_by`] / [`partition_by`] | any, sorted internally | in-memory collections |
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use datesieve::{RetentionPolicy, Sieve};
//!
//! let policy = RetentionPolicy::new().with_days(2);
//! let mut sieve = Sieve::new(&policy);
//!
//! let ts = |d, h| NaiveDate::from_ymd_opt(2018, 10, d).unwrap().and_hms_opt(h, 0, 0).unwrap();
//!
//! assert!(sieve.add(&ts(10, 6)));
//! assert!(!sieve.add(&ts(10, 5))); // same day, already represented
//! assert!(sieve.add(&ts(9, 23)));
//! assert!(!sieve.add(&ts(8, 23))); // only two days are kept
//! ```

mod batch;
mod bucket;
mod granularity;
mod policy;
mod stream;

pub use batch::{Partition, partition_by, sieve_by, try_sieve_by};
pub use bucket::Bucket;
pub use granularity::{Granularity, SlotKey, WeekNumbering};
pub use policy::RetentionPolicy;
pub use stream::{SieveReport, StreamSieve};

use chrono::{Datelike, Timelike};
use std::fmt;

/// Set of granularities that admitted a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Admission(u8);

impl Admission {
    /// Returns `true` if any granularity admitted the timestamp.
    #[must_use]
    pub const fn is_kept(self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if `granularity` admitted the timestamp.
    #[must_use]
    pub const fn contains(self, granularity: Granularity) -> bool {
        self.0 & (1 << granularity.index()) != 0
    }

    /// Granularities that admitted the timestamp, finest first.
    pub fn granularities(self) -> impl Iterator<Item = Granularity> {
        Granularity::all()
            .iter()
            .copied()
            .filter(move |g| self.contains(*g))
    }

    const fn with(self, granularity: Granularity) -> Self {
        Self(self.0 | (1 << granularity.index()))
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_kept() {
            return write!(f, "dropped");
        }
        let names: Vec<&str> = self.granularities().map(|g| g.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// One bucket per granularity and the keep rule across them.
///
/// Timestamps must be added newest first for the sieve to keep the most
/// recent item per slot. [`Sieve::add`] does not check this; use
/// [`StreamSieve`] for a checked stream or [`sieve_by`] to sort first.
#[derive(Debug, Clone)]
pub struct Sieve {
    policy: RetentionPolicy,
    buckets: Vec<Bucket>,
}

impl Sieve {
    /// Creates a fresh sieve with one bucket per granularity.
    #[must_use]
    pub fn new(policy: &RetentionPolicy) -> Self {
        let buckets = Granularity::all()
            .iter()
            .map(|g| Bucket::new(*g, policy.capacity(*g), policy.week_numbering()))
            .collect();
        Self {
            policy: *policy,
            buckets,
        }
    }

    /// Offers `ts` to every bucket and returns `true` if any admitted it.
    pub fn add<T>(&mut self, ts: &T) -> bool
    where
        T: Datelike + Timelike,
    {
        self.admit(ts).is_kept()
    }

    /// Offers `ts` to every bucket and reports which ones admitted it.
    ///
    /// Every bucket is evaluated, so a timestamp that claims slots in several
    /// granularities consumes capacity in each of them.
    pub fn admit<T>(&mut self, ts: &T) -> Admission
    where
        T: Datelike + Timelike,
    {
        self.buckets
            .iter_mut()
            .fold(Admission::default(), |admission, bucket| {
                if bucket.add(ts) {
                    admission.with(bucket.granularity())
                } else {
                    admission
                }
            })
    }

    /// Returns `true` once no bucket can admit anything more.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.buckets.iter().all(Bucket::is_exhausted)
    }

    /// Restores every bucket to its initial state.
    pub fn reset(&mut self) {
        self.buckets.iter_mut().for_each(Bucket::reset);
    }

    /// Bucket for `granularity`.
    #[must_use]
    pub fn bucket(&self, granularity: Granularity) -> &Bucket {
        &self.buckets[granularity.index()]
    }

    /// All buckets, finest first.
    #[must_use]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Policy this sieve was built from.
    #[must_use]
    pub const fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }
}
