//! Single-granularity quota tracker.

use super::granularity::{Granularity, SlotKey, WeekNumbering};
use chrono::{Datelike, Timelike};
use std::collections::HashSet;

/// Tracks which slots of one granularity have been claimed.
///
/// A bucket admits a timestamp when its slot is still free and the bucket
/// has capacity left. Admission is first come, first served: the first
/// timestamp offered for a slot claims it, which is why callers feed
/// timestamps newest first.
#[derive(Debug, Clone)]
pub struct Bucket {
    granularity: Granularity,
    weeks: WeekNumbering,
    initial_capacity: usize,
    capacity: usize,
    seen: HashSet<SlotKey>,
}

impl Bucket {
    /// Creates an empty bucket.
    #[must_use]
    pub fn new(granularity: Granularity, capacity: usize, weeks: WeekNumbering) -> Self {
        Self {
            granularity,
            weeks,
            initial_capacity: capacity,
            capacity,
            seen: HashSet::with_capacity(capacity.min(1024)),
        }
    }

    /// Tries to claim the slot of `ts`.
    ///
    /// Returns `false` without side effects when the bucket is exhausted or
    /// the slot is already claimed.
    pub fn add<T>(&mut self, ts: &T) -> bool
    where
        T: Datelike + Timelike,
    {
        if self.capacity == 0 {
            return false;
        }
        let key = self.granularity.slot_key(ts, self.weeks);
        if !self.seen.insert(key) {
            return false;
        }
        self.capacity -= 1;
        true
    }

    /// Restores the initial capacity and forgets all claimed slots.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.capacity = self.initial_capacity;
    }

    /// Granularity of this bucket.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Remaining number of slots this bucket may claim.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Capacity the bucket was created with.
    #[must_use]
    pub const fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Number of claimed slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if no slot has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Returns `true` once the bucket cannot claim any more slots.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.capacity == 0
    }

    /// Returns `true` if the bucket was created with zero capacity.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.initial_capacity == 0
    }

    /// Returns `true` if `key` has been claimed.
    #[must_use]
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.seen.contains(key)
    }

    /// Claimed slots, in no particular order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotKey> {
        self.seen.iter()
    }
}
