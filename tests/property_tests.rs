//! Property-based tests for the retention sieve.
//!
//! Uses proptest to verify invariants across random inputs:
//! - A bucket never exceeds its capacity
//! - A bucket's remaining capacity never increases
//! - Sieving is deterministic and idempotent
//! - Raising a capacity never drops a previously kept item
//! - Each granularity keeps at most one item per slot, the newest one
//! - A zero-capacity granularity admits nothing and changes nothing
//! - Streaming newest-first input matches the sorting entry point

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use datesieve::{Bucket, Granularity, RetentionPolicy, Sieve, StreamSieve, WeekNumbering, sieve_by};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2015, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Timestamps spread over roughly three years, with repeats at every
/// granularity.
fn timestamps() -> impl Strategy<Value = Vec<NaiveDateTime>> {
    prop::collection::vec(
        prop_oneof![
            (0i64..3 * 365 * 86_400).prop_map(|s| base() + TimeDelta::seconds(s)),
            (0i64..2_000).prop_map(|m| base() + TimeDelta::minutes(m * 7)),
        ],
        0..150,
    )
}

fn week_numbering() -> impl Strategy<Value = WeekNumbering> {
    prop_oneof![Just(WeekNumbering::Iso), Just(WeekNumbering::Monday)]
}

fn policy() -> impl Strategy<Value = RetentionPolicy> {
    (prop::array::uniform7(0usize..6), week_numbering()).prop_map(|(capacities, weeks)| {
        Granularity::all()
            .iter()
            .zip(capacities)
            .fold(RetentionPolicy::new(), |policy, (g, c)| policy.with_capacity(*g, c))
            .with_week_numbering(weeks)
    })
}

fn granularity() -> impl Strategy<Value = Granularity> {
    prop::sample::select(Granularity::all().to_vec())
}

fn descending(mut timestamps: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
    timestamps.sort_by(|a, b| b.cmp(a));
    timestamps
}

proptest! {
    /// Property: a single-granularity sieve keeps `min(capacity, distinct slots)` items.
    #[test]
    fn prop_capacity_bound(
        items in timestamps(),
        g in granularity(),
        capacity in 0usize..10,
        weeks in week_numbering(),
    ) {
        let policy = RetentionPolicy::new()
            .with_capacity(g, capacity)
            .with_week_numbering(weeks);
        let distinct: HashSet<_> = items.iter().map(|ts| g.slot_key(ts, weeks)).collect();

        let kept = sieve_by(items, |ts| *ts, &policy);

        prop_assert_eq!(kept.len(), capacity.min(distinct.len()));
    }

    /// Property: the same input and policy give the same output.
    #[test]
    fn prop_deterministic(items in timestamps(), policy in policy()) {
        let first = sieve_by(items.clone(), |ts| *ts, &policy);
        let second = sieve_by(items, |ts| *ts, &policy);
        prop_assert_eq!(first, second);
    }

    /// Property: sieving the kept items again keeps all of them.
    #[test]
    fn prop_idempotent(items in timestamps(), policy in policy()) {
        let once = sieve_by(items, |ts| *ts, &policy);
        let twice = sieve_by(once.clone(), |ts| *ts, &policy);
        prop_assert_eq!(once, twice);
    }

    /// Property: a bucket's remaining capacity only ever goes down, by one
    /// per admitted slot, in any input order.
    #[test]
    fn prop_bucket_capacity_monotonic(
        items in timestamps(),
        g in granularity(),
        capacity in 0usize..20,
        weeks in week_numbering(),
    ) {
        let mut bucket = Bucket::new(g, capacity, weeks);
        let mut previous = bucket.capacity();

        for ts in &items {
            let admitted = bucket.add(ts);

            prop_assert!(bucket.capacity() <= previous);
            prop_assert_eq!(bucket.capacity() + usize::from(admitted), previous);
            prop_assert_eq!(bucket.len() + bucket.capacity(), bucket.initial_capacity());
            prop_assert!(bucket.len() <= bucket.initial_capacity());
            previous = bucket.capacity();
        }
    }

    /// Property: raising one capacity keeps a superset.
    #[test]
    fn prop_raising_capacity_keeps_superset(
        items in timestamps(),
        policy in policy(),
        g in granularity(),
        extra in 1usize..4,
    ) {
        let larger = policy.with_capacity(g, policy.capacity(g) + extra);

        let small: BTreeSet<_> = sieve_by(items.clone(), |ts| *ts, &policy).into_iter().collect();
        let large: BTreeSet<_> = sieve_by(items, |ts| *ts, &larger).into_iter().collect();

        prop_assert!(small.is_subset(&large));
    }

    /// Property: each granularity admits one item per slot, and it is the
    /// newest item of that slot.
    #[test]
    fn prop_slot_exclusivity(items in timestamps(), policy in policy()) {
        let items = descending(items);
        let mut sieve = Sieve::new(&policy);
        let admissions: Vec<_> = items.iter().map(|ts| sieve.admit(ts)).collect();

        for g in Granularity::all().iter().copied() {
            let weeks = policy.week_numbering();
            let mut slots = HashSet::new();
            for (ts, admission) in items.iter().zip(&admissions) {
                if !admission.contains(g) {
                    continue;
                }
                let slot = g.slot_key(ts, weeks);
                prop_assert!(slots.insert(slot), "{} admitted twice for {}", g, slot);
                let newest = items.iter().find(|other| g.slot_key(*other, weeks) == slot);
                prop_assert_eq!(newest, Some(ts));
            }
        }
    }

    /// Property: a granularity set to zero never admits, and the other
    /// buckets keep exactly what they kept before.
    #[test]
    fn prop_zero_capacity_inert(items in timestamps(), policy in policy(), g in granularity()) {
        let items = descending(items);
        let zeroed = policy.with_capacity(g, 0);

        let mut sieve = Sieve::new(&zeroed);
        for ts in &items {
            prop_assert!(!sieve.admit(ts).contains(g));
        }

        let mut original = Sieve::new(&policy);
        let kept_by_others: Vec<NaiveDateTime> = items
            .iter()
            .copied()
            .filter(|ts| original.admit(ts).granularities().any(|other| other != g))
            .collect();
        prop_assert_eq!(sieve_by(items, |ts| *ts, &zeroed), kept_by_others);
    }

    /// Property: streaming sorted input matches the sorting entry point.
    #[test]
    fn prop_stream_matches_batch(items in timestamps(), policy in policy()) {
        let items = descending(items);
        let mut stream = StreamSieve::new(&policy);
        let streamed: Vec<NaiveDateTime> = items
            .iter()
            .copied()
            .filter(|ts| stream.push(*ts).unwrap())
            .collect();

        prop_assert_eq!(streamed.len(), stream.report().kept);
        prop_assert_eq!(streamed, sieve_by(items, |ts| *ts, &policy));
    }

    /// Property: nothing is kept beyond the policy's total capacity.
    #[test]
    fn prop_total_capacity_bound(items in timestamps(), policy in policy()) {
        let kept = sieve_by(items, |ts| *ts, &policy);
        prop_assert!(kept.len() <= policy.total_capacity());
    }
}
