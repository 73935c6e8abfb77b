//! Sort-then-sieve entry points for in-memory collections.

use super::{RetentionPolicy, Sieve, SieveReport};
use crate::{Error, Result};
use chrono::{Datelike, Timelike};
use std::fmt;
use tracing::debug;

/// Outcome of [`partition_by`]: both halves, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    /// Items the policy retains.
    pub kept: Vec<T>,
    /// Items the policy discards.
    pub dropped: Vec<T>,
    /// Counters for the run.
    pub report: SieveReport,
}

impl<T> Default for Partition<T> {
    fn default() -> Self {
        Self {
            kept: Vec::new(),
            dropped: Vec::new(),
            report: SieveReport::default(),
        }
    }
}

/// Returns the items `policy` retains, newest first.
///
/// The input is sorted by `key` descending (stable, so items with equal
/// timestamps stay in input order) and run through a fresh [`Sieve`].
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use datesieve::{RetentionPolicy, sieve_by};
///
/// let backups = vec![
///     ("a.tar", NaiveDate::from_ymd_opt(2018, 10, 8).unwrap().and_hms_opt(22, 0, 1).unwrap()),
///     ("b.tar", NaiveDate::from_ymd_opt(2018, 10, 10).unwrap().and_hms_opt(6, 0, 2).unwrap()),
///     ("c.tar", NaiveDate::from_ymd_opt(2018, 10, 10).unwrap().and_hms_opt(5, 0, 2).unwrap()),
/// ];
///
/// let kept = sieve_by(backups, |(_, ts)| *ts, &RetentionPolicy::new().with_days(2));
/// let names: Vec<&str> = kept.iter().map(|(name, _)| *name).collect();
/// assert_eq!(names, vec!["b.tar", "a.tar"]);
/// ```
pub fn sieve_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F, policy: &RetentionPolicy) -> Vec<T>
where
    F: FnMut(&T) -> K,
    K: Datelike + Timelike + Ord,
{
    retain_sorted(items.into_iter().map(with_key(key)).collect(), policy)
}

/// Like [`sieve_by`], with a fallible key function.
///
/// All keys are extracted before a sieve is built, so a failing key leaves
/// no partial state behind.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyExtraction`] for the first item whose key
/// cannot be extracted.
pub fn try_sieve_by<T, K, E, F>(
    items: impl IntoIterator<Item = T>,
    mut key: F,
    policy: &RetentionPolicy,
) -> Result<Vec<T>>
where
    F: FnMut(&T) -> std::result::Result<K, E>,
    E: fmt::Display,
    K: Datelike + Timelike + Ord,
{
    let keyed = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match key(&item) {
            Ok(ts) => Ok((ts, item)),
            Err(e) => Err(Error::InvalidKeyExtraction {
                index,
                cause: e.to_string(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(retain_sorted(keyed, policy))
}

/// Splits the items into kept and dropped halves, both newest first.
pub fn partition_by<T, K, F>(
    items: impl IntoIterator<Item = T>,
    key: F,
    policy: &RetentionPolicy,
) -> Partition<T>
where
    F: FnMut(&T) -> K,
    K: Datelike + Timelike + Ord,
{
    let keyed = keyed_descending(items.into_iter().map(with_key(key)).collect());
    let mut sieve = Sieve::new(policy);
    let mut partition = Partition {
        kept: Vec::with_capacity(policy.total_capacity().min(keyed.len())),
        dropped: Vec::new(),
        report: SieveReport::default(),
    };
    for (ts, item) in keyed {
        let admission = sieve.admit(&ts);
        partition.report.record(admission);
        if admission.is_kept() {
            partition.kept.push(item);
        } else {
            partition.dropped.push(item);
        }
    }
    debug!(
        kept = partition.kept.len(),
        dropped = partition.dropped.len(),
        %policy,
        "Partitioned batch"
    );
    partition
}

fn with_key<T, K, F>(mut key: F) -> impl FnMut(T) -> (K, T)
where
    F: FnMut(&T) -> K,
{
    move |item| (key(&item), item)
}

fn retain_sorted<K, T>(keyed: Vec<(K, T)>, policy: &RetentionPolicy) -> Vec<T>
where
    K: Datelike + Timelike + Ord,
{
    let keyed = keyed_descending(keyed);
    let total = keyed.len();
    let mut sieve = Sieve::new(policy);
    let kept: Vec<T> = keyed
        .into_iter()
        .filter_map(|(ts, item)| sieve.add(&ts).then_some(item))
        .collect();
    debug!(total, kept = kept.len(), %policy, "Sieved batch");
    kept
}

fn keyed_descending<K: Ord, T>(mut keyed: Vec<(K, T)>) -> Vec<(K, T)> {
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed
}
