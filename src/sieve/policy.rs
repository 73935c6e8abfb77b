//! Retention policy: how many slots to keep per granularity.

use super::granularity::{Granularity, WeekNumbering};
use crate::{Error, Result};
use std::fmt;

/// Per-granularity capacities plus the week-numbering rule.
///
/// A capacity of zero disables its granularity.
///
/// # Example
///
/// ```rust
/// use datesieve::{Granularity, RetentionPolicy};
///
/// let policy = RetentionPolicy::new()
///     .with_days(7)
///     .with_weeks(4)
///     .with_capacity(Granularity::Month, 12);
///
/// assert_eq!(policy.capacity(Granularity::Week), 4);
/// assert_eq!(policy.total_capacity(), 23);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetentionPolicy {
    capacities: [usize; Granularity::COUNT],
    weeks: WeekNumbering,
}

impl RetentionPolicy {
    /// Creates a policy that keeps nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capacities: [0; Granularity::COUNT],
            weeks: WeekNumbering::Iso,
        }
    }

    /// Builds a policy from signed capacities, as read from user input.
    ///
    /// Granularities not mentioned keep capacity zero; later entries for the
    /// same granularity override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if any capacity is negative or
    /// does not fit in `usize`.
    pub fn from_signed<I>(capacities: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Granularity, i64)>,
    {
        capacities
            .into_iter()
            .try_fold(Self::new(), |policy, (granularity, value)| {
                let capacity = usize::try_from(value).map_err(|_| {
                    Error::InvalidConfiguration(format!(
                        "capacity for {granularity} must be a non-negative integer, got {value}"
                    ))
                })?;
                Ok(policy.with_capacity(granularity, capacity))
            })
    }

    /// Sets the capacity of one granularity.
    #[must_use]
    pub const fn with_capacity(mut self, granularity: Granularity, capacity: usize) -> Self {
        self.capacities[granularity.index()] = capacity;
        self
    }

    /// Sets how many distinct seconds to keep.
    #[must_use]
    pub const fn with_seconds(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Second, capacity)
    }

    /// Sets how many distinct minutes to keep.
    #[must_use]
    pub const fn with_minutes(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Minute, capacity)
    }

    /// Sets how many distinct hours to keep.
    #[must_use]
    pub const fn with_hours(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Hour, capacity)
    }

    /// Sets how many distinct days to keep.
    #[must_use]
    pub const fn with_days(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Day, capacity)
    }

    /// Sets how many distinct weeks to keep.
    #[must_use]
    pub const fn with_weeks(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Week, capacity)
    }

    /// Sets how many distinct months to keep.
    #[must_use]
    pub const fn with_months(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Month, capacity)
    }

    /// Sets how many distinct years to keep.
    #[must_use]
    pub const fn with_years(self, capacity: usize) -> Self {
        self.with_capacity(Granularity::Year, capacity)
    }

    /// Sets the week-numbering rule.
    #[must_use]
    pub const fn with_week_numbering(mut self, weeks: WeekNumbering) -> Self {
        self.weeks = weeks;
        self
    }

    /// Capacity configured for `granularity`.
    #[must_use]
    pub const fn capacity(&self, granularity: Granularity) -> usize {
        self.capacities[granularity.index()]
    }

    /// Week-numbering rule.
    #[must_use]
    pub const fn week_numbering(&self) -> WeekNumbering {
        self.weeks
    }

    /// Sum of all capacities; an upper bound on the number of kept items.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.capacities.iter().fold(0, |acc, c| acc.saturating_add(*c))
    }

    /// Returns `true` if every granularity is disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capacities.iter().all(|c| *c == 0)
    }

    /// Granularities with a non-zero capacity, finest first.
    pub fn enabled(&self) -> impl Iterator<Item = (Granularity, usize)> + '_ {
        Granularity::all()
            .iter()
            .map(|g| (*g, self.capacity(*g)))
            .filter(|(_, c)| *c > 0)
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "keep nothing");
        }
        let parts: Vec<String> = self
            .enabled()
            .map(|(g, c)| format!("{g}={c}"))
            .collect();
        write!(f, "{} (weeks: {})", parts.join(" "), self.weeks)
    }
}
