//! `[retention]` section: capacities as the user wrote them.

use crate::sieve::{Granularity, RetentionPolicy, WeekNumbering};
use crate::{Error, Result};
use serde::Deserialize;

/// Unvalidated retention settings.
///
/// Values stay signed until [`RetentionSettings::to_policy`] so that a
/// negative number is reported as a configuration error instead of being
/// rejected by the TOML parser with a less helpful message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionSettings {
    /// Distinct seconds to keep.
    pub seconds: Option<i64>,
    /// Distinct minutes to keep.
    pub minutes: Option<i64>,
    /// Distinct hours to keep.
    pub hours: Option<i64>,
    /// Distinct days to keep.
    pub days: Option<i64>,
    /// Distinct weeks to keep.
    pub weeks: Option<i64>,
    /// Distinct months to keep.
    pub months: Option<i64>,
    /// Distinct years to keep.
    pub years: Option<i64>,
    /// Week numbering: `iso` or `monday`.
    pub week_numbering: Option<String>,
}

impl RetentionSettings {
    /// Value configured for `granularity`, if any.
    #[must_use]
    pub const fn get(&self, granularity: Granularity) -> Option<i64> {
        match granularity {
            Granularity::Second => self.seconds,
            Granularity::Minute => self.minutes,
            Granularity::Hour => self.hours,
            Granularity::Day => self.days,
            Granularity::Week => self.weeks,
            Granularity::Month => self.months,
            Granularity::Year => self.years,
        }
    }

    /// Sets the value for `granularity`.
    pub const fn set(&mut self, granularity: Granularity, value: Option<i64>) {
        let slot = match granularity {
            Granularity::Second => &mut self.seconds,
            Granularity::Minute => &mut self.minutes,
            Granularity::Hour => &mut self.hours,
            Granularity::Day => &mut self.days,
            Granularity::Week => &mut self.weeks,
            Granularity::Month => &mut self.months,
            Granularity::Year => &mut self.years,
        };
        *slot = value;
    }

    /// Returns `self` with every value present in `other` replacing its own.
    #[must_use]
    pub fn overlay(mut self, other: &Self) -> Self {
        for granularity in Granularity::all().iter().copied() {
            if let Some(value) = other.get(granularity) {
                self.set(granularity, Some(value));
            }
        }
        if let Some(weeks) = &other.week_numbering {
            self.week_numbering = Some(weeks.clone());
        }
        self
    }

    /// Returns `true` if no capacity is set.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        Granularity::all().iter().all(|g| self.get(*g).is_none())
    }

    /// Validates the settings into a policy. Unset capacities are zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for negative capacities or an
    /// unknown week numbering.
    pub fn to_policy(&self) -> Result<RetentionPolicy> {
        let weeks = match self.week_numbering.as_deref() {
            None => WeekNumbering::default(),
            Some(name) => WeekNumbering::parse(name).ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "unknown week numbering {name:?} (expected \"iso\" or \"monday\")"
                ))
            })?,
        };
        let capacities = Granularity::all()
            .iter()
            .filter_map(|g| self.get(*g).map(|value| (*g, value)));
        Ok(RetentionPolicy::from_signed(capacities)?.with_week_numbering(weeks))
    }
}
