//! Time granularities and their canonical slot keys.
//!
//! Every granularity collapses a timestamp into a [`SlotKey`]: two timestamps
//! with equal keys occupy the same slot and compete for a single place in the
//! granularity's bucket.
//!
//! # Week numbering
//!
//! Weeks are ambiguous near year boundaries, so the numbering scheme is
//! explicit:
//!
//! | Scheme | Year | Week | 2017-01-01 (Sun) | 2018-12-31 (Mon) |
//! |--------|------|------|------------------|------------------|
//! | [`WeekNumbering::Iso`] | ISO week-year | 1..=53, Monday start | `2016-W52` | `2019-W01` |
//! | [`WeekNumbering::Monday`] | calendar year | `%W`, 0..=53 | `2017-W00` | `2018-W53` |

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A time resolution used to bucket timestamps into slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One slot per calendar second.
    Second,
    /// One slot per calendar minute.
    Minute,
    /// One slot per hour of the day.
    Hour,
    /// One slot per calendar day.
    Day,
    /// One slot per week, see [`WeekNumbering`].
    Week,
    /// One slot per calendar month.
    Month,
    /// One slot per calendar year.
    Year,
}

impl Granularity {
    /// Number of granularities.
    pub const COUNT: usize = 7;

    /// Returns all granularities, finest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Second,
            Self::Minute,
            Self::Hour,
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Year,
        ]
    }

    /// Returns the plural name used in configuration and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "seconds",
            Self::Minute => "minutes",
            Self::Hour => "hours",
            Self::Day => "days",
            Self::Week => "weeks",
            Self::Month => "months",
            Self::Year => "years",
        }
    }

    /// Position of this granularity in [`Granularity::all`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parses a granularity from its singular or plural name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "second" | "seconds" | "s" => Some(Self::Second),
            "minute" | "minutes" | "min" => Some(Self::Minute),
            "hour" | "hours" | "h" => Some(Self::Hour),
            "day" | "days" | "d" => Some(Self::Day),
            "week" | "weeks" | "w" => Some(Self::Week),
            "month" | "months" => Some(Self::Month),
            "year" | "years" | "y" => Some(Self::Year),
            _ => None,
        }
    }

    /// Computes the slot this timestamp occupies at this granularity.
    ///
    /// Calendar fields are read as the timestamp carries them; a
    /// `DateTime<Tz>` is bucketed in its own timezone.
    #[must_use]
    pub fn slot_key<T>(self, ts: &T, weeks: WeekNumbering) -> SlotKey
    where
        T: Datelike + Timelike,
    {
        let year = ts.year();
        let month = ts.month();
        let day = ts.day();
        match self {
            Self::Second => SlotKey::Second {
                year,
                month,
                day,
                hour: ts.hour(),
                minute: ts.minute(),
                second: ts.second(),
            },
            Self::Minute => SlotKey::Minute {
                year,
                month,
                day,
                hour: ts.hour(),
                minute: ts.minute(),
            },
            Self::Hour => SlotKey::Hour {
                year,
                month,
                day,
                hour: ts.hour(),
            },
            Self::Day => SlotKey::Day { year, month, day },
            Self::Week => {
                let (year, week) = weeks.week_of(ts);
                SlotKey::Week { year, week }
            },
            Self::Month => SlotKey::Month { year, month },
            Self::Year => SlotKey::Year { year },
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Week-numbering rule used by the [`Granularity::Week`] bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekNumbering {
    /// ISO 8601: weeks start on Monday, week 1 contains the year's first
    /// Thursday, and the year is the ISO week-year.
    #[default]
    Iso,
    /// strftime `%W`: weeks start on Monday, days before the year's first
    /// Monday are week 0, and the year is the calendar year.
    Monday,
}

impl WeekNumbering {
    /// Returns the scheme name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iso => "iso",
            Self::Monday => "monday",
        }
    }

    /// Parses a scheme name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "iso" | "iso8601" | "%v" => Some(Self::Iso),
            "monday" | "legacy" | "%w" => Some(Self::Monday),
            _ => None,
        }
    }

    /// Returns `(year, week)` for a date under this scheme.
    #[must_use]
    pub fn week_of<T: Datelike>(self, date: &T) -> (i32, u32) {
        match self {
            Self::Iso => {
                let iso = date.iso_week();
                (iso.year(), iso.week())
            },
            Self::Monday => {
                let weekday = date.weekday().num_days_from_monday();
                (date.year(), (date.ordinal0() + 7 - weekday) / 7)
            },
        }
    }
}

impl fmt::Display for WeekNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical identity of a timestamp at one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKey {
    /// Truncated to the second.
    Second {
        /// Calendar year.
        year: i32,
        /// Month, 1..=12.
        month: u32,
        /// Day of month, 1..=31.
        day: u32,
        /// Hour, 0..=23.
        hour: u32,
        /// Minute, 0..=59.
        minute: u32,
        /// Second, 0..=59.
        second: u32,
    },
    /// Truncated to the minute.
    Minute {
        /// Calendar year.
        year: i32,
        /// Month, 1..=12.
        month: u32,
        /// Day of month, 1..=31.
        day: u32,
        /// Hour, 0..=23.
        hour: u32,
        /// Minute, 0..=59.
        minute: u32,
    },
    /// Truncated to the hour.
    Hour {
        /// Calendar year.
        year: i32,
        /// Month, 1..=12.
        month: u32,
        /// Day of month, 1..=31.
        day: u32,
        /// Hour, 0..=23.
        hour: u32,
    },
    /// Truncated to the calendar day.
    Day {
        /// Calendar year.
        year: i32,
        /// Month, 1..=12.
        month: u32,
        /// Day of month, 1..=31.
        day: u32,
    },
    /// Week of a (week-)year.
    Week {
        /// Year the week belongs to.
        year: i32,
        /// Week number.
        week: u32,
    },
    /// Calendar month.
    Month {
        /// Calendar year.
        year: i32,
        /// Month, 1..=12.
        month: u32,
    },
    /// Calendar year.
    Year {
        /// Calendar year.
        year: i32,
    },
}

impl SlotKey {
    /// Returns the granularity this key was computed for.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        match self {
            Self::Second { .. } => Granularity::Second,
            Self::Minute { .. } => Granularity::Minute,
            Self::Hour { .. } => Granularity::Hour,
            Self::Day { .. } => Granularity::Day,
            Self::Week { .. } => Granularity::Week,
            Self::Month { .. } => Granularity::Month,
            Self::Year { .. } => Granularity::Year,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Second {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => write!(
                f,
                "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
            ),
            Self::Minute {
                year,
                month,
                day,
                hour,
                minute,
            } => write!(f, "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}"),
            Self::Hour {
                year,
                month,
                day,
                hour,
            } => write!(f, "{year:04}-{month:02}-{day:02}T{hour:02}"),
            Self::Day { year, month, day } => write!(f, "{year:04}-{month:02}-{day:02}"),
            Self::Week { year, week } => write!(f, "{year:04}-W{week:02}"),
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Year { year } => write!(f, "{year:04}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
    use test_case::test_case;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .expect("valid test timestamp")
    }

    #[test_case(Granularity::Second, "2018-10-10T06:00:02" ; "second")]
    #[test_case(Granularity::Minute, "2018-10-10T06:00" ; "minute")]
    #[test_case(Granularity::Hour, "2018-10-10T06" ; "hour")]
    #[test_case(Granularity::Day, "2018-10-10" ; "day")]
    #[test_case(Granularity::Week, "2018-W41" ; "week")]
    #[test_case(Granularity::Month, "2018-10" ; "month")]
    #[test_case(Granularity::Year, "2018" ; "year")]
    fn test_slot_key_display(granularity: Granularity, expected: &str) {
        let key = granularity.slot_key(&at(2018, 10, 10, 6, 0, 2), WeekNumbering::Iso);
        assert_eq!(key.to_string(), expected);
        assert_eq!(key.granularity(), granularity);
    }

    #[test_case(at(2017, 1, 1, 3, 12, 34), WeekNumbering::Iso, "2016-W52" ; "sunday new year iso")]
    #[test_case(at(2017, 1, 1, 3, 12, 34), WeekNumbering::Monday, "2017-W00" ; "sunday new year monday")]
    #[test_case(at(2018, 12, 31, 12, 0, 0), WeekNumbering::Iso, "2019-W01" ; "monday new year eve iso")]
    #[test_case(at(2018, 12, 31, 12, 0, 0), WeekNumbering::Monday, "2018-W53" ; "monday new year eve monday")]
    #[test_case(at(2018, 1, 1, 0, 0, 0), WeekNumbering::Monday, "2018-W01" ; "year starting on monday")]
    #[test_case(at(2020, 12, 31, 0, 0, 0), WeekNumbering::Iso, "2020-W53" ; "long iso year")]
    fn test_week_numbering_at_year_boundaries(ts: NaiveDateTime, weeks: WeekNumbering, expected: &str) {
        assert_eq!(Granularity::Week.slot_key(&ts, weeks).to_string(), expected);
    }

    #[test]
    fn test_slot_keys_collapse_within_slot() {
        let early = at(2018, 10, 9, 7, 0, 2);
        let late = at(2018, 10, 9, 22, 0, 2);

        for g in [Granularity::Day, Granularity::Week, Granularity::Month, Granularity::Year] {
            assert_eq!(
                g.slot_key(&early, WeekNumbering::Iso),
                g.slot_key(&late, WeekNumbering::Iso),
                "{g} should collapse"
            );
        }
        for g in [Granularity::Second, Granularity::Minute, Granularity::Hour] {
            assert_ne!(
                g.slot_key(&early, WeekNumbering::Iso),
                g.slot_key(&late, WeekNumbering::Iso),
                "{g} should separate"
            );
        }
    }

    #[test]
    fn test_slot_key_uses_callers_timezone() {
        let utc = Utc.with_ymd_and_hms(2018, 10, 10, 23, 30, 0).single().expect("valid");
        let offset = chrono::FixedOffset::east_opt(2 * 3600).expect("valid offset");
        let shifted = utc.with_timezone(&offset);

        assert_eq!(
            Granularity::Day.slot_key(&utc, WeekNumbering::Iso).to_string(),
            "2018-10-10"
        );
        assert_eq!(
            Granularity::Day.slot_key(&shifted, WeekNumbering::Iso).to_string(),
            "2018-10-11"
        );
    }

    #[test]
    fn test_granularity_parse_roundtrip() {
        for g in Granularity::all() {
            assert_eq!(Granularity::parse(g.as_str()), Some(*g));
            assert_eq!(g.index(), Granularity::all().iter().position(|x| x == g).unwrap_or(99));
        }
        assert_eq!(Granularity::parse("Week"), Some(Granularity::Week));
        assert_eq!(Granularity::parse("fortnight"), None);
    }

    #[test]
    fn test_week_numbering_parse() {
        assert_eq!(WeekNumbering::parse("ISO"), Some(WeekNumbering::Iso));
        assert_eq!(WeekNumbering::parse("monday"), Some(WeekNumbering::Monday));
        assert_eq!(WeekNumbering::parse("sunday"), None);
        assert_eq!(WeekNumbering::default(), WeekNumbering::Iso);
    }
}
