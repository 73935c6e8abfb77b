//! Best-effort timestamp detection in free-form text.
//!
//! Recognized shapes, anywhere in the text:
//!
//! | Shape | Example |
//! |-------|---------|
//! | ISO 8601, optional time and offset | `2018-10-10T06:00:02UTC`, `2018-10-10 06:00+02:00`, `2018-10-10_1530` |
//! | Compact | `20181010`, `20181010T060002`, `20181010-0600` |
//! | Numeric with separators | `10.10.2018 06:00`, `10/10/2018` |
//! | Month names | `10 Oct 2018`, `October 10, 2018 06:00:02` |
//!
//! The earliest match in the text wins. Offsets are converted to UTC; values
//! without an offset are taken as written. An offset is only read after a
//! time, so `db-2018-10-10-0042` is midnight on the 10th.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::{Captures, Regex};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Iso,
    Compact,
    Numeric,
    DayMonthName,
    MonthNameDay,
}

struct Pattern {
    regex: Regex,
    shape: Shape,
}

const TIME: &str = r"[T _,]+(?P<H>\d{1,2})[:\-](?P<M>\d{2})(?:[:\-](?P<S>\d{2})(?:[.,]\d+)?)?";
/// `HHMM[SS]` without separators; only after an ISO date.
const COMPACT_TIME: &str = r"[T _]+(?P<cH>\d{2})(?P<cM>\d{2})(?P<cS>\d{2})?";
const MONTHS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    [
        (
            format!(
                r"(?:^|\D)(?P<y>\d{{4}})-(?P<m>\d{{1,2}})-(?P<d>\d{{1,2}})(?:{TIME}|{COMPACT_TIME})?(?:\s?(?P<tz>Z|UTC|GMT|[+\-]\d{{2}}:?\d{{2}}))?"
            ),
            Shape::Iso,
        ),
        (
            r"(?:^|\D)(?P<y>\d{4})(?P<m>\d{2})(?P<d>\d{2})(?:[T_\-]?(?P<H>\d{2})(?P<M>\d{2})(?P<S>\d{2})?)?(?:\D|$)"
                .to_string(),
            Shape::Compact,
        ),
        (
            format!(r"(?:^|\D)(?P<a>\d{{1,2}})[./\-](?P<b>\d{{1,2}})[./\-](?P<y>\d{{4}})(?:{TIME})?"),
            Shape::Numeric,
        ),
        (
            format!(
                r"(?i)(?:^|[^a-z0-9])(?P<d>\d{{1,2}})(?:st|nd|rd|th)?[\s\-]+(?P<mon>{MONTHS})[a-z]*\.?,?[\s\-]+(?P<y>\d{{4}})(?:{TIME})?"
            ),
            Shape::DayMonthName,
        ),
        (
            format!(
                r"(?i)(?:^|[^a-z0-9])(?P<mon>{MONTHS})[a-z]*\.?[\s\-]+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?,?[\s\-]+(?P<y>\d{{4}})(?:{TIME})?"
            ),
            Shape::MonthNameDay,
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, shape)| Regex::new(&pattern).ok().map(|regex| Pattern { regex, shape }))
    .collect()
});

/// Finds the first recognizable timestamp in `text`.
///
/// With `dayfirst`, ambiguous numeric dates such as `01.02.2018` read as
/// day-month-year; otherwise as month-day-year. If the preferred reading is
/// not a valid date the other one is tried.
#[must_use]
pub fn find_datetime(text: &str, dayfirst: bool) -> Option<NaiveDateTime> {
    PATTERNS
        .iter()
        .flat_map(|pattern| {
            pattern.regex.captures_iter(text).filter_map(move |caps| {
                let start = caps.iter().skip(1).flatten().map(|m| m.start()).min()?;
                build(&caps, pattern.shape, dayfirst).map(|ts| (start, ts))
            })
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, ts)| ts)
}

fn build(caps: &Captures<'_>, shape: Shape, dayfirst: bool) -> Option<NaiveDateTime> {
    let year: i32 = number(caps, "y")?;
    let date = match shape {
        Shape::Iso | Shape::Compact => {
            NaiveDate::from_ymd_opt(year, number(caps, "m")?, number(caps, "d")?)?
        },
        Shape::Numeric => {
            let a: u32 = number(caps, "a")?;
            let b: u32 = number(caps, "b")?;
            let (day, month) = if dayfirst { (a, b) } else { (b, a) };
            NaiveDate::from_ymd_opt(year, month, day)
                .or_else(|| NaiveDate::from_ymd_opt(year, day, month))?
        },
        Shape::DayMonthName | Shape::MonthNameDay => {
            NaiveDate::from_ymd_opt(year, month_number(caps.name("mon")?.as_str())?, number(caps, "d")?)?
        },
    };

    let (h, m, s) = if caps.name("H").is_some() {
        ("H", "M", "S")
    } else {
        ("cH", "cM", "cS")
    };
    let has_time = caps.name(h).is_some();
    let time = if has_time {
        NaiveTime::from_hms_opt(number(caps, h)?, number(caps, m)?, number(caps, s).unwrap_or(0))?
    } else {
        NaiveTime::MIN
    };

    let local = date.and_time(time);
    // An offset only counts after a time; anything else is taken as written.
    let offset = caps
        .name("tz")
        .filter(|_| has_time)
        .and_then(|tz| offset_seconds(tz.as_str()));
    match offset {
        Some(offset) => local.checked_sub_signed(TimeDelta::try_seconds(offset)?),
        None => Some(local),
    }
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_lowercase();
    MONTHS
        .split('|')
        .position(|m| m == prefix)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Parses `Z`, `UTC`, `GMT`, `+HH:MM` or `-HHMM` into seconds east of UTC.
///
/// Hours above 14 or minutes above 59 are not an offset.
fn offset_seconds(tz: &str) -> Option<i64> {
    match tz {
        "Z" | "UTC" | "GMT" => Some(0),
        _ => {
            let sign = match tz.chars().next()? {
                '+' => 1,
                '-' => -1,
                _ => return None,
            };
            let digits: String = tz.chars().filter(char::is_ascii_digit).collect();
            let hours: i64 = digits.get(..2)?.parse().ok()?;
            let minutes: i64 = digits.get(2..4)?.parse().ok()?;
            if hours > 14 || minutes > 59 {
                return None;
            }
            Some(sign * (hours * 3600 + minutes * 60))
        },
    }
}
