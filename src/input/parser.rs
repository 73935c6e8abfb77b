//! Timestamp parsing for input lines.

use super::fuzzy::find_datetime;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// How a timestamp is read from a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParser {
    /// The whole line (without surrounding whitespace) must match a chrono
    /// strftime-style format.
    ///
    /// Formats with only date fields resolve to midnight. Formats carrying an
    /// offset (`%z`, `%:z`) are converted to UTC.
    Strict {
        /// The format string, e.g. `%Y-%m-%dT%H:%M:%SUTC`.
        format: String,
    },
    /// The first date-like token anywhere in the line is used.
    Fuzzy {
        /// Read ambiguous numeric dates as day-month-year.
        dayfirst: bool,
    },
}

impl Default for DateParser {
    fn default() -> Self {
        Self::Fuzzy { dayfirst: true }
    }
}

impl DateParser {
    /// Creates a strict parser for `format`.
    #[must_use]
    pub fn strict(format: impl Into<String>) -> Self {
        Self::Strict {
            format: format.into(),
        }
    }

    /// Creates a fuzzy parser.
    #[must_use]
    pub const fn fuzzy(dayfirst: bool) -> Self {
        Self::Fuzzy { dayfirst }
    }

    /// Parses a timestamp from `text`.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure; callers attach line context.
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime, String> {
        let text = text.trim();
        match self {
            Self::Strict { format } => parse_strict(text, format),
            Self::Fuzzy { dayfirst } => {
                find_datetime(text, *dayfirst).ok_or_else(|| "no date found".to_string())
            },
        }
    }

    /// Short description for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Strict { format } => format!("strict({format})"),
            Self::Fuzzy { dayfirst: true } => "fuzzy(dayfirst)".to_string(),
            Self::Fuzzy { dayfirst: false } => "fuzzy(monthfirst)".to_string(),
        }
    }
}

fn parse_strict(text: &str, format: &str) -> Result<NaiveDateTime, String> {
    if let Ok(with_offset) = DateTime::parse_from_str(text, format) {
        return Ok(with_offset.naive_utc());
    }
    match NaiveDateTime::parse_from_str(text, format) {
        Ok(ts) => Ok(ts),
        Err(datetime_err) => NaiveDate::parse_from_str(text, format)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|_| format!("does not match format {format:?}: {datetime_err}")),
    }
}
