//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::expect_used)]

use chrono::NaiveDateTime;

/// Format of [`DEMO_LINES`].
pub const DEMO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SUTC";

/// Snapshot timestamps from a real backup directory, in listing order.
///
/// 40 entries, 38 distinct: two pairs are duplicated.
pub const DEMO_LINES: &[&str] = &[
    "2018-03-08T07:16:28UTC",
    "2017-01-01T03:12:34UTC",
    "2018-04-26T05:26:54UTC",
    "2018-07-26T06:11:58UTC",
    "2018-09-16T22:00:03UTC",
    "2018-09-23T22:00:02UTC",
    "2018-09-30T22:00:03UTC",
    "2018-10-03T22:00:01UTC",
    "2018-10-04T22:00:01UTC",
    "2018-10-05T22:00:01UTC",
    "2018-10-06T22:00:01UTC",
    "2018-10-07T22:00:02UTC",
    "2018-10-07T22:00:02UTC",
    "2018-10-08T22:00:01UTC",
    "2018-10-09T07:00:02UTC",
    "2018-10-09T08:00:01UTC",
    "2018-10-09T09:00:02UTC",
    "2018-10-09T10:00:01UTC",
    "2018-10-09T11:00:02UTC",
    "2018-10-09T12:00:01UTC",
    "2018-10-09T13:00:01UTC",
    "2018-10-09T14:00:01UTC",
    "2018-10-09T15:00:01UTC",
    "2018-10-09T16:00:01UTC",
    "2018-10-09T17:00:01UTC",
    "2018-10-09T18:00:01UTC",
    "2018-10-09T19:00:01UTC",
    "2018-10-09T20:00:01UTC",
    "2018-10-09T21:00:01UTC",
    "2018-10-09T22:00:02UTC",
    "2018-10-09T22:00:02UTC",
    "2018-10-09T23:00:00UTC",
    "2018-10-10T00:00:02UTC",
    "2018-10-10T01:00:02UTC",
    "2018-10-10T02:00:02UTC",
    "2018-10-10T03:00:01UTC",
    "2018-10-10T04:00:01UTC",
    "2018-10-10T05:00:02UTC",
    "2018-10-10T06:00:02UTC",
    "2018-08-08T08:08:08UTC",
];

/// Parses one fixture line.
pub fn parse(line: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(line, DEMO_FORMAT).expect("fixture timestamp")
}

/// Parsed fixture timestamps, in listing order.
pub fn demo_timestamps() -> Vec<NaiveDateTime> {
    DEMO_LINES.iter().map(|line| parse(line)).collect()
}

/// Fixture timestamps newest first.
pub fn demo_descending() -> Vec<NaiveDateTime> {
    let mut timestamps = demo_timestamps();
    timestamps.sort_by(|a, b| b.cmp(a));
    timestamps
}

/// Fixture as newline-terminated text, in listing order.
pub fn demo_text() -> String {
    DEMO_LINES.iter().map(|line| format!("{line}\n")).collect()
}
