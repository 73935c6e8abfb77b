//! Line-oriented input.
//!
//! Turns a text stream into [`DatedLine`]s: the original line plus the
//! timestamp parsed from it. The sieve itself never sees text; this module is
//! what the CLI puts in front of it.
//!
//! # Example
//!
//! ```rust
//! use datesieve::{DateParser, LineReader};
//!
//! let input = "a 2018-10-10\nb 2018-10-09\n\nc 2018-10-08\n";
//! let lines: Vec<_> = LineReader::new(input.as_bytes(), DateParser::default())
//!     .collect::<datesieve::Result<_>>()?;
//!
//! assert_eq!(lines.len(), 3);
//! assert_eq!(lines[2].line, "c 2018-10-08");
//! assert_eq!(lines[2].line_number, 4);
//! # Ok::<(), datesieve::Error>(())
//! ```

mod fuzzy;
mod parser;

pub use fuzzy::find_datetime;
pub use parser::DateParser;

use crate::{Error, Result};
use chrono::NaiveDateTime;
use std::io::BufRead;

/// An input line and the timestamp parsed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedLine {
    /// One-based line number in the input.
    pub line_number: usize,
    /// The line without its terminator.
    pub line: String,
    /// The parsed timestamp.
    pub date: NaiveDateTime,
}

impl DatedLine {
    /// Parses `line` with `parser`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnparseableTimestamp`] if no timestamp can be read.
    pub fn parse(line_number: usize, line: String, parser: &DateParser) -> Result<Self> {
        match parser.parse(&line) {
            Ok(date) => Ok(Self {
                line_number,
                line,
                date,
            }),
            Err(cause) => Err(Error::UnparseableTimestamp {
                line_number,
                line,
                cause,
            }),
        }
    }
}

/// Iterator of [`DatedLine`]s over a buffered reader.
///
/// Blank lines are skipped. The first line without a timestamp yields an
/// error; iteration may continue after it.
pub struct LineReader<R> {
    reader: R,
    parser: DateParser,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a reader.
    pub const fn new(reader: R, parser: DateParser) -> Self {
        Self {
            reader,
            parser,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Parser in use.
    pub const fn parser(&self) -> &DateParser {
        &self.parser
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<DatedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {},
                Err(e) => {
                    return Some(Err(Error::OperationFailed {
                        operation: "read_input".to_string(),
                        cause: e.to_string(),
                    }));
                },
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }
            return Some(DatedLine::parse(
                self.line_number,
                line.to_string(),
                &self.parser,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_strips_terminators_and_skips_blank() {
        let input = "x 2018-10-10\r\n\n   \ny 2018-10-09";
        let lines: Vec<DatedLine> = LineReader::new(input.as_bytes(), DateParser::default())
            .collect::<Result<_>>()
            .expect("all lines parse");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, "x 2018-10-10");
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[1].line, "y 2018-10-09");
        assert_eq!(lines[1].line_number, 4);
    }

    #[test]
    fn test_reader_reports_unparseable_line() {
        let input = "2018-10-10\nnot a date\n2018-10-08\n";
        let results: Vec<Result<DatedLine>> =
            LineReader::new(input.as_bytes(), DateParser::strict("%Y-%m-%d")).collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(Error::UnparseableTimestamp {
                line_number, line, ..
            }) => {
                assert_eq!(*line_number, 2);
                assert_eq!(line, "not a date");
            },
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_reader_reports_invalid_utf8() {
        let input: &[u8] = b"2018-10-10\n\xff\xfe\n";
        let results: Vec<Result<DatedLine>> =
            LineReader::new(input, DateParser::default()).collect();
        assert!(matches!(results.last(), Some(Err(Error::OperationFailed { .. }))));
    }
}
